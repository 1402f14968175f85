use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Transaction types. The ledger is append-only: a row of any of these
// types is never mutated after insert.

/// Shares purchased against a property. Decreases the wallet balance.
pub const TRANSACTION_TYPE_INVESTMENT: &str = "investment";

/// Shares sold back at the current valuation. Increases the wallet balance.
pub const TRANSACTION_TYPE_SALE: &str = "sale";

/// Dividend payout credited to the wallet.
pub const TRANSACTION_TYPE_DIVIDEND: &str = "dividend";

/// External funds added to the wallet.
pub const TRANSACTION_TYPE_DEPOSIT: &str = "deposit";

/// Funds moved out of the wallet.
pub const TRANSACTION_TYPE_WITHDRAWAL: &str = "withdrawal";

/// Transaction statuses
pub const TRANSACTION_STATUS_PENDING: &str = "pending";
pub const TRANSACTION_STATUS_COMPLETED: &str = "completed";
pub const TRANSACTION_STATUS_FAILED: &str = "failed";
pub const TRANSACTION_STATUS_REVERSED: &str = "reversed";

/// Property statuses
///
/// `funded` is entered exactly when shares_sold reaches total_shares; a funded
/// property accepts no further buys.
pub const PROPERTY_STATUS_ACTIVE: &str = "active";
pub const PROPERTY_STATUS_FUNDED: &str = "funded";
pub const PROPERTY_STATUS_CLOSED: &str = "closed";
pub const PROPERTY_STATUS_COMING_SOON: &str = "coming_soon";

/// Property categories
pub const PROPERTY_CATEGORIES: [&str; 3] = ["commercial", "residential", "industrial"];

/// Dividend payout frequencies
pub const DIVIDEND_FREQUENCIES: [&str; 3] = ["Monthly", "Quarterly", "Annually"];

/// Investment statuses
pub const INVESTMENT_STATUS_ACTIVE: &str = "active";
pub const INVESTMENT_STATUS_EXITED: &str = "exited";
pub const INVESTMENT_STATUS_PENDING: &str = "pending";

/// Dividend statuses
pub const DIVIDEND_STATUS_PAID: &str = "paid";
pub const DIVIDEND_STATUS_PENDING: &str = "pending";
pub const DIVIDEND_STATUS_CANCELLED: &str = "cancelled";

/// KYC statuses
pub const KYC_STATUS_PENDING: &str = "pending";
pub const KYC_STATUS_VERIFIED: &str = "verified";
pub const KYC_STATUS_REJECTED: &str = "rejected";

/// User roles
pub const ROLE_INVESTOR: &str = "investor";
pub const ROLE_ADMIN: &str = "admin";

/// Ceiling for a single wallet deposit.
pub const MAX_SINGLE_DEPOSIT: Decimal = dec!(1_000_000);

/// Display rounding for derived monetary views (summaries, allocations).
/// Settlement amounts are never rounded.
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
