use async_trait::async_trait;
use rust_decimal::Decimal;

use super::investments_model::{Investment, InvestmentReceipt, SaleReceipt};
use crate::investments::Result;

/// Contract for the share-settlement engine.
///
/// Implementations must run each mutating operation as one all-or-nothing
/// database transaction covering the wallet, the property inventory, the
/// position row and the ledger append.
#[async_trait]
pub trait SettlementEngine: Send + Sync {
    /// Converts a cash amount into whole shares of a property.
    async fn invest(
        &self,
        user_id: &str,
        property_id: &str,
        amount: Decimal,
    ) -> Result<InvestmentReceipt>;

    /// Sells shares back at the property's current valuation.
    async fn sell(
        &self,
        user_id: &str,
        investment_id: &str,
        shares_to_sell: i32,
    ) -> Result<SaleReceipt>;

    /// Lists the caller's positions, newest first.
    fn get_my_investments(&self, user_id: &str) -> Result<Vec<Investment>>;
}
