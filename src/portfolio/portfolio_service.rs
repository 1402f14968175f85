use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::portfolio_model::*;
use super::portfolio_repository::PortfolioRepository;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::dividends::DividendRepository;
use crate::investments::Investment;
use crate::portfolio::{PortfolioError, Result};
use crate::properties::Property;
use crate::transactions::TransactionRepository;
use crate::users::{UserError, UserRepository};

const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Read-only aggregation over the wallet, positions, dividends and ledger.
/// Everything is recomputed per call from current valuations; the aggregator
/// writes nothing.
pub struct PortfolioService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PortfolioService {
    /// Creates a new PortfolioService instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Full dashboard: KPI summary, allocation, holdings and recent activity
    pub fn get_portfolio(&self, user_id: &str) -> Result<Portfolio> {
        let repo = PortfolioRepository::new(self.pool.clone());
        let dividend_repo = DividendRepository::new(self.pool.clone());
        let transaction_repo = TransactionRepository::new(self.pool.clone());

        let positions = repo.open_positions(user_id)?;
        let dividends_by_property: HashMap<String, Decimal> = dividend_repo
            .earned_by_property(user_id)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?
            .into_iter()
            .collect();

        let holdings: Vec<Holding> = positions
            .iter()
            .map(|(investment, property)| {
                let earned = dividends_by_property
                    .get(&property.id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                build_holding(investment, property, earned)
            })
            .collect();

        let wallet_balance = UserRepository::new(self.pool.clone())
            .get_by_id(user_id)
            .map_err(|e| match e {
                UserError::NotFound(msg) => PortfolioError::NotFound(msg),
                other => PortfolioError::DatabaseError(other.to_string()),
            })?
            .wallet_balance;

        let summary = summarize(&holdings, wallet_balance);
        let allocation = allocate(&holdings, summary.current_value);

        let recent_dividends = dividend_repo
            .recent_for_user(user_id, RECENT_ACTIVITY_LIMIT)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;
        let recent_transactions = transaction_repo
            .recent_for_user(user_id, RECENT_ACTIVITY_LIMIT)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        Ok(Portfolio {
            summary,
            allocation,
            holdings,
            recent_dividends,
            recent_transactions,
        })
    }

    /// Per-property ranking, best target ROI first
    pub fn get_performance(&self, user_id: &str) -> Result<Vec<PerformanceEntry>> {
        let repo = PortfolioRepository::new(self.pool.clone());
        let positions = repo.positions_by_target_roi(user_id)?;

        Ok(positions
            .into_iter()
            .map(|(investment, property)| {
                let current_value = current_value_of(&investment, &property);
                let gain_pct = gain_pct_of(&investment, current_value);
                PerformanceEntry {
                    property_id: property.id,
                    name: property.name,
                    location: property.location,
                    category: property.category,
                    target_roi: property.target_roi,
                    annual_yield: property.annual_yield,
                    amount_invested: investment.amount,
                    current_value,
                    gain_pct,
                }
            })
            .collect())
    }

    pub fn add_to_wishlist(&self, user_id: &str, property_id: &str) -> Result<()> {
        PortfolioRepository::new(self.pool.clone()).add_to_wishlist(user_id, property_id)
    }

    pub fn remove_from_wishlist(&self, user_id: &str, property_id: &str) -> Result<()> {
        PortfolioRepository::new(self.pool.clone()).remove_from_wishlist(user_id, property_id)
    }

    pub fn get_wishlist(&self, user_id: &str) -> Result<Vec<WishlistEntry>> {
        PortfolioRepository::new(self.pool.clone()).get_wishlist(user_id)
    }
}

fn current_value_of(investment: &Investment, property: &Property) -> Decimal {
    (property.share_price() * Decimal::from(investment.shares))
        .round_dp(DISPLAY_DECIMAL_PRECISION)
}

/// Zero when nothing was paid in, so a freshly exited-and-rebought position
/// never divides by zero.
fn gain_pct_of(investment: &Investment, current_value: Decimal) -> Decimal {
    if investment.amount.is_zero() {
        return Decimal::ZERO;
    }
    ((current_value - investment.amount) / investment.amount * Decimal::ONE_HUNDRED)
        .round_dp(DISPLAY_DECIMAL_PRECISION)
}

fn build_holding(investment: &Investment, property: &Property, dividends_earned: Decimal) -> Holding {
    let current_value = current_value_of(investment, property);
    let gain_pct = gain_pct_of(investment, current_value);
    Holding {
        investment_id: investment.id.clone(),
        property_id: property.id.clone(),
        name: property.name.clone(),
        location: property.location.clone(),
        category: property.category.clone(),
        image_url: property.image_url.clone(),
        property_status: property.status.clone(),
        target_roi: property.target_roi,
        annual_yield: property.annual_yield,
        dividend_freq: property.dividend_freq.clone(),
        term_years: property.term_years,
        shares: investment.shares,
        amount_invested: investment.amount,
        current_value,
        gain_pct,
        dividends_earned,
        invested_at: investment.invested_at,
    }
}

fn summarize(holdings: &[Holding], wallet_balance: Decimal) -> PortfolioSummary {
    let total_invested: Decimal = holdings.iter().map(|h| h.amount_invested).sum();
    let current_value: Decimal = holdings.iter().map(|h| h.current_value).sum();
    let total_dividends: Decimal = holdings.iter().map(|h| h.dividends_earned).sum();

    let total_gain = current_value - total_invested;
    let gain_pct = if total_invested > Decimal::ZERO {
        (total_gain / total_invested * Decimal::ONE_HUNDRED).round_dp(DISPLAY_DECIMAL_PRECISION)
    } else {
        Decimal::ZERO
    };

    let monthly_income: Decimal = holdings
        .iter()
        .map(|h| {
            h.annual_yield.unwrap_or(Decimal::ZERO) / Decimal::ONE_HUNDRED
                / Decimal::from(12)
                * h.current_value
        })
        .sum();

    let avg_roi = if holdings.is_empty() {
        Decimal::ZERO
    } else {
        let roi_sum: Decimal = holdings
            .iter()
            .map(|h| h.target_roi.unwrap_or(Decimal::ZERO))
            .sum();
        (roi_sum / Decimal::from(holdings.len() as i64)).round_dp(DISPLAY_DECIMAL_PRECISION)
    };

    PortfolioSummary {
        total_invested,
        current_value,
        total_gain,
        gain_pct,
        total_dividends,
        monthly_income: monthly_income.round_dp(DISPLAY_DECIMAL_PRECISION),
        avg_roi,
        properties_owned: holdings.len(),
        wallet_balance,
    }
}

/// Groups current value by category; percentages are of total current value
/// and therefore sum to 100 whenever the total is non-zero.
fn allocate(holdings: &[Holding], current_value_total: Decimal) -> Vec<AllocationSlice> {
    let mut by_category: Vec<(String, Decimal)> = Vec::new();
    for holding in holdings {
        match by_category
            .iter_mut()
            .find(|(category, _)| *category == holding.category)
        {
            Some((_, value)) => *value += holding.current_value,
            None => by_category.push((holding.category.clone(), holding.current_value)),
        }
    }

    by_category
        .into_iter()
        .map(|(category, value)| {
            let pct = if current_value_total > Decimal::ZERO {
                (value / current_value_total * Decimal::ONE_HUNDRED).round_dp(1)
            } else {
                Decimal::ZERO
            };
            AllocationSlice {
                category,
                value: value.round_dp(DISPLAY_DECIMAL_PRECISION),
                pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn holding(category: &str, invested: Decimal, current: Decimal) -> Holding {
        Holding {
            investment_id: "inv-1".to_string(),
            property_id: "prop-1".to_string(),
            name: "Test Property".to_string(),
            location: "Test City".to_string(),
            category: category.to_string(),
            image_url: None,
            property_status: "active".to_string(),
            target_roi: Some(dec!(10)),
            annual_yield: Some(dec!(6)),
            dividend_freq: "quarterly".to_string(),
            term_years: None,
            shares: 10,
            amount_invested: invested,
            current_value: current,
            gain_pct: Decimal::ZERO,
            dividends_earned: Decimal::ZERO,
            invested_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_summary_gain_and_monthly_income() {
        let holdings = vec![
            holding("residential", dec!(1000), dec!(1100)),
            holding("commercial", dec!(2000), dec!(1900)),
        ];
        let summary = summarize(&holdings, dec!(500));

        assert_eq!(summary.total_invested, dec!(3000));
        assert_eq!(summary.current_value, dec!(3000));
        assert_eq!(summary.total_gain, dec!(0));
        assert_eq!(summary.gain_pct, dec!(0));
        assert_eq!(summary.properties_owned, 2);
        assert_eq!(summary.wallet_balance, dec!(500));
        // 6% / 12 of each current value
        assert_eq!(summary.monthly_income, dec!(15.00));
        assert_eq!(summary.avg_roi, dec!(10.00));
    }

    #[test]
    fn test_summary_empty_portfolio() {
        let summary = summarize(&[], dec!(250));
        assert_eq!(summary.total_invested, Decimal::ZERO);
        assert_eq!(summary.gain_pct, Decimal::ZERO);
        assert_eq!(summary.avg_roi, Decimal::ZERO);
        assert_eq!(summary.properties_owned, 0);
        assert_eq!(summary.wallet_balance, dec!(250));
    }

    #[test]
    fn test_allocation_percentages_sum_to_hundred() {
        let holdings = vec![
            holding("residential", dec!(1000), dec!(1500)),
            holding("residential", dec!(500), dec!(500)),
            holding("commercial", dec!(2000), dec!(2000)),
        ];
        let total: Decimal = holdings.iter().map(|h| h.current_value).sum();
        let allocation = allocate(&holdings, total);

        assert_eq!(allocation.len(), 2);
        assert_eq!(allocation[0].category, "residential");
        assert_eq!(allocation[0].value, dec!(2000.00));
        assert_eq!(allocation[0].pct, dec!(50.0));
        assert_eq!(allocation[1].category, "commercial");
        assert_eq!(allocation[1].pct, dec!(50.0));

        let pct_sum: Decimal = allocation.iter().map(|a| a.pct).sum();
        assert_eq!(pct_sum, dec!(100.0));
    }

    #[test]
    fn test_allocation_zero_total_value() {
        let holdings = vec![holding("residential", dec!(0), dec!(0))];
        let allocation = allocate(&holdings, Decimal::ZERO);
        assert_eq!(allocation[0].pct, Decimal::ZERO);
    }

    #[test]
    fn test_gain_pct_zero_cost_basis() {
        let investment = Investment {
            id: "inv-1".to_string(),
            user_id: "user-1".to_string(),
            property_id: "prop-1".to_string(),
            shares: 5,
            amount: Decimal::ZERO,
            status: "active".to_string(),
            invested_at: Utc::now().naive_utc(),
        };
        assert_eq!(gain_pct_of(&investment, dec!(5000)), Decimal::ZERO);
    }
}
