use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for settlement operations.
///
/// Every business-rule variant is raised before any mutation, so a failed
/// buy or sell rolls back with zero side effects.
#[derive(Debug, Error)]
pub enum InvestmentError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Property is {0} and not accepting investments")]
    PropertyNotActive(String),
    #[error("Minimum investment for this property is ${0}")]
    BelowMinimumInvestment(Decimal),
    #[error("Investment amount too low to purchase even 1 share")]
    InsufficientAmount,
    #[error("Only {remaining} shares remaining. Reduce your investment amount")]
    Oversubscribed { remaining: i32 },
    #[error("Insufficient wallet balance. You have ${available}, need ${required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },
}

impl From<DieselError> for InvestmentError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => InvestmentError::NotFound("Record not found".to_string()),
            _ => InvestmentError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, InvestmentError>;
