// Module declarations
pub(crate) mod transactions_errors;
pub(crate) mod transactions_model;
pub(crate) mod transactions_repository;
pub(crate) mod transactions_service;

// Re-export the public interface
pub use transactions_model::{
    NewTransaction, Transaction, TransactionDB, TransactionDetails, TransactionFilters,
    TransactionSearchResponse, TransactionSummary, WalletReceipt,
};
pub use transactions_repository::TransactionRepository;
pub use transactions_service::TransactionService;

// Re-export error types for convenience
pub use transactions_errors::{Result, TransactionError};
