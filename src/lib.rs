pub mod db;

pub mod dividends;
pub mod investments;
pub mod portfolio;
pub mod properties;
pub mod transactions;
pub mod users;

pub mod constants;
pub mod errors;
pub mod schema;
pub mod utils;

pub use errors::{Error, Result};
pub use investments::SettlementEngine;
