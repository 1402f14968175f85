use std::sync::Arc;

use diesel::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use investr_core::db::{self, DbPool};
use investr_core::properties::{NewProperty, Property, PropertyService};
use investr_core::schema::properties;
use investr_core::transactions::TransactionService;
use investr_core::users::{NewUser, User, UserService};

/// Fresh on-disk database in a temp dir. Keep the TempDir alive for the
/// duration of the test; dropping it deletes the files.
pub fn setup_db() -> (TempDir, Arc<DbPool>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir
        .path()
        .join("investr.db")
        .to_string_lossy()
        .to_string();

    let db_path = db::init(&db_path).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    (dir, pool)
}

pub async fn create_user(pool: &Arc<DbPool>, email: &str) -> User {
    let service = UserService::new(pool.clone());
    service
        .create_user(NewUser {
            id: None,
            full_name: "Test Investor".to_string(),
            email: email.to_string(),
            password_hash: "hashed-secret".to_string(),
            phone: None,
            country: Some("US".to_string()),
        })
        .await
        .expect("Failed to create user")
}

pub async fn create_property(
    pool: &Arc<DbPool>,
    total_value: Decimal,
    total_shares: i32,
    min_investment: Decimal,
) -> Property {
    let service = PropertyService::new(pool.clone());
    service
        .create_property(NewProperty {
            id: None,
            name: "Skyline Towers".to_string(),
            location: "Austin, TX".to_string(),
            city: Some("Austin".to_string()),
            country: Some("US".to_string()),
            category: "residential".to_string(),
            description: None,
            image_url: None,
            total_value,
            total_shares: Some(total_shares),
            min_investment,
            target_roi: Some(dec!(12)),
            annual_yield: Some(dec!(8)),
            appreciation: None,
            dividend_freq: Some("Quarterly".to_string()),
            term_years: Some(5),
            listed_by: None,
        })
        .await
        .expect("Failed to create property")
}

/// Seeds prior sales directly. Only tests move the counter this way; the
/// engine owns it everywhere else.
pub fn seed_shares_sold(pool: &Arc<DbPool>, property_id: &str, shares_sold: i32) {
    let mut conn = pool.get().expect("Failed to get connection");
    diesel::update(properties::table.find(property_id))
        .set(properties::shares_sold.eq(shares_sold))
        .execute(&mut conn)
        .expect("Failed to seed shares_sold");
}

pub async fn fund_wallet(pool: &Arc<DbPool>, user_id: &str, amount: Decimal) {
    let service = TransactionService::new(pool.clone());
    service
        .deposit(user_id, amount)
        .await
        .expect("Failed to fund wallet");
}

pub fn wallet_balance(pool: &Arc<DbPool>, user_id: &str) -> Decimal {
    let service = UserService::new(pool.clone());
    service
        .get_user(user_id)
        .expect("Failed to load user")
        .wallet_balance
}

pub fn reload_property(pool: &Arc<DbPool>, property_id: &str) -> Property {
    let service = PropertyService::new(pool.clone());
    service
        .get_property(property_id)
        .expect("Failed to load property")
        .property
}
