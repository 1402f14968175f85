use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::users_errors::{Result, UserError};
use crate::constants::{KYC_STATUS_PENDING, KYC_STATUS_VERIFIED, ROLE_INVESTOR};
use crate::utils::parse_decimal_tolerant;

/// Domain model representing a platform user.
///
/// The wallet balance is owned exclusively by this row and is only ever
/// mutated by the settlement engine and the wallet deposit/withdraw paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub kyc_status: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub wallet_balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_kyc_verified(&self) -> bool {
        self.kyc_status == KYC_STATUS_VERIFIED
    }
}

/// Input model for registering a new user.
///
/// The password hash is opaque to this crate; hashing and credential checks
/// live with the outer auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub country: Option<String>,
}

impl NewUser {
    /// Validates the new user data
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(UserError::InvalidData(
                "Full name cannot be empty".to_string(),
            ));
        }
        if !self.email.contains('@') || self.email.trim().is_empty() {
            return Err(UserError::InvalidData(
                "A valid email address is required".to_string(),
            ));
        }
        if self.password_hash.trim().is_empty() {
            return Err(UserError::InvalidData(
                "Password hash cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Typed allow-list for profile updates. Fields left as None are not touched;
/// the wallet balance, role and KYC status are deliberately not updatable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, AsChangeset)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::users)]
pub struct UserProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.is_none()
            && self.phone.is_none()
            && self.country.is_none()
            && self.avatar_url.is_none()
        {
            return Err(UserError::InvalidData(
                "No valid fields to update".to_string(),
            ));
        }
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err(UserError::InvalidData(
                    "Full name cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Database model for users
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub kyc_status: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub wallet_balance: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            full_name: db.full_name,
            email: db.email,
            phone: db.phone,
            country: db.country,
            kyc_status: db.kyc_status,
            role: db.role,
            avatar_url: db.avatar_url,
            wallet_balance: parse_decimal_tolerant(&db.wallet_balance, "wallet_balance"),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewUser> for UserDB {
    fn from(domain: NewUser) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            full_name: domain.full_name,
            email: domain.email,
            password_hash: domain.password_hash,
            phone: domain.phone,
            country: domain.country,
            kyc_status: KYC_STATUS_PENDING.to_string(),
            role: ROLE_INVESTOR.to_string(),
            avatar_url: None,
            wallet_balance: Decimal::ZERO.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
