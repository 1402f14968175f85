use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::schema::users::dsl::*;
use crate::users::{Result, UserError};
use crate::utils::parse_decimal_tolerant;

use super::users_model::{NewUser, User, UserDB, UserProfileUpdate};

/// Repository for managing user data in the database
pub struct UserRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl UserRepository {
    /// Creates a new UserRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database
    pub fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        let mut user_db: UserDB = new_user.into();
        if user_db.id.is_empty() {
            user_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        diesel::insert_into(users)
            .values(&user_db)
            .execute(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => UserError::InvalidData("An account with this email already exists".to_string()),
                _ => UserError::DatabaseError(e.to_string()),
            })?;

        Ok(user_db.into())
    }

    /// Retrieves a user by its ID
    pub fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let user = users
            .find(user_id)
            .first::<UserDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    UserError::NotFound(format!("User with id {} not found", user_id))
                }
                _ => UserError::DatabaseError(e.to_string()),
            })?;

        Ok(user.into())
    }

    /// Retrieves a user by email
    pub fn get_by_email(&self, user_email: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let user = users
            .filter(email.eq(user_email))
            .first::<UserDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    UserError::NotFound(format!("User with email {} not found", user_email))
                }
                _ => UserError::DatabaseError(e.to_string()),
            })?;

        Ok(user.into())
    }

    /// Applies a typed profile update and returns the fresh row
    pub fn update_profile(&self, user_id: &str, update: UserProfileUpdate) -> Result<User> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(users.find(user_id))
            .set((&update, updated_at.eq(chrono::Utc::now().naive_utc())))
            .execute(&mut conn)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(UserError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        self.get_by_id(user_id)
    }

    /// Sets the KYC status for a user
    pub fn set_kyc_status(&self, user_id: &str, status: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(users.find(user_id))
            .set((
                kyc_status.eq(status),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(UserError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        self.get_by_id(user_id)
    }

    /// Reads the wallet balance inside an open transaction. Only the
    /// settlement and wallet paths should call this.
    pub fn wallet_balance_in_tx(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> Result<Decimal> {
        let balance_str = users
            .find(user_id)
            .select(wallet_balance)
            .first::<String>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    UserError::NotFound(format!("User with id {} not found", user_id))
                }
                _ => UserError::DatabaseError(e.to_string()),
            })?;

        Ok(parse_decimal_tolerant(&balance_str, "wallet_balance"))
    }

    /// Writes a new wallet balance inside an open transaction.
    pub fn set_wallet_balance_in_tx(
        conn: &mut SqliteConnection,
        user_id: &str,
        new_balance: Decimal,
    ) -> Result<()> {
        diesel::update(users.find(user_id))
            .set((
                wallet_balance.eq(new_balance.to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
