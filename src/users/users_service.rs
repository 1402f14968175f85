use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::users_model::{NewUser, User, UserProfileUpdate};
use super::users_repository::UserRepository;
use crate::users::Result;

/// Service for managing users and their profile data
pub struct UserService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl UserService {
    /// Creates a new UserService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Registers a new user with a zero wallet balance and pending KYC
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        debug!("Creating user..., email: {}", new_user.email);
        let repo = UserRepository::new(self.pool.clone());
        repo.create(new_user)
    }

    /// Retrieves a user by its ID
    pub fn get_user(&self, user_id: &str) -> Result<User> {
        let repo = UserRepository::new(self.pool.clone());
        repo.get_by_id(user_id)
    }

    /// Retrieves a user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        let repo = UserRepository::new(self.pool.clone());
        repo.get_by_email(email)
    }

    /// Applies a profile update through the typed allow-list
    pub async fn update_profile(&self, user_id: &str, update: UserProfileUpdate) -> Result<User> {
        let repo = UserRepository::new(self.pool.clone());
        repo.update_profile(user_id, update)
    }

    /// Moves a user through the KYC lifecycle
    pub async fn set_kyc_status(&self, user_id: &str, status: &str) -> Result<User> {
        let repo = UserRepository::new(self.pool.clone());
        repo.set_kyc_status(user_id, status)
    }
}
