//! Storage seam for users, stores and ratings.
//!
//! Handlers only ever see `Arc<dyn Repository>`; uniqueness of
//! `users.email` and of `ratings (user_id, store_id)` is enforced by the
//! backing store and surfaced as [`RepositoryError::UniqueViolation`].

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common_auth::Role;
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated ({constraint:?})")]
    UniqueViolation { constraint: Option<String> },
    #[error("foreign key constraint violated ({constraint:?})")]
    ForeignKeyViolation { constraint: Option<String> },
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().map(str::to_string);
            match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => return Self::UniqueViolation { constraint },
                Some(PG_FOREIGN_KEY_VIOLATION) => return Self::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// Full user row, including the password digest. Never serialised.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub address: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub address: Option<String>,
    pub role: Role,
}

/// Outward-facing user projection with the digest stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoreRecord {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: i64,
}

/// Store plus its rating aggregate.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoreSummary {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: i64,
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub user_id: i64,
    pub store_id: i64,
    pub rating: i32,
    pub review: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RatingRecord {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub rating: i32,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RatingView {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub rating: i32,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub store_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRatingView {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub rating: i32,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub store_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OwnerReview {
    pub id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "storeName")]
    pub store_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
    pub average_rating: Option<f64>,
    pub max_rating: Option<i32>,
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>>;
    async fn find_user_by_id(&self, id: i64) -> RepositoryResult<Option<UserRecord>>;
    async fn list_users(&self) -> RepositoryResult<Vec<UserRecord>>;
    async fn create_user(&self, user: NewUserRecord) -> RepositoryResult<UserRecord>;
    /// Returns `false` when no user with `user_id` exists.
    async fn update_password(&self, user_id: i64, password_digest: &str) -> RepositoryResult<bool>;

    async fn create_store(&self, store: NewStore) -> RepositoryResult<StoreRecord>;
    async fn list_stores(&self) -> RepositoryResult<Vec<StoreSummary>>;
    async fn find_store(&self, id: i64) -> RepositoryResult<Option<StoreSummary>>;
    async fn stores_by_owner(&self, owner_id: i64) -> RepositoryResult<Vec<StoreSummary>>;

    async fn create_rating(&self, rating: NewRating) -> RepositoryResult<RatingRecord>;
    async fn list_ratings(&self) -> RepositoryResult<Vec<RatingView>>;
    async fn find_rating(&self, id: i64) -> RepositoryResult<Option<RatingView>>;
    /// Newest first.
    async fn ratings_by_user(&self, user_id: i64) -> RepositoryResult<Vec<UserRatingView>>;
    /// Reviews across every store owned by `owner_id`, newest first.
    async fn reviews_for_owner(&self, owner_id: i64) -> RepositoryResult<Vec<OwnerReview>>;

    async fn stats(&self) -> RepositoryResult<PlatformStats>;
}
