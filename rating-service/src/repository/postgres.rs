use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::{
    NewRating, NewStore, NewUserRecord, OwnerReview, PlatformStats, RatingRecord, RatingView,
    Repository, RepositoryError, RepositoryResult, StoreRecord, StoreSummary, UserRatingView,
    UserRecord,
};

const USER_COLUMNS: &str = "id, name, email, password_digest, address, role";

const STORE_SUMMARY_SELECT: &str = "SELECT s.id, s.name, s.email, s.address, s.owner_id,
        AVG(r.rating)::FLOAT8 AS avg_rating,
        COUNT(r.id) AS rating_count
     FROM stores s
     LEFT JOIN ratings r ON r.store_id = s.id";

const RATING_VIEW_SELECT: &str = "SELECT r.id, r.user_id, r.store_id, r.rating, r.review, r.created_at,
        u.name AS user_name, s.name AS store_name
     FROM ratings r
     JOIN users u ON r.user_id = u.id
     JOIN stores s ON r.store_id = s.id";

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_digest: String,
    address: Option<String>,
    role: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<Self> {
        let role = row
            .role
            .parse()
            .map_err(|err| RepositoryError::InvalidRow(format!("user {}: {err}", row.id)))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_digest: row.password_digest,
            address: row.address,
            role,
        })
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn find_user_by_id(&self, id: i64) -> RepositoryResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn list_users(&self) -> RepositoryResult<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(UserRecord::try_from).collect()
    }

    async fn create_user(&self, user: NewUserRecord) -> RepositoryResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_digest, address, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_digest)
        .bind(user.address)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        UserRecord::try_from(row)
    }

    async fn update_password(&self, user_id: i64, password_digest: &str) -> RepositoryResult<bool> {
        let result = sqlx::query("UPDATE users SET password_digest = $1 WHERE id = $2")
            .bind(password_digest)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_store(&self, store: NewStore) -> RepositoryResult<StoreRecord> {
        let record = sqlx::query_as::<_, StoreRecord>(
            "INSERT INTO stores (name, email, address, owner_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, address, owner_id",
        )
        .bind(store.name)
        .bind(store.email)
        .bind(store.address)
        .bind(store.owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_stores(&self) -> RepositoryResult<Vec<StoreSummary>> {
        let stores = sqlx::query_as::<_, StoreSummary>(&format!(
            "{STORE_SUMMARY_SELECT} GROUP BY s.id ORDER BY s.id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    async fn find_store(&self, id: i64) -> RepositoryResult<Option<StoreSummary>> {
        let store = sqlx::query_as::<_, StoreSummary>(&format!(
            "{STORE_SUMMARY_SELECT} WHERE s.id = $1 GROUP BY s.id"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    async fn stores_by_owner(&self, owner_id: i64) -> RepositoryResult<Vec<StoreSummary>> {
        let stores = sqlx::query_as::<_, StoreSummary>(&format!(
            "{STORE_SUMMARY_SELECT} WHERE s.owner_id = $1 GROUP BY s.id ORDER BY s.id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    async fn create_rating(&self, rating: NewRating) -> RepositoryResult<RatingRecord> {
        let record = sqlx::query_as::<_, RatingRecord>(
            "INSERT INTO ratings (user_id, store_id, rating, review)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, store_id, rating, review, created_at",
        )
        .bind(rating.user_id)
        .bind(rating.store_id)
        .bind(rating.rating)
        .bind(rating.review)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_ratings(&self) -> RepositoryResult<Vec<RatingView>> {
        let ratings = sqlx::query_as::<_, RatingView>(&format!(
            "{RATING_VIEW_SELECT} ORDER BY r.id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn find_rating(&self, id: i64) -> RepositoryResult<Option<RatingView>> {
        let rating = sqlx::query_as::<_, RatingView>(&format!("{RATING_VIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    async fn ratings_by_user(&self, user_id: i64) -> RepositoryResult<Vec<UserRatingView>> {
        let ratings = sqlx::query_as::<_, UserRatingView>(
            "SELECT r.id, r.user_id, r.store_id, r.rating, r.review, r.created_at,
                    s.name AS store_name
             FROM ratings r
             JOIN stores s ON r.store_id = s.id
             WHERE r.user_id = $1
             ORDER BY r.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn reviews_for_owner(&self, owner_id: i64) -> RepositoryResult<Vec<OwnerReview>> {
        let reviews = sqlx::query_as::<_, OwnerReview>(
            "SELECT r.id, r.rating, r.review AS comment, u.name AS user_name, s.name AS store_name
             FROM ratings r
             JOIN users u ON u.id = r.user_id
             JOIN stores s ON s.id = r.store_id
             WHERE s.owner_id = $1
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn stats(&self) -> RepositoryResult<PlatformStats> {
        let stats = sqlx::query_as::<_, PlatformStats>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM stores) AS total_stores,
                (SELECT COUNT(*) FROM ratings) AS total_ratings,
                (SELECT AVG(rating)::FLOAT8 FROM ratings) AS average_rating,
                (SELECT MAX(rating) FROM ratings) AS max_rating",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
