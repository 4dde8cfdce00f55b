use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    NewRating, NewStore, NewUserRecord, OwnerReview, PlatformStats, RatingRecord, RatingView,
    Repository, RepositoryError, RepositoryResult, StoreRecord, StoreSummary, UserRatingView,
    UserRecord,
};

/// Process-local repository with the same constraint semantics as the
/// Postgres schema. Used by the test suite and for running without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    stores: Vec<StoreRecord>,
    ratings: Vec<RatingRecord>,
    next_user_id: i64,
    next_store_id: i64,
    next_rating_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn user(&self, id: i64) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.id == id)
    }

    fn store(&self, id: i64) -> Option<&StoreRecord> {
        self.stores.iter().find(|store| store.id == id)
    }

    fn summarize(&self, store: &StoreRecord) -> StoreSummary {
        let ratings: Vec<i32> = self
            .ratings
            .iter()
            .filter(|rating| rating.store_id == store.id)
            .map(|rating| rating.rating)
            .collect();
        StoreSummary {
            id: store.id,
            name: store.name.clone(),
            email: store.email.clone(),
            address: store.address.clone(),
            owner_id: store.owner_id,
            avg_rating: mean(&ratings),
            rating_count: ratings.len() as i64,
        }
    }

    fn view(&self, rating: &RatingRecord) -> Option<RatingView> {
        let user = self.user(rating.user_id)?;
        let store = self.store(rating.store_id)?;
        Some(RatingView {
            id: rating.id,
            user_id: rating.user_id,
            store_id: rating.store_id,
            rating: rating.rating,
            review: rating.review.clone(),
            created_at: rating.created_at,
            user_name: user.name.clone(),
            store_name: store.name.clone(),
        })
    }
}

fn mean(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total: i64 = values.iter().map(|value| i64::from(*value)).sum();
    Some(total as f64 / values.len() as f64)
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let tables = self.inner.read().await;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> RepositoryResult<Option<UserRecord>> {
        let tables = self.inner.read().await;
        Ok(tables.user(id).cloned())
    }

    async fn list_users(&self) -> RepositoryResult<Vec<UserRecord>> {
        let tables = self.inner.read().await;
        Ok(tables.users.clone())
    }

    async fn create_user(&self, user: NewUserRecord) -> RepositoryResult<UserRecord> {
        let mut tables = self.inner.write().await;
        if tables.users.iter().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::UniqueViolation {
                constraint: Some("users_email_key".to_string()),
            });
        }
        let record = UserRecord {
            id: next_id(&mut tables.next_user_id),
            name: user.name,
            email: user.email,
            password_digest: user.password_digest,
            address: user.address,
            role: user.role,
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn update_password(&self, user_id: i64, password_digest: &str) -> RepositoryResult<bool> {
        let mut tables = self.inner.write().await;
        match tables.users.iter_mut().find(|user| user.id == user_id) {
            Some(user) => {
                user.password_digest = password_digest.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_store(&self, store: NewStore) -> RepositoryResult<StoreRecord> {
        let mut tables = self.inner.write().await;
        if tables.user(store.owner_id).is_none() {
            return Err(RepositoryError::ForeignKeyViolation {
                constraint: Some("stores_owner_id_fkey".to_string()),
            });
        }
        let record = StoreRecord {
            id: next_id(&mut tables.next_store_id),
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
        };
        tables.stores.push(record.clone());
        Ok(record)
    }

    async fn list_stores(&self) -> RepositoryResult<Vec<StoreSummary>> {
        let tables = self.inner.read().await;
        Ok(tables.stores.iter().map(|store| tables.summarize(store)).collect())
    }

    async fn find_store(&self, id: i64) -> RepositoryResult<Option<StoreSummary>> {
        let tables = self.inner.read().await;
        Ok(tables.store(id).map(|store| tables.summarize(store)))
    }

    async fn stores_by_owner(&self, owner_id: i64) -> RepositoryResult<Vec<StoreSummary>> {
        let tables = self.inner.read().await;
        Ok(tables
            .stores
            .iter()
            .filter(|store| store.owner_id == owner_id)
            .map(|store| tables.summarize(store))
            .collect())
    }

    async fn create_rating(&self, rating: NewRating) -> RepositoryResult<RatingRecord> {
        let mut tables = self.inner.write().await;
        if tables.user(rating.user_id).is_none() {
            return Err(RepositoryError::ForeignKeyViolation {
                constraint: Some("ratings_user_id_fkey".to_string()),
            });
        }
        if tables.store(rating.store_id).is_none() {
            return Err(RepositoryError::ForeignKeyViolation {
                constraint: Some("ratings_store_id_fkey".to_string()),
            });
        }
        let duplicate = tables
            .ratings
            .iter()
            .any(|existing| existing.user_id == rating.user_id && existing.store_id == rating.store_id);
        if duplicate {
            return Err(RepositoryError::UniqueViolation {
                constraint: Some("ratings_user_store_key".to_string()),
            });
        }
        let record = RatingRecord {
            id: next_id(&mut tables.next_rating_id),
            user_id: rating.user_id,
            store_id: rating.store_id,
            rating: rating.rating,
            review: rating.review,
            created_at: Utc::now(),
        };
        tables.ratings.push(record.clone());
        Ok(record)
    }

    async fn list_ratings(&self) -> RepositoryResult<Vec<RatingView>> {
        let tables = self.inner.read().await;
        Ok(tables.ratings.iter().filter_map(|rating| tables.view(rating)).collect())
    }

    async fn find_rating(&self, id: i64) -> RepositoryResult<Option<RatingView>> {
        let tables = self.inner.read().await;
        Ok(tables
            .ratings
            .iter()
            .find(|rating| rating.id == id)
            .and_then(|rating| tables.view(rating)))
    }

    async fn ratings_by_user(&self, user_id: i64) -> RepositoryResult<Vec<UserRatingView>> {
        let tables = self.inner.read().await;
        let mut ratings: Vec<UserRatingView> = tables
            .ratings
            .iter()
            .filter(|rating| rating.user_id == user_id)
            .filter_map(|rating| {
                let store = tables.store(rating.store_id)?;
                Some(UserRatingView {
                    id: rating.id,
                    user_id: rating.user_id,
                    store_id: rating.store_id,
                    rating: rating.rating,
                    review: rating.review.clone(),
                    created_at: rating.created_at,
                    store_name: store.name.clone(),
                })
            })
            .collect();
        ratings.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(ratings)
    }

    async fn reviews_for_owner(&self, owner_id: i64) -> RepositoryResult<Vec<OwnerReview>> {
        let tables = self.inner.read().await;
        let owned: HashMap<i64, &StoreRecord> = tables
            .stores
            .iter()
            .filter(|store| store.owner_id == owner_id)
            .map(|store| (store.id, store))
            .collect();

        let mut matching: Vec<&RatingRecord> = tables
            .ratings
            .iter()
            .filter(|rating| owned.contains_key(&rating.store_id))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .filter_map(|rating| {
                let user = tables.user(rating.user_id)?;
                let store = owned.get(&rating.store_id)?;
                Some(OwnerReview {
                    id: rating.id,
                    rating: rating.rating,
                    comment: rating.review.clone(),
                    user_name: user.name.clone(),
                    store_name: store.name.clone(),
                })
            })
            .collect())
    }

    async fn stats(&self) -> RepositoryResult<PlatformStats> {
        let tables = self.inner.read().await;
        let values: Vec<i32> = tables.ratings.iter().map(|rating| rating.rating).collect();
        Ok(PlatformStats {
            total_users: tables.users.len() as i64,
            total_stores: tables.stores.len() as i64,
            total_ratings: values.len() as i64,
            average_rating: mean(&values),
            max_rating: values.iter().copied().max(),
        })
    }
}
