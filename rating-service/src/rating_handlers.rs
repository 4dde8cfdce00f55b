use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common_security::{ensure_owner_or_admin, RequireRole};
use serde::Deserialize;
use tracing::info;

use crate::access::{Raters, StoreOwners};
use crate::error::{parse_id, ServiceError, ServiceResult};
use crate::extract::JsonBody;
use crate::repository::{
    NewRating, OwnerReview, RatingRecord, RatingView, Repository, RepositoryError,
    UserRatingView,
};
use crate::AppState;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Any `user_id` in the body is ignored; the rater is always the caller.
#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub store_id: i64,
    pub rating: i32,
    #[serde(default)]
    pub review: Option<String>,
}

/// Inserts one rating for `(user_id, store_id)`; a second attempt for the
/// same pair is a `DuplicateRating`, never a storage failure.
pub async fn submit_rating(
    repo: &dyn Repository,
    user_id: i64,
    request: CreateRatingRequest,
) -> ServiceResult<RatingRecord> {
    if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
        return Err(ServiceError::validation(
            "invalid_rating",
            format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
        ));
    }

    let store = repo
        .find_store(request.store_id)
        .await
        .map_err(ServiceError::storage("Failed to create rating"))?;
    if store.is_none() {
        return Err(store_not_found());
    }

    let review = request.review.filter(|text| !text.trim().is_empty());
    repo.create_rating(NewRating {
        user_id,
        store_id: request.store_id,
        rating: request.rating,
        review,
    })
    .await
    .map_err(|err| match err {
        RepositoryError::UniqueViolation { .. } => ServiceError::DuplicateRating,
        RepositoryError::ForeignKeyViolation { .. } => store_not_found(),
        other => ServiceError::storage("Failed to create rating")(other),
    })
}

fn store_not_found() -> ServiceError {
    ServiceError::not_found("store_not_found", "Store not found")
}

pub async fn create_rating(
    State(state): State<AppState>,
    rater: RequireRole<Raters>,
    JsonBody(request): JsonBody<CreateRatingRequest>,
) -> ServiceResult<(StatusCode, Json<RatingRecord>)> {
    let user_id = rater.auth.user_id();
    match submit_rating(state.repo.as_ref(), user_id, request).await {
        Ok(rating) => {
            state.metrics.rating_submission("created");
            info!(rating_id = rating.id, user_id, store_id = rating.store_id, "rating created");
            Ok((StatusCode::CREATED, Json(rating)))
        }
        Err(err) => {
            let outcome = match err {
                ServiceError::DuplicateRating => "duplicate",
                ServiceError::Validation { .. } | ServiceError::NotFound { .. } => "rejected",
                _ => "error",
            };
            state.metrics.rating_submission(outcome);
            Err(err)
        }
    }
}

pub async fn list_ratings(State(state): State<AppState>) -> ServiceResult<Json<Vec<RatingView>>> {
    let ratings = state
        .repo
        .list_ratings()
        .await
        .map_err(ServiceError::storage("Failed to fetch ratings"))?;
    Ok(Json(ratings))
}

pub async fn get_rating(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ServiceResult<Json<RatingView>> {
    let id = parse_id(&raw_id, "Invalid rating ID")?;
    state
        .repo
        .find_rating(id)
        .await
        .map_err(ServiceError::storage("Failed to fetch rating"))?
        .map(Json)
        .ok_or(ServiceError::not_found("rating_not_found", "Rating not found"))
}

pub async fn user_ratings(
    State(state): State<AppState>,
    rater: RequireRole<Raters>,
    Path(raw_id): Path<String>,
) -> ServiceResult<Json<Vec<UserRatingView>>> {
    let target = parse_id(&raw_id, "Invalid user ID")?;
    ensure_owner_or_admin(&rater.principal(), target)?;

    let ratings = state
        .repo
        .ratings_by_user(target)
        .await
        .map_err(ServiceError::storage("Failed to fetch user ratings"))?;
    Ok(Json(ratings))
}

/// Scoped to the caller's stores; no owner id is accepted from the client.
pub async fn owner_reviews(
    State(state): State<AppState>,
    owner: RequireRole<StoreOwners>,
) -> ServiceResult<Json<Vec<OwnerReview>>> {
    let reviews = state
        .repo
        .reviews_for_owner(owner.auth.user_id())
        .await
        .map_err(ServiceError::storage("Failed to fetch reviews"))?;
    Ok(Json(reviews))
}
