use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common_security::RequireRole;
use serde::Deserialize;
use tracing::info;

use crate::access::StoreManagers;
use crate::error::{parse_id, ServiceError, ServiceResult};
use crate::extract::JsonBody;
use crate::repository::{NewStore, StoreRecord, StoreSummary};
use crate::AppState;

/// Any `owner_id` in the body is ignored; the owner is always the caller.
#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

pub async fn create_store(
    State(state): State<AppState>,
    manager: RequireRole<StoreManagers>,
    JsonBody(request): JsonBody<CreateStoreRequest>,
) -> ServiceResult<(StatusCode, Json<StoreRecord>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation(
            "invalid_store_name",
            "Store name is required",
        ));
    }

    let owner_id = manager.auth.user_id();
    let store = state
        .repo
        .create_store(NewStore {
            name: name.to_string(),
            email: request.email,
            address: request.address,
            owner_id,
        })
        .await
        .map_err(ServiceError::storage("Failed to create store"))?;

    info!(store_id = store.id, owner_id, "store created");
    Ok((StatusCode::CREATED, Json(store)))
}

pub async fn list_stores(State(state): State<AppState>) -> ServiceResult<Json<Vec<StoreSummary>>> {
    let stores = state
        .repo
        .list_stores()
        .await
        .map_err(ServiceError::storage("Failed to fetch stores"))?;
    Ok(Json(stores))
}

pub async fn get_store(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ServiceResult<Json<StoreSummary>> {
    let id = parse_id(&raw_id, "Invalid store ID")?;
    state
        .repo
        .find_store(id)
        .await
        .map_err(ServiceError::storage("Failed to fetch store"))?
        .map(Json)
        .ok_or(ServiceError::not_found("store_not_found", "Store not found"))
}

/// Scoped to the caller; no owner id is accepted from the client.
pub async fn owner_stores(
    State(state): State<AppState>,
    manager: RequireRole<StoreManagers>,
) -> ServiceResult<Json<Vec<StoreSummary>>> {
    let stores = state
        .repo
        .stores_by_owner(manager.auth.user_id())
        .await
        .map_err(ServiceError::storage("Failed to fetch owner stores"))?;
    Ok(Json(stores))
}
