use common_http_errors::ApiError;
use axum::response::IntoResponse;
use axum::http::StatusCode;
use http_body_util::BodyExt;

#[test]
fn unauthorized_variant() {
    let resp = ApiError::unauthorized("incorrect_password", "Current password is incorrect").into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "incorrect_password");
}

#[test]
fn forbidden_variant() {
    let resp = ApiError::forbidden("forbidden", "Access denied").into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "forbidden");
}

#[test]
fn bad_request_variant() {
    let resp = ApiError::bad_request("duplicate_rating", "You already reviewed this store").into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "duplicate_rating");
}

#[test]
fn not_found_variant() {
    let resp = ApiError::not_found("store_not_found", "Store not found").into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "store_not_found");
}

#[tokio::test]
async fn internal_variant_uses_fixed_code() {
    let resp = ApiError::internal("Failed to create rating").into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "internal_error");
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["message"], "Failed to create rating");
}
