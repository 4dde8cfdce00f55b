mod support;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common_auth::Role;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use support::{TestApp, PASSWORD, TEST_ISSUER, TEST_SECRET};

/// Token whose role claim uses an arbitrary spelling, signed like the service would.
fn token_with_role(id: i64, role: &str, email: &str) -> String {
    let now = Utc::now();
    let claims = json!({
        "id": id,
        "role": role,
        "email": email,
        "iss": TEST_ISSUER,
        "iat": now.timestamp(),
        "exp": (now + Duration::hours(1)).timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode token")
}

#[tokio::test]
async fn admin_probe_greets_admins_only() {
    let app = TestApp::new();
    let (_, admin_token) = app.account("admin", "Root", "root@x.com").await;
    let (_, user_token) = app.account("user", "A", "a@x.com").await;

    let admin = app.get("/api/admin", Some(&admin_token)).await;
    assert_eq!(admin.status, StatusCode::OK);
    assert_eq!(admin.body["message"], "Hello root@x.com, welcome Admin!");

    let user = app.get("/api/admin", Some(&user_token)).await;
    assert_eq!(user.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_claims_are_case_insensitive() {
    let app = TestApp::new();

    for spelling in ["Admin", "admin", "ADMIN"] {
        let token = token_with_role(1, spelling, "root@x.com");
        let response = app.get("/api/admin", Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK, "role spelled {spelling}");
    }

    let unknown = token_with_role(1, "superuser", "root@x.com");
    let response = app.get("/api/admin", Some(&unknown)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("invalid_token"));
}

#[tokio::test]
async fn every_role_against_every_gated_route() {
    let app = TestApp::new();
    let routes: [(&str, &[Role]); 5] = [
        ("/api/admin", &[Role::Admin]),
        ("/api/admin/stats", &[Role::Admin]),
        ("/api/users", &[Role::Admin]),
        ("/api/stores/owner", &[Role::StoreOwner, Role::Admin]),
        ("/api/ratings/owner", &[Role::StoreOwner]),
    ];

    for role in Role::ALL {
        let token = app.token_for(1, role, "probe@x.com");
        for (route, allowed) in routes {
            let response = app.get(route, Some(&token)).await;
            let expected = if allowed.contains(&role) {
                StatusCode::OK
            } else {
                StatusCode::FORBIDDEN
            };
            assert_eq!(response.status, expected, "{role} on {route}");
        }
    }
}

#[tokio::test]
async fn admin_lists_users_without_digests() {
    let app = TestApp::new();
    let (_, admin_token) = app.account("admin", "Root", "root@x.com").await;
    app.account("user", "A", "a@x.com").await;

    let response = app.get("/api/users", Some(&admin_token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let users = response.body.as_array().expect("user list");
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password_digest").is_none());
    }

    let anonymous = app.get("/api/users", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_creates_users_with_optional_role() {
    let app = TestApp::new();
    let (_, admin_token) = app.account("admin", "Root", "root@x.com").await;

    let defaulted = app
        .post(
            "/api/users",
            Some(&admin_token),
            json!({ "name": "A", "email": "a@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(defaulted.status, StatusCode::CREATED);
    assert_eq!(defaulted.body["role"], "USER");

    let owner = app
        .post(
            "/api/users",
            Some(&admin_token),
            json!({ "name": "B", "email": "b@x.com", "password": PASSWORD, "role": "store_owner" }),
        )
        .await;
    assert_eq!(owner.status, StatusCode::CREATED);
    assert_eq!(owner.body["role"], "STORE_OWNER");

    let unknown = app
        .post(
            "/api/users",
            Some(&admin_token),
            json!({ "name": "C", "email": "c@x.com", "password": PASSWORD, "role": "root" }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.error_code(), Some("invalid_role"));

    let taken = app
        .post(
            "/api/users",
            Some(&admin_token),
            json!({ "name": "A2", "email": "a@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(taken.status, StatusCode::BAD_REQUEST);
    assert_eq!(taken.error_code(), Some("email_taken"));

    let created = app.login("b@x.com", PASSWORD).await;
    assert_eq!(created.body["user"]["role"], "STORE_OWNER");
}

#[tokio::test]
async fn stats_aggregate_platform() {
    let app = TestApp::new();
    let (_, admin_token) = app.account("admin", "Root", "root@x.com").await;

    let empty = app.get("/api/admin/stats", Some(&admin_token)).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["total_users"], 1);
    assert!(empty.body["average_rating"].is_null());
    assert!(empty.body["max_rating"].is_null());

    let (_, owner_token) = app.account("store-owner", "Owner", "owner@x.com").await;
    let store_id = app.create_store(&owner_token, "Shop").await;
    for (email, rating) in [("a@x.com", 2), ("b@x.com", 5)] {
        let (_, token) = app.account("user", "Rater", email).await;
        app.post(
            "/api/ratings",
            Some(&token),
            json!({ "store_id": store_id, "rating": rating }),
        )
        .await;
    }

    let stats = app.get("/api/admin/stats", Some(&admin_token)).await;
    assert_eq!(
        stats.body,
        json!({
            "total_users": 4,
            "total_stores": 1,
            "total_ratings": 2,
            "average_rating": 3.5,
            "max_rating": 5,
        })
    );
}
