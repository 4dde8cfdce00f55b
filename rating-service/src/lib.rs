pub mod access;
pub mod app;
pub mod auth_handlers;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod passwords;
pub mod rating_handlers;
pub mod repository;
pub mod store_handlers;
pub mod user_handlers;

pub use app::{build_router, cors_layer, AppState};
pub use error::{ServiceError, ServiceResult};
