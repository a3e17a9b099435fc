//! Feature modules implementing the jsonvault API
//!
//! Each resource is a vertical slice with its own entity types, storage and
//! publisher adapters, service, and HTTP routes:
//!
//! - **json_objects**: CRUD for opaque JSON payloads correlated by Salesforce
//!   object id
//! - **users**: CRUD for end users, unique by email address
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `types.rs` - Logic-layer entities
//! - `storage.rs` - Storage adapter trait + PostgreSQL implementation
//! - `publisher.rs` - Event publisher trait + Redis streams implementation
//! - `service.rs` - Business logic (uniqueness check, persist, publish)
//! - `routes.rs` - HTTP route definitions and request validation

pub mod json_objects;
pub mod shared;
pub mod users;

use std::sync::Arc;

use axum::Router;

use json_objects::service::JsonObjectService;
use users::service::UserService;

/// Handles to the per-resource services, built once at startup
#[derive(Clone)]
pub struct FeatureState {
    pub json_objects: Arc<JsonObjectService>,
    pub users: Arc<UserService>,
}

/// Creates the API router with every resource slice mounted under its path
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest(
            "/json_objects",
            json_objects::json_object_routes().with_state(state.json_objects),
        )
        .nest("/users", users::user_routes().with_state(state.users))
}
