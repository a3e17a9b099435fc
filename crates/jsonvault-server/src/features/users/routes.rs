//! User API routes
//!
//! - `POST /users` - Create a new user (201)
//! - `GET /users?id=<int>` - Fetch a user by id (200)
//! - `DELETE /users` - Delete a user by id (204)

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::features::shared::validation::{parse_id_param, require};

use super::service::UserService;
use super::types::{NewUser, User};

/// Creates the users router with all routes configured
pub fn user_routes() -> Router<Arc<UserService>> {
    Router::new()
        .route("/", post(create_user))
        .route("/", get(get_user))
        .route("/", delete(delete_user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    email_address: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl CreateUserRequest {
    fn into_new_user(self) -> ServiceResult<NewUser> {
        Ok(NewUser {
            email_address: require(self.email_address, "emailAddress")?,
            first_name: require(self.first_name, "firstName")?,
            last_name: require(self.last_name, "lastName")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DeleteUserRequest {
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GetUserParams {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    id: i64,
    first_name: String,
    email_address: String,
    last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            email_address: user.email_address,
            last_name: user.last_name,
        }
    }
}

#[tracing::instrument(skip(service, body))]
async fn create_user(
    State(service): State<Arc<UserService>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(request) = body.map_err(|e| ServiceError::Validation(e.body_text()))?;

    let created = service.create(request.into_new_user()?).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))).into_response())
}

#[tracing::instrument(skip(service, params))]
async fn get_user(
    State(service): State<Arc<UserService>>,
    Query(params): Query<GetUserParams>,
) -> Result<Response, ServiceError> {
    let id = parse_id_param(params.id)?;

    let user = service.get_by_id(id).await?;

    Ok((StatusCode::OK, Json(UserResponse::from(user))).into_response())
}

#[tracing::instrument(skip(service, body))]
async fn delete_user(
    State(service): State<Arc<UserService>>,
    body: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(request) = body.map_err(|e| ServiceError::Validation(e.body_text()))?;
    let id = require(request.id, "id")?;

    service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
