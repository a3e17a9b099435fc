//! JSON object API routes
//!
//! Wires request validation and the service to Axum handlers.
//!
//! # Route Structure
//!
//! - `POST /json_objects` - Create a new JSON object (201)
//! - `GET /json_objects?id=<int>` - Fetch a JSON object by id (200)
//! - `DELETE /json_objects` - Delete a JSON object by id (204)
//!
//! Validation failures map to 400, duplicate correlation ids to 409, missing
//! rows to 404, and infrastructure faults to 500 via [`ServiceError`].

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

use super::service::JsonObjectService;
use super::types::{JsonObject, NewJsonObject};

/// Creates the JSON objects router with all routes configured
pub fn json_object_routes() -> Router<Arc<JsonObjectService>> {
    Router::new()
        .route("/", post(create_json_object))
        .route("/", get(get_json_object))
        .route("/", delete(delete_json_object))
}

// ============================================================================
// Request / Response Models
// ============================================================================

/// Create request body; fields are optional so presence can be checked
/// explicitly instead of through deserialization failures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateJsonObjectRequest {
    json_object: Option<String>,
    sf_object_id: Option<String>,
    schema_id: Option<String>,
    end_user_id: Option<String>,
}

impl CreateJsonObjectRequest {
    /// Structural validation only; uniqueness is the service's concern.
    fn into_new_object(self) -> ServiceResult<NewJsonObject> {
        Ok(NewJsonObject {
            sf_object_id: require(self.sf_object_id, "sfObjectId")?,
            schema_id: require(self.schema_id, "schemaId")?,
            user_id: require(self.end_user_id, "endUserId")?,
            object: require(self.json_object, "jsonObject")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DeleteJsonObjectRequest {
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GetJsonObjectParams {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonObjectResponse {
    id: i64,
    schema_id: String,
    sf_object_id: String,
    end_user_id: String,
    json_object: String,
}

impl From<JsonObject> for JsonObjectResponse {
    fn from(object: JsonObject) -> Self {
        Self {
            id: object.id,
            schema_id: object.schema_id,
            sf_object_id: object.sf_object_id,
            end_user_id: object.user_id,
            json_object: object.object,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new JSON object
///
/// `POST /json_objects` with body
/// `{"jsonObject": "...", "sfObjectId": "...", "schemaId": "...", "endUserId": "..."}`
#[tracing::instrument(skip(service, body))]
async fn create_json_object(
    State(service): State<Arc<JsonObjectService>>,
    body: Result<Json<CreateJsonObjectRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(request) = body.map_err(|e| ServiceError::Validation(e.body_text()))?;

    let created = service.create(request.into_new_object()?).await?;

    Ok((StatusCode::CREATED, Json(JsonObjectResponse::from(created))).into_response())
}

/// Fetch a JSON object by id
///
/// `GET /json_objects?id=<int>`
#[tracing::instrument(skip(service, params))]
async fn get_json_object(
    State(service): State<Arc<JsonObjectService>>,
    Query(params): Query<GetJsonObjectParams>,
) -> Result<Response, ServiceError> {
    let id = parse_id_param(params.id)?;

    let object = service.get_by_id(id).await?;

    Ok((StatusCode::OK, Json(JsonObjectResponse::from(object))).into_response())
}

/// Delete a JSON object by id
///
/// `DELETE /json_objects` with body `{"id": <int>}`
#[tracing::instrument(skip(service, body))]
async fn delete_json_object(
    State(service): State<Arc<JsonObjectService>>,
    body: Result<Json<DeleteJsonObjectRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(request) = body.map_err(|e| ServiceError::Validation(e.body_text()))?;
    let id = require(request.id, "id")?;

    service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::features::json_objects::testing::{
        InMemoryJsonObjectStorage, RecordingJsonObjectPublisher,
    };

    fn test_router() -> (
        Router,
        Arc<InMemoryJsonObjectStorage>,
        Arc<RecordingJsonObjectPublisher>,
    ) {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = Arc::new(JsonObjectService::new(storage.clone(), publisher.clone()));
        (
            json_object_routes().with_state(service),
            storage,
            publisher,
        )
    }

    fn post_body(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn delete_body(body: String) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn valid_create_body() -> String {
        json!({
            "jsonObject": "{\"answer\":42}",
            "sfObjectId": "sf-100",
            "schemaId": "schema-7",
            "endUserId": "user-2",
        })
        .to_string()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_returns_201_with_assigned_id() {
        let (app, _, publisher) = test_router();

        let response = app.oneshot(post_body(valid_create_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["sfObjectId"], "sf-100");
        assert_eq!(body["schemaId"], "schema-7");
        assert_eq!(body["endUserId"], "user-2");
        assert_eq!(body["jsonObject"], "{\"answer\":42}");
        assert_eq!(publisher.created().len(), 1);
    }

    #[tokio::test]
    async fn create_missing_field_returns_400() {
        let (app, storage, _) = test_router();

        let body = json!({
            "jsonObject": "{}",
            "schemaId": "schema-7",
            "endUserId": "user-2",
        })
        .to_string();
        let response = app.oneshot(post_body(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(storage.rows().is_empty());
    }

    #[tokio::test]
    async fn create_null_field_returns_400() {
        let (app, _, _) = test_router();

        let body = json!({
            "jsonObject": "{}",
            "sfObjectId": null,
            "schemaId": "schema-7",
            "endUserId": "user-2",
        })
        .to_string();
        let response = app.oneshot(post_body(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_malformed_json_returns_400() {
        let (app, _, _) = test_router();

        let response = app.oneshot(post_body("{not json".to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_duplicate_returns_409() {
        let (app, _, _) = test_router();

        let first = app
            .clone()
            .oneshot(post_body(valid_create_body()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.oneshot(post_body(valid_create_body())).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn get_non_integer_id_returns_400() {
        let (app, _, _) = test_router();

        let response = app
            .oneshot(Request::builder().uri("/?id=abc").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_missing_id_returns_400() {
        let (app, _, _) = test_router();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_404() {
        let (app, _, _) = test_router();

        let response = app
            .oneshot(Request::builder().uri("/?id=42").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_returns_404() {
        let (app, _, publisher) = test_router();

        let created = app
            .clone()
            .oneshot(post_body(valid_create_body()))
            .await
            .unwrap();
        let id = body_json(created).await["id"].clone();

        let deleted = app
            .clone()
            .oneshot(delete_body(json!({ "id": id }).to_string()))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        assert_eq!(publisher.deleted().len(), 1);

        let fetched = app
            .oneshot(
                Request::builder()
                    .uri(&format!("/?id={id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_unknown_id_returns_404() {
        let (app, _, _) = test_router();

        let response = app
            .oneshot(delete_body(json!({ "id": 42 }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_missing_id_returns_400() {
        let (app, _, _) = test_router();

        let response = app
            .oneshot(delete_body(json!({}).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn publish_failure_still_returns_500_after_commit() {
        let (app, storage, publisher) = test_router();
        publisher.fail_next_calls();

        let response = app.oneshot(post_body(valid_create_body())).await.unwrap();

        // "500 but your data was saved": the documented inconsistency window.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.rows().len(), 1);
    }
}
