//! Change-event publisher for JSON objects
//!
//! Events are appended to a Redis stream with one `XADD` per event. The
//! append is awaited before the call is considered successful, so callers
//! never observe success for an event the sink has not acknowledged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::Serialize;

use crate::error::{PublishError, ServiceResult};

use super::types::JsonObject;

/// Emits create/delete notifications for JSON objects
#[async_trait]
pub trait JsonObjectEventPublisher: Send + Sync {
    async fn publish_created(&self, object: &JsonObject) -> ServiceResult<()>;
    async fn publish_deleted(&self, id: i64) -> ServiceResult<()>;
}

// Wire shape of the events; snake_case by contract with downstream consumers.

#[derive(Debug, Serialize)]
struct JsonObjectCreatedEvent<'a> {
    id: i64,
    sf_object_id: &'a str,
    end_user_id: &'a str,
    creation_time: String,
}

#[derive(Debug, Serialize)]
struct JsonObjectDeletedEvent {
    id: i64,
    deletion_time: String,
}

fn encode_created(object: &JsonObject, at: DateTime<Utc>) -> Result<String, PublishError> {
    let event = JsonObjectCreatedEvent {
        id: object.id,
        sf_object_id: &object.sf_object_id,
        end_user_id: &object.user_id,
        creation_time: at.to_rfc3339(),
    };
    Ok(serde_json::to_string(&event)?)
}

fn encode_deleted(id: i64, at: DateTime<Utc>) -> Result<String, PublishError> {
    let event = JsonObjectDeletedEvent {
        id,
        deletion_time: at.to_rfc3339(),
    };
    Ok(serde_json::to_string(&event)?)
}

/// Redis streams implementation
#[derive(Clone)]
pub struct RedisJsonObjectEventPublisher {
    conn: ConnectionManager,
    stream_key: String,
}

impl RedisJsonObjectEventPublisher {
    pub fn new(conn: ConnectionManager, stream_key: impl Into<String>) -> Self {
        Self {
            conn,
            stream_key: stream_key.into(),
        }
    }

    async fn append(&self, kind: &str, payload: String) -> ServiceResult<()> {
        let mut conn = self.conn.clone();

        // The reply (the generated entry id) is the acknowledgment; awaiting
        // it is what rules out fire-and-forget semantics.
        let _entry_id: String = redis::cmd("XADD")
            .arg(&self.stream_key)
            .arg("*")
            .arg("event")
            .arg(kind)
            .arg("payload")
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl JsonObjectEventPublisher for RedisJsonObjectEventPublisher {
    #[tracing::instrument(
        skip(self, object),
        fields(stream_key = %self.stream_key, id = object.id, sf_object_id = %object.sf_object_id)
    )]
    async fn publish_created(&self, object: &JsonObject) -> ServiceResult<()> {
        let payload = encode_created(object, Utc::now())?;
        self.append("created", payload).await
    }

    #[tracing::instrument(skip(self), fields(stream_key = %self.stream_key))]
    async fn publish_deleted(&self, id: i64) -> ServiceResult<()> {
        let payload = encode_deleted(id, Utc::now())?;
        self.append("deleted", payload).await
    }
}
