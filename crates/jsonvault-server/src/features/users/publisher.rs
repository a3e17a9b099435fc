//! Change-event publisher for users

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::Serialize;

use crate::error::{PublishError, ServiceResult};

use super::types::User;

/// Emits create/delete notifications for users
#[async_trait]
pub trait UserEventPublisher: Send + Sync {
    async fn publish_created(&self, user: &User) -> ServiceResult<()>;
    async fn publish_deleted(&self, id: i64) -> ServiceResult<()>;
}

#[derive(Debug, Serialize)]
struct UserCreatedEvent<'a> {
    id: i64,
    email_address: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    creation_time: String,
}

#[derive(Debug, Serialize)]
struct UserDeletedEvent {
    id: i64,
    deletion_time: String,
}

fn encode_created(user: &User, at: DateTime<Utc>) -> Result<String, PublishError> {
    let event = UserCreatedEvent {
        id: user.id,
        email_address: &user.email_address,
        first_name: &user.first_name,
        last_name: &user.last_name,
        creation_time: at.to_rfc3339(),
    };
    Ok(serde_json::to_string(&event)?)
}

fn encode_deleted(id: i64, at: DateTime<Utc>) -> Result<String, PublishError> {
    let event = UserDeletedEvent {
        id,
        deletion_time: at.to_rfc3339(),
    };
    Ok(serde_json::to_string(&event)?)
}

/// Redis streams implementation
#[derive(Clone)]
pub struct RedisUserEventPublisher {
    conn: ConnectionManager,
    stream_key: String,
}

impl RedisUserEventPublisher {
    pub fn new(conn: ConnectionManager, stream_key: impl Into<String>) -> Self {
        Self {
            conn,
            stream_key: stream_key.into(),
        }
    }

    async fn append(&self, kind: &str, payload: String) -> ServiceResult<()> {
        let mut conn = self.conn.clone();

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
impl UserEventPublisher for RedisUserEventPublisher {
    #[tracing::instrument(
        skip(self, user),
        fields(stream_key = %self.stream_key, id = user.id)
    )]
    async fn publish_created(&self, user: &User) -> ServiceResult<()> {
        let payload = encode_created(user, Utc::now())?;
        self.append("created", payload).await
    }

    #[tracing::instrument(skip(self), fields(stream_key = %self.stream_key))]
    async fn publish_deleted(&self, id: i64) -> ServiceResult<()> {
        let payload = encode_deleted(id, Utc::now())?;
        self.append("deleted", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn created_event_carries_profile_fields() {
        let user = User {
            id: 5,
            email_address: "a@example.com".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
        };
        let at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();

        let payload = encode_created(&user, at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(value["id"], 5);
        assert_eq!(value["email_address"], "a@example.com");
        assert_eq!(value["first_name"], "Ann");
        assert_eq!(value["last_name"], "Lee");
        assert_eq!(value["creation_time"], "2025-08-01T09:00:00+00:00");
    }

    #[test]
    fn deleted_event_carries_id_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();

        let payload = encode_deleted(5, at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(value["id"], 5);
        assert_eq!(value["deletion_time"], "2025-08-01T09:00:00+00:00");
    }
}
