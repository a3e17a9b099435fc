//! In-memory adapter doubles for JSON object tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PublishError, ServiceError, ServiceResult};

use super::publisher::JsonObjectEventPublisher;
use super::storage::JsonObjectStorage;
use super::types::{JsonObject, NewJsonObject};

#[derive(Default)]
struct State {
    next_id: i64,
    rows: Vec<JsonObject>,
}

/// Storage double backed by a plain vector, enforcing the same uniqueness
/// rule as the real schema.
#[derive(Default)]
pub(crate) struct InMemoryJsonObjectStorage {
    state: Mutex<State>,
    fail: AtomicBool,
}

impl InMemoryJsonObjectStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a storage error.
    pub(crate) fn fail_next_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn rows(&self) -> Vec<JsonObject> {
        self.state.lock().unwrap().rows.clone()
    }

    fn check_fault(&self) -> ServiceResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl JsonObjectStorage for InMemoryJsonObjectStorage {
    async fn create(&self, object: &NewJsonObject) -> ServiceResult<i64> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();

        if state
            .rows
            .iter()
            .any(|row| row.sf_object_id == object.sf_object_id)
        {
            return Err(ServiceError::AlreadyExists);
        }

        state.next_id += 1;
        let id = state.next_id;
        state.rows.push(JsonObject {
            id,
            object: object.object.clone(),
            sf_object_id: object.sf_object_id.clone(),
            schema_id: object.schema_id.clone(),
            user_id: object.user_id.clone(),
        });

        Ok(id)
    }

    async fn exists_by_sf_object_id(&self, sf_object_id: &str) -> ServiceResult<bool> {
        self.check_fault()?;
        let state = self.state.lock().unwrap();
        Ok(state.rows.iter().any(|row| row.sf_object_id == sf_object_id))
    }

    async fn get_by_id(&self, id: i64) -> ServiceResult<JsonObject> {
        self.check_fault()?;
        let state = self.state.lock().unwrap();
        state
            .rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    async fn delete(&self, id: i64) -> ServiceResult<u64> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();
        let before = state.rows.len();
        state.rows.retain(|row| row.id != id);
        Ok((before - state.rows.len()) as u64)
    }
}

/// Publisher double that records acknowledged events.
#[derive(Default)]
pub(crate) struct RecordingJsonObjectPublisher {
    created: Mutex<Vec<JsonObject>>,
    deleted: Mutex<Vec<i64>>,
    fail: AtomicBool,
}

impl RecordingJsonObjectPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent publish fail with a sink error.
    pub(crate) fn fail_next_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn created(&self) -> Vec<JsonObject> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn clear(&self) {
        self.created.lock().unwrap().clear();
        self.deleted.lock().unwrap().clear();
    }

    fn check_fault(&self) -> ServiceResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            let err = redis::RedisError::from((redis::ErrorKind::IoError, "event sink unavailable"));
            return Err(ServiceError::Publish(PublishError::Stream(err)));
        }
        Ok(())
    }
}

#[async_trait]
impl JsonObjectEventPublisher for RecordingJsonObjectPublisher {
    async fn publish_created(&self, object: &JsonObject) -> ServiceResult<()> {
        self.check_fault()?;
        self.created.lock().unwrap().push(object.clone());
        Ok(())
    }

    async fn publish_deleted(&self, id: i64) -> ServiceResult<()> {
        self.check_fault()?;
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}
