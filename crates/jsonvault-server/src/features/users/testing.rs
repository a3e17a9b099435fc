//! In-memory adapter doubles for user tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PublishError, ServiceError, ServiceResult};

use super::publisher::UserEventPublisher;
use super::storage::UserStorage;
use super::types::{NewUser, User};

#[derive(Default)]
struct State {
    next_id: i64,
    rows: Vec<User>,
}

#[derive(Default)]
pub(crate) struct InMemoryUserStorage {
    state: Mutex<State>,
    fail: AtomicBool,
}

impl InMemoryUserStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_next_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn rows(&self) -> Vec<User> {
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
impl UserStorage for InMemoryUserStorage {
    async fn create(&self, user: &NewUser) -> ServiceResult<i64> {
        self.check_fault()?;
        let mut state = self.state.lock().unwrap();

        if state
            .rows
            .iter()
            .any(|row| row.email_address == user.email_address)
        {
            return Err(ServiceError::AlreadyExists);
        }

        state.next_id += 1;
        let id = state.next_id;
        state.rows.push(User {
            id,
            email_address: user.email_address.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        });

        Ok(id)
    }

    async fn exists_by_email_address(&self, email_address: &str) -> ServiceResult<bool> {
        self.check_fault()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .rows
            .iter()
            .any(|row| row.email_address == email_address))
    }

    async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
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

#[derive(Default)]
pub(crate) struct RecordingUserPublisher {
    created: Mutex<Vec<User>>,
    deleted: Mutex<Vec<i64>>,
    fail: AtomicBool,
}

impl RecordingUserPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_next_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn created(&self) -> Vec<User> {
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
impl UserEventPublisher for RecordingUserPublisher {
    async fn publish_created(&self, user: &User) -> ServiceResult<()> {
        self.check_fault()?;
        self.created.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn publish_deleted(&self, id: i64) -> ServiceResult<()> {
        self.check_fault()?;
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}
