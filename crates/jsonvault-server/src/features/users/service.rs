//! Business logic for the user resource

use std::sync::Arc;

use tracing::info;

use crate::error::{ServiceError, ServiceResult};

use super::publisher::UserEventPublisher;
use super::storage::UserStorage;
use super::types::{NewUser, User};

/// Orchestrates the uniqueness check, the write, and the event publish.
pub struct UserService {
    storage: Arc<dyn UserStorage>,
    publisher: Arc<dyn UserEventPublisher>,
}

impl UserService {
    pub fn new(storage: Arc<dyn UserStorage>, publisher: Arc<dyn UserEventPublisher>) -> Self {
        Self { storage, publisher }
    }

    /// Creates a user and publishes the "created" event.
    ///
    /// The existence query is advisory; the unique index on `email_address`
    /// is the authoritative check. A publish failure fails the call without
    /// rolling back the committed row.
    #[tracing::instrument(skip(self, user), fields(email_address = %user.email_address))]
    pub async fn create(&self, user: NewUser) -> ServiceResult<User> {
        if self
            .storage
            .exists_by_email_address(&user.email_address)
            .await?
        {
            return Err(ServiceError::AlreadyExists);
        }

        let id = self.storage.create(&user).await?;

        let created = User {
            id,
            email_address: user.email_address,
            first_name: user.first_name,
            last_name: user.last_name,
        };

        self.publisher.publish_created(&created).await?;

        info!(id, "user created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
        self.storage.get_by_id(id).await
    }

    /// Deletes a user and publishes the "deleted" event after the row is
    /// gone; there is no compensating re-insert on publish failure.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let affected = self.storage.delete(id).await?;
        if affected == 0 {
            return Err(ServiceError::NotFound);
        }

        self.publisher.publish_deleted(id).await?;

        info!(id, "user deleted");
        Ok(())
    }
}
