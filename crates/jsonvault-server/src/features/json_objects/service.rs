//! Business logic for the JSON object resource

use std::sync::Arc;

use tracing::info;

use crate::error::{ServiceError, ServiceResult};

use super::publisher::JsonObjectEventPublisher;
use super::storage::JsonObjectStorage;
use super::types::{JsonObject, NewJsonObject};

/// Orchestrates the uniqueness check, the write, and the event publish.
///
/// Holds no state beyond its injected adapters; every operation is scoped
/// to a single request.
pub struct JsonObjectService {
    storage: Arc<dyn JsonObjectStorage>,
    publisher: Arc<dyn JsonObjectEventPublisher>,
}

impl JsonObjectService {
    pub fn new(
        storage: Arc<dyn JsonObjectStorage>,
        publisher: Arc<dyn JsonObjectEventPublisher>,
    ) -> Self {
        Self { storage, publisher }
    }

    /// Creates a JSON object and publishes the "created" event.
    ///
    /// The pre-insert existence query is advisory; two concurrent creates
    /// for the same `sf_object_id` can both pass it, and the unique index
    /// in storage is what actually serializes them (its violation surfaces
    /// here as `AlreadyExists`).
    ///
    /// A publish failure fails the whole call even though the row is
    /// already committed. The row is intentionally not rolled back, so the
    /// caller can see a 500 for data that was in fact saved; consumers of
    /// the stream must treat it as at-least-once, not exactly-once.
    #[tracing::instrument(skip(self, object), fields(sf_object_id = %object.sf_object_id))]
    pub async fn create(&self, object: NewJsonObject) -> ServiceResult<JsonObject> {
        if self
            .storage
            .exists_by_sf_object_id(&object.sf_object_id)
            .await?
        {
            return Err(ServiceError::AlreadyExists);
        }

        let id = self.storage.create(&object).await?;

        let created = JsonObject {
            id,
            object: object.object,
            sf_object_id: object.sf_object_id,
            schema_id: object.schema_id,
            user_id: object.user_id,
        };

        self.publisher.publish_created(&created).await?;

        info!(id, "JSON object created");
        Ok(created)
    }

    /// Fetches a JSON object by its storage-assigned id.
    pub async fn get_by_id(&self, id: i64) -> ServiceResult<JsonObject> {
        self.storage.get_by_id(id).await
    }

    /// Deletes a JSON object and publishes the "deleted" event.
    ///
    /// The publish runs strictly after the row is gone; if it fails there
    /// is no compensating re-insert.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let affected = self.storage.delete(id).await?;
        if affected == 0 {
            return Err(ServiceError::NotFound);
        }

        self.publisher.publish_deleted(id).await?;

        info!(id, "JSON object deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::json_objects::testing::{
        InMemoryJsonObjectStorage, RecordingJsonObjectPublisher,
    };

    fn new_object(sf_object_id: &str) -> NewJsonObject {
        NewJsonObject {
            object: r#"{"k":"v"}"#.to_string(),
            sf_object_id: sf_object_id.to_string(),
            schema_id: "schema-1".to_string(),
            user_id: "user-1".to_string(),
        }
    }

    fn service_with(
        storage: Arc<InMemoryJsonObjectStorage>,
        publisher: Arc<RecordingJsonObjectPublisher>,
    ) -> JsonObjectService {
        JsonObjectService::new(storage, publisher)
    }

    #[tokio::test]
    async fn create_assigns_id_and_publishes_once() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage.clone(), publisher.clone());

        let created = service.create(new_object("sf-1")).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.sf_object_id, "sf-1");
        assert_eq!(storage.rows(), vec![created.clone()]);
        assert_eq!(publisher.created(), vec![created]);
    }

    #[tokio::test]
    async fn create_duplicate_key_writes_and_publishes_nothing() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage.clone(), publisher.clone());

        service.create(new_object("sf-1")).await.unwrap();
        publisher.clear();

        let err = service.create(new_object("sf-1")).await.unwrap_err();

        assert!(matches!(err, ServiceError::AlreadyExists));
        assert_eq!(storage.rows().len(), 1);
        assert!(publisher.created().is_empty());
    }

    #[tokio::test]
    async fn create_surfaces_storage_fault_from_uniqueness_check() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        storage.fail_next_calls();
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage, publisher.clone());

        let err = service.create(new_object("sf-1")).await.unwrap_err();

        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(publisher.created().is_empty());
    }

    #[tokio::test]
    async fn create_publish_failure_leaves_row_committed() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        publisher.fail_next_calls();
        let service = service_with(storage.clone(), publisher.clone());

        let err = service.create(new_object("sf-1")).await.unwrap_err();

        // The documented inconsistency window: the caller gets an error
        // although the write is durable.
        assert!(matches!(err, ServiceError::Publish(_)));
        assert_eq!(storage.rows().len(), 1);
        assert!(publisher.created().is_empty());
    }

    #[tokio::test]
    async fn get_by_id_round_trips_all_fields() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage, publisher);

        let input = new_object("sf-1");
        let created = service.create(input.clone()).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.object, input.object);
        assert_eq!(fetched.schema_id, input.schema_id);
        assert_eq!(fetched.user_id, input.user_id);
    }

    #[tokio::test]
    async fn get_by_id_missing_row_is_not_found() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage, publisher);

        let err = service.get_by_id(99).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[tokio::test]
    async fn delete_missing_row_publishes_nothing() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage, publisher.clone());

        let err = service.delete(99).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound));
        assert!(publisher.deleted().is_empty());
    }

    #[tokio::test]
    async fn delete_publishes_after_row_is_gone() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage.clone(), publisher.clone());

        let created = service.create(new_object("sf-1")).await.unwrap();
        service.delete(created.id).await.unwrap();

        assert!(storage.rows().is_empty());
        assert_eq!(publisher.deleted(), vec![created.id]);
    }

    #[tokio::test]
    async fn delete_publish_failure_leaves_row_deleted() {
        let storage = Arc::new(InMemoryJsonObjectStorage::new());
        let publisher = Arc::new(RecordingJsonObjectPublisher::new());
        let service = service_with(storage.clone(), publisher.clone());

        let created = service.create(new_object("sf-1")).await.unwrap();
        publisher.fail_next_calls();

        let err = service.delete(created.id).await.unwrap_err();

        // No compensating re-insert: the row stays gone.
        assert!(matches!(err, ServiceError::Publish(_)));
        assert!(storage.rows().is_empty());
        assert!(publisher.deleted().is_empty());
    }
}
