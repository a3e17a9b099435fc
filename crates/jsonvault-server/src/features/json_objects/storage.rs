//! Storage adapter for JSON objects
//!
//! The trait is the capability the service depends on; `PgJsonObjectStorage`
//! is the PostgreSQL implementation. Row structs stay private to this module
//! so the rest of the slice only ever sees logic-layer entities.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::error::{ServiceError, ServiceResult};

use super::types::{JsonObject, NewJsonObject};

/// Row-oriented persistence for JSON objects
#[async_trait]
pub trait JsonObjectStorage: Send + Sync {
    /// Inserts a new row and returns the storage-assigned id.
    ///
    /// A uniqueness-constraint violation on `sf_object_id` is reported as
    /// `AlreadyExists`; storage is the authoritative uniqueness check, not
    /// the service's advisory pre-query.
    async fn create(&self, object: &NewJsonObject) -> ServiceResult<i64>;

    /// Whether any live row currently holds this correlation id.
    async fn exists_by_sf_object_id(&self, sf_object_id: &str) -> ServiceResult<bool>;

    /// Fetches a row by id, failing with `NotFound` if absent.
    async fn get_by_id(&self, id: i64) -> ServiceResult<JsonObject>;

    /// Removes a row by id, returning the number of rows affected so the
    /// caller can map zero to `NotFound`.
    async fn delete(&self, id: i64) -> ServiceResult<u64>;
}

/// PostgreSQL-backed storage
pub struct PgJsonObjectStorage {
    pool: PgPool,
}

impl PgJsonObjectStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct JsonObjectRow {
    id: i64,
    json_object: String,
    sf_object_id: String,
    schema_id: String,
    user_id: String,
}

impl From<JsonObjectRow> for JsonObject {
    fn from(row: JsonObjectRow) -> Self {
        JsonObject {
            id: row.id,
            object: row.json_object,
            sf_object_id: row.sf_object_id,
            schema_id: row.schema_id,
            user_id: row.user_id,
        }
    }
}

#[async_trait]
impl JsonObjectStorage for PgJsonObjectStorage {
    async fn create(&self, object: &NewJsonObject) -> ServiceResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO json_objects (json_object, sf_object_id, schema_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&object.object)
        .bind(&object.sf_object_id)
        .bind(&object.schema_id)
        .bind(&object.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return ServiceError::AlreadyExists;
                }
            }
            ServiceError::Storage(e)
        })?;

        Ok(id)
    }

    async fn exists_by_sf_object_id(&self, sf_object_id: &str) -> ServiceResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM json_objects WHERE sf_object_id = $1)",
        )
        .bind(sf_object_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn get_by_id(&self, id: i64) -> ServiceResult<JsonObject> {
        let row = sqlx::query_as::<_, JsonObjectRow>(
            r#"
            SELECT id, json_object, sf_object_id, schema_id, user_id
            FROM json_objects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(JsonObject::from).ok_or(ServiceError::NotFound)
    }

    async fn delete(&self, id: i64) -> ServiceResult<u64> {
        let result = sqlx::query("DELETE FROM json_objects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_maps_to_entity() {
        let row = JsonObjectRow {
            id: 7,
            json_object: r#"{"a":1}"#.to_string(),
            sf_object_id: "sf-7".to_string(),
            schema_id: "schema-1".to_string(),
            user_id: "user-9".to_string(),
        };

        let entity = JsonObject::from(row);
        assert_eq!(entity.id, 7);
        assert_eq!(entity.object, r#"{"a":1}"#);
        assert_eq!(entity.sf_object_id, "sf-7");
        assert_eq!(entity.schema_id, "schema-1");
        assert_eq!(entity.user_id, "user-9");
    }
}
