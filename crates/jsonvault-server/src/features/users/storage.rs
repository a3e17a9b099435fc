//! Storage adapter for users

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::error::{ServiceError, ServiceResult};

use super::types::{NewUser, User};

/// Row-oriented persistence for users
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Inserts a new row and returns the storage-assigned id. A unique
    /// violation on `email_address` is reported as `AlreadyExists`.
    async fn create(&self, user: &NewUser) -> ServiceResult<i64>;

    async fn exists_by_email_address(&self, email_address: &str) -> ServiceResult<bool>;

    /// Fetches a row by id, failing with `NotFound` if absent.
    async fn get_by_id(&self, id: i64) -> ServiceResult<User>;

    /// Removes a row by id, returning the number of rows affected.
    async fn delete(&self, id: i64) -> ServiceResult<u64>;
}

/// PostgreSQL-backed storage
pub struct PgUserStorage {
    pool: PgPool,
}

impl PgUserStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email_address: String,
    first_name: String,
    last_name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email_address: row.email_address,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

#[async_trait]
impl UserStorage for PgUserStorage {
    async fn create(&self, user: &NewUser) -> ServiceResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email_address, first_name, last_name)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.email_address)
        .bind(&user.first_name)
        .bind(&user.last_name)
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

    async fn exists_by_email_address(&self, email_address: &str) -> ServiceResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email_address = $1)",
        )
        .bind(email_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email_address, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from).ok_or(ServiceError::NotFound)
    }

    async fn delete(&self, id: i64) -> ServiceResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
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
        let row = UserRow {
            id: 4,
            email_address: "a@example.com".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
        };

        let user = User::from(row);
        assert_eq!(user.id, 4);
        assert_eq!(user.email_address, "a@example.com");
        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.last_name, "Lee");
    }
}
