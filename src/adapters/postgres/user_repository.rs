//! PostgreSQL implementation of user profile storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::UserProfile;
use crate::ports::UserRepository;

/// PostgreSQL implementation of the `UserRepository` port.
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Creates a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user profile.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    email: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: UserId::new(row.id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            name: row.name,
            email: row.email,
            image_url: row.image_url,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_err(e: sqlx::Error, context: &str) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl UserRepository for PostgresUserStore {
    async fn upsert(&self, profile: &UserProfile) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                image_url = EXCLUDED.image_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.image_url)
        .bind(profile.created_at.as_datetime())
        .bind(profile.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to upsert user"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, image_url, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to load user"))?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn upsert_default(&self, id: &UserId) -> Result<UserProfile, DomainError> {
        // Insert-if-absent, then read back: racing creations resolve to a
        // single stored row via the primary key.
        let placeholder = UserProfile::placeholder(id.clone());
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(placeholder.id.as_str())
        .bind(&placeholder.name)
        .bind(&placeholder.email)
        .bind(&placeholder.image_url)
        .bind(placeholder.created_at.as_datetime())
        .bind(placeholder.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to create default user"))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::DatabaseError, "User vanished after upsert")
        })
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_err(e, "Failed to delete user"))?;
        Ok(())
    }
}
