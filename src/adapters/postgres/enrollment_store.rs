//! PostgreSQL implementation of the enrollment relation.
//!
//! One table of (user_id, course_id) pairs with a composite primary key.
//! The mirrored per-user and per-course sets are projections of this table,
//! so they cannot diverge, and `INSERT ... ON CONFLICT DO NOTHING` gives
//! the atomic add-if-absent the applier's exactly-once contract needs
//! without trusting anything beyond the primary key constraint.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::ports::{EnrollmentOutcome, EnrollmentStore};

/// PostgreSQL implementation of the `EnrollmentStore` port.
pub struct PostgresEnrollmentStore {
    pool: PgPool,
}

impl PostgresEnrollmentStore {
    /// Creates a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error, context: &str) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl EnrollmentStore for PostgresEnrollmentStore {
    async fn add_if_absent(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<EnrollmentOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, course_id, enrolled_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_str())
        .bind(course_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to add enrollment"))?;

        if result.rows_affected() == 1 {
            Ok(EnrollmentOutcome::Inserted)
        } else {
            Ok(EnrollmentOutcome::AlreadyEnrolled)
        }
    }

    async fn is_enrolled(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id.as_str())
        .bind(course_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to check enrollment"))?;
        Ok(exists)
    }

    async fn courses_of(&self, user_id: &UserId) -> Result<Vec<CourseId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT course_id FROM enrollments WHERE user_id = $1 ORDER BY enrolled_at",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to list enrolled courses"))?;
        Ok(ids.into_iter().map(CourseId::from_uuid).collect())
    }

    async fn students_of(&self, course_id: &CourseId) -> Result<Vec<UserId>, DomainError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at",
        )
        .bind(course_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to list enrolled students"))?;

        ids.into_iter()
            .map(|id| {
                UserId::new(id).map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
                })
            })
            .collect()
    }
}
