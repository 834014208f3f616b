//! PostgreSQL implementation of course storage.
//!
//! Ratings are stored as a JSONB map of user id to rating. The
//! enrolled-students set deliberately has no column here; it lives in the
//! enrollments table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::catalog::Course;
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, Money, Percentage, Rating, Timestamp, UserId,
};
use crate::ports::CourseRepository;

/// PostgreSQL implementation of the `CourseRepository` port.
pub struct PostgresCourseStore {
    pool: PgPool,
}

impl PostgresCourseStore {
    /// Creates a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a course.
#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    educator_id: String,
    title: String,
    description: String,
    price: Decimal,
    discount: i16,
    is_published: bool,
    ratings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let discount = u8::try_from(row.discount)
            .ok()
            .and_then(|d| Percentage::try_new(d).ok())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid discount value: {}", row.discount),
                )
            })?;

        let ratings: HashMap<UserId, Rating> =
            serde_json::from_value(row.ratings).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid ratings: {}", e))
            })?;

        Ok(Course {
            id: CourseId::from_uuid(row.id),
            educator_id: UserId::new(row.educator_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid educator_id: {}", e))
            })?,
            title: row.title,
            description: row.description,
            price: Money::new(row.price).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid price: {}", e))
            })?,
            discount,
            is_published: row.is_published,
            ratings,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn ratings_json(course: &Course) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(&course.ratings).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to serialize ratings: {}", e),
        )
    })
}

fn db_err(e: sqlx::Error, context: &str) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const SELECT_COLUMNS: &str = "id, educator_id, title, description, price, discount, \
                              is_published, ratings, created_at, updated_at";

#[async_trait]
impl CourseRepository for PostgresCourseStore {
    async fn create(&self, course: &Course) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO courses (
                id, educator_id, title, description, price, discount,
                is_published, ratings, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(course.id.as_uuid())
        .bind(course.educator_id.as_str())
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price.amount())
        .bind(i16::from(course.discount.value()))
        .bind(course.is_published)
        .bind(ratings_json(course)?)
        .bind(course.created_at.as_datetime())
        .bind(course.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to create course"))?;
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE courses
            SET title = $2, description = $3, price = $4, discount = $5,
                is_published = $6, ratings = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(course.id.as_uuid())
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price.amount())
        .bind(i16::from(course.discount.value()))
        .bind(course.is_published)
        .bind(ratings_json(course)?)
        .bind(course.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to update course"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> =
            sqlx::query_as(&format!("SELECT {} FROM courses WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_err(e, "Failed to load course"))?;

        row.map(Course::try_from).transpose()
    }

    async fn list_published(&self) -> Result<Vec<Course>, DomainError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            "SELECT {} FROM courses WHERE is_published ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to list courses"))?;

        rows.into_iter().map(Course::try_from).collect()
    }
}
