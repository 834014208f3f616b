//! PostgreSQL implementation of the purchase ledger.
//!
//! The conditional transition is a single `UPDATE ... WHERE status =
//! 'pending'`, so concurrent settlements of the same purchase serialize at
//! the database row: exactly one statement reports a changed row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, Money, PurchaseId, Timestamp, UserId,
};
use crate::domain::purchase::{Purchase, PurchaseStatus};
use crate::ports::{PurchaseRepository, TransitionOutcome};

/// PostgreSQL implementation of the `PurchaseRepository` port.
pub struct PostgresPurchaseStore {
    pool: PgPool,
}

impl PostgresPurchaseStore {
    /// Creates a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a purchase.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    user_id: String,
    course_id: Uuid,
    amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Purchase {
            id: PurchaseId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            course_id: CourseId::from_uuid(row.course_id),
            amount: Money::new(row.amount).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid amount: {}", e))
            })?,
            status: parse_status(&row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PurchaseStatus, DomainError> {
    match s {
        "pending" => Ok(PurchaseStatus::Pending),
        "success" => Ok(PurchaseStatus::Success),
        "failed" => Ok(PurchaseStatus::Failed),
        "expired" => Ok(PurchaseStatus::Expired),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn db_err(e: sqlx::Error, context: &str) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl PurchaseRepository for PostgresPurchaseStore {
    async fn create(&self, purchase: &Purchase) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO purchases (id, user_id, course_id, amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(purchase.id.as_uuid())
        .bind(purchase.user_id.as_str())
        .bind(purchase.course_id.as_uuid())
        .bind(purchase.amount.amount())
        .bind(purchase.status.as_str())
        .bind(purchase.created_at.as_datetime())
        .bind(purchase.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to create purchase"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>, DomainError> {
        let row: Option<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, amount, status, created_at, updated_at
            FROM purchases WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to load purchase"))?;

        row.map(Purchase::try_from).transpose()
    }

    async fn find_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Purchase>, DomainError> {
        let row: Option<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, amount, status, created_at, updated_at
            FROM purchases
            WHERE user_id = $1 AND course_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to load purchase by user and course"))?;

        row.map(Purchase::try_from).transpose()
    }

    async fn transition(
        &self,
        id: &PurchaseId,
        to: PurchaseStatus,
    ) -> Result<TransitionOutcome, DomainError> {
        let updated: Option<PurchaseRow> = sqlx::query_as(
            r#"
            UPDATE purchases
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, user_id, course_id, amount, status, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to transition purchase"))?;

        if let Some(row) = updated {
            return Ok(TransitionOutcome::Applied(Purchase::try_from(row)?));
        }

        // No pending row matched: either the record is terminal or missing.
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM purchases WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err(e, "Failed to read purchase status"))?;

        match status {
            Some(s) => Ok(TransitionOutcome::AlreadyTerminal(parse_status(&s)?)),
            None => Ok(TransitionOutcome::NotFound),
        }
    }
}
