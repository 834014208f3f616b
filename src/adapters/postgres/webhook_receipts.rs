//! PostgreSQL implementation of the webhook receipt trail.
//!
//! The primary key on event_id resolves racing deliveries of the same
//! event: exactly one insert sticks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{ProcessedWebhookStore, ReceiptInsert, WebhookDisposition, WebhookReceipt};

/// PostgreSQL implementation of the `ProcessedWebhookStore` port.
pub struct PostgresWebhookReceipts {
    pool: PgPool,
}

impl PostgresWebhookReceipts {
    /// Creates a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a receipt.
#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    event_id: String,
    event_type: String,
    disposition: String,
    detail: Option<String>,
    payload: serde_json::Value,
    received_at: DateTime<Utc>,
}

fn parse_disposition(s: &str) -> Result<WebhookDisposition, DomainError> {
    match s {
        "processed" => Ok(WebhookDisposition::Processed),
        "ignored" => Ok(WebhookDisposition::Ignored),
        "integrity_gap" => Ok(WebhookDisposition::IntegrityGap),
        "failed" => Ok(WebhookDisposition::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid disposition value: {}", s),
        )),
    }
}

impl TryFrom<ReceiptRow> for WebhookReceipt {
    type Error = DomainError;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        Ok(WebhookReceipt {
            event_id: row.event_id,
            event_type: row.event_type,
            disposition: parse_disposition(&row.disposition)?,
            detail: row.detail,
            payload: row.payload,
            received_at: Timestamp::from_datetime(row.received_at),
        })
    }
}

fn db_err(e: sqlx::Error, context: &str) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl ProcessedWebhookStore for PostgresWebhookReceipts {
    async fn find(&self, event_id: &str) -> Result<Option<WebhookReceipt>, DomainError> {
        let row: Option<ReceiptRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, disposition, detail, payload, received_at
            FROM webhook_receipts WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to load webhook receipt"))?;

        row.map(WebhookReceipt::try_from).transpose()
    }

    async fn record(&self, receipt: WebhookReceipt) -> Result<ReceiptInsert, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_receipts (
                event_id, event_type, disposition, detail, payload, received_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&receipt.event_id)
        .bind(&receipt.event_type)
        .bind(receipt.disposition.as_str())
        .bind(&receipt.detail)
        .bind(&receipt.payload)
        .bind(receipt.received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err(e, "Failed to record webhook receipt"))?;

        if result.rows_affected() == 1 {
            Ok(ReceiptInsert::Recorded)
        } else {
            Ok(ReceiptInsert::Duplicate)
        }
    }
}
