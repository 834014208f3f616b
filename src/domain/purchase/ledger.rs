//! Purchase aggregate - the ledger record of one checkout attempt.
//!
//! A Purchase is created when checkout starts and reconciled to a terminal
//! state by the gateway-event reconciler. Records are never deleted; a
//! free-course enrollment writes a settled zero-amount record as an audit
//! trail.
//!
//! # Invariants
//!
//! - The only transitions are `pending → success`, `pending → failed`, and
//!   `pending → expired`. No transition skips pending, and terminal records
//!   are immutable.
//! - `amount` is non-negative (enforced by [`Money`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{CourseId, Money, PurchaseId, Timestamp, UserId};

/// Status of a purchase in the checkout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Checkout session created, awaiting the gateway's verdict.
    Pending,

    /// Payment confirmed; enrollment has been applied.
    Success,

    /// The gateway reported a failed payment.
    Failed,

    /// The checkout session lapsed without payment.
    Expired,
}

impl PurchaseStatus {
    /// Returns true if this status is terminal (record is immutable).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PurchaseStatus::Pending)
    }

    /// Returns true if a transition from self to target is allowed.
    ///
    /// Only pending records may move, and only to a terminal state.
    pub fn can_transition_to(&self, target: PurchaseStatus) -> bool {
        matches!(self, PurchaseStatus::Pending) && target.is_terminal()
    }

    /// Stable string form used in persistence and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Success => "success",
            PurchaseStatus::Failed => "failed",
            PurchaseStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by Purchase operations.
#[derive(Debug, Clone, Error)]
pub enum PurchaseError {
    /// Attempted state transition is not valid.
    #[error("Cannot transition purchase from {from} to {to}")]
    InvalidTransition {
        from: PurchaseStatus,
        to: PurchaseStatus,
    },
}

/// Purchase aggregate - one row in the checkout ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique identifier, generated at creation and embedded as gateway
    /// session metadata for later correlation.
    pub id: PurchaseId,

    /// The buying user.
    pub user_id: UserId,

    /// The course being bought.
    pub course_id: CourseId,

    /// The amount charged (after discount), in major currency units.
    pub amount: Money,

    /// Current lifecycle status.
    pub status: PurchaseStatus,

    /// When the purchase was created.
    pub created_at: Timestamp,

    /// When the purchase last changed state.
    pub updated_at: Timestamp,
}

impl Purchase {
    /// Creates a pending purchase awaiting gateway confirmation.
    pub fn pending(id: PurchaseId, user_id: UserId, course_id: CourseId, amount: Money) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            course_id,
            amount,
            status: PurchaseStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an already-settled zero-amount record for a free-course
    /// enrollment. No gateway is involved.
    pub fn settled_free(id: PurchaseId, user_id: UserId, course_id: CourseId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            course_id,
            amount: Money::ZERO,
            status: PurchaseStatus::Success,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if this record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves the purchase to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::InvalidTransition`] if the record is not
    /// pending or the target is not terminal.
    pub fn settle(&mut self, target: PurchaseStatus) -> Result<(), PurchaseError> {
        if !self.status.can_transition_to(target) {
            return Err(PurchaseError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pending_purchase() -> Purchase {
        Purchase::pending(
            PurchaseId::new(),
            UserId::new("user_1").unwrap(),
            CourseId::new(),
            Money::new(dec!(80.00)).unwrap(),
        )
    }

    #[test]
    fn pending_starts_non_terminal() {
        let purchase = pending_purchase();
        assert_eq!(purchase.status, PurchaseStatus::Pending);
        assert!(!purchase.is_terminal());
    }

    #[test]
    fn settled_free_is_terminal_with_zero_amount() {
        let purchase = Purchase::settled_free(
            PurchaseId::new(),
            UserId::new("user_1").unwrap(),
            CourseId::new(),
        );
        assert_eq!(purchase.status, PurchaseStatus::Success);
        assert!(purchase.amount.is_zero());
        assert!(purchase.is_terminal());
    }

    #[test]
    fn settle_moves_pending_to_each_terminal_state() {
        for target in [
            PurchaseStatus::Success,
            PurchaseStatus::Failed,
            PurchaseStatus::Expired,
        ] {
            let mut purchase = pending_purchase();
            purchase.settle(target).unwrap();
            assert_eq!(purchase.status, target);
        }
    }

    #[test]
    fn terminal_records_are_immutable() {
        let mut purchase = pending_purchase();
        purchase.settle(PurchaseStatus::Success).unwrap();

        let result = purchase.settle(PurchaseStatus::Expired);
        assert!(matches!(
            result,
            Err(PurchaseError::InvalidTransition { .. })
        ));
        assert_eq!(purchase.status, PurchaseStatus::Success);
    }

    #[test]
    fn cannot_transition_to_pending() {
        let mut purchase = pending_purchase();
        let result = purchase.settle(PurchaseStatus::Pending);
        assert!(result.is_err());
    }

    #[test]
    fn status_strings_are_stable() {
        assert_eq!(PurchaseStatus::Pending.as_str(), "pending");
        assert_eq!(PurchaseStatus::Success.as_str(), "success");
        assert_eq!(PurchaseStatus::Failed.as_str(), "failed");
        assert_eq!(PurchaseStatus::Expired.as_str(), "expired");
    }
}
