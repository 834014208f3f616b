//! In-memory store implementations.
//!
//! Deterministic, lock-based implementations of the store ports, used by
//! unit and integration tests. Locks guard short critical sections and are
//! never held across an await point.
//!
//! # Security Note
//!
//! These adapters are for **testing only**. They use `.expect()` on lock
//! operations, which panics if a lock is poisoned; production deployments
//! use the PostgreSQL adapters.

mod stores;

pub use stores::{
    InMemoryAuthorizer, InMemoryCourseStore, InMemoryEnrollmentStore, InMemoryPurchaseStore,
    InMemoryUserStore, InMemoryWebhookReceipts,
};
