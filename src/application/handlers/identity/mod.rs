//! Identity handlers - user lifecycle sync from the identity provider.

mod sync_user;

pub use sync_user::{SyncIdentityHandler, SyncOutcome};
