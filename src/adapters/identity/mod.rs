//! Identity provider adapter - capability checks via role metadata.

mod authorizer;

pub use authorizer::{IdentityProviderAuthorizer, IdentityProviderConfig};
