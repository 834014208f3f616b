//! Stripe adapter - payment gateway implementation.

mod gateway;
mod mock_gateway;
mod wire;

pub use gateway::{StripeConfig, StripeGateway};
pub use mock_gateway::MockGateway;
