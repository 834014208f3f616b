//! Webhook endpoints: payment gateway and identity provider channels.

mod handlers;
mod routes;

pub use routes::routes;
