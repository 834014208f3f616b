//! User-facing endpoints: profile data, purchases, enrollments, ratings.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use routes::routes;
