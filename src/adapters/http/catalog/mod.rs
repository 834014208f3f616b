//! Catalog endpoints: course reads and educator course creation.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use routes::{course_routes, educator_routes};
