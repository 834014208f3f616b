//! Catalog handlers - course reads and educator course creation.

mod create_course;
mod queries;

pub use create_course::{CreateCourseCommand, CreateCourseError, CreateCourseHandler};
pub use queries::{GetCourseHandler, ListCoursesHandler};
