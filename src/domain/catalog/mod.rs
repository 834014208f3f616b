//! Catalog module - the Course aggregate.

mod course;

pub use course::{Course, CourseError};
