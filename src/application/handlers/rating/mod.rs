//! Rating handlers.

mod rate_course;

pub use rate_course::{RateCourseCommand, RateCourseError, RateCourseHandler};
