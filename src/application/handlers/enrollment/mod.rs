//! Enrollment handlers.

mod applier;
mod enrolled_courses;

pub use applier::EnrollmentApplier;
pub use enrolled_courses::{EnrolledCoursesHandler, EnrolledCoursesQuery};
