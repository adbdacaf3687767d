//! Review schedules attached to reports.
//!
//! A review has its own small lifecycle and never gates the report's.

mod service;
mod types;

pub use service::{MAX_REVIEW_NOTES_LEN, ReviewService};
pub use types::{NewReview, ReviewSchedule, ReviewStatus, ReviewType};
