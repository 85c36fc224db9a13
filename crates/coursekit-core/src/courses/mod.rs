//! Courses: catalogue, lesson videos and per-user progress.

pub mod service;

pub use self::service::{CourseService, DETAIL_FIELDS, DETAIL_PROGRESS_FIELDS};
