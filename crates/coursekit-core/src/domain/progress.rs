//! Per-user course progress.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::ids::{CourseId, UserId, VideoId};
use crate::ports::Record;
use crate::serializer::shape::{Projection, Shape, iso8601, iso8601_opt};

/// (user, course) - one progress row per enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgressKey {
    pub user: UserId,
    pub course: CourseId,
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.course)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseProgress {
    pub user: UserId,
    pub course: CourseId,
    pub current_video: Option<VideoId>,
    pub completed_videos: BTreeSet<VideoId>,
    pub progress_percentage: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CourseProgress {
    pub fn start(user: UserId, course: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            user,
            course,
            current_video: None,
            completed_videos: BTreeSet::new(),
            progress_percentage: 0.0,
            started_at: now,
            completed_at: None,
        }
    }

    /// Mark a video as watched. Completing the same video again changes nothing
    /// but `current_video`.
    pub fn complete_video(&mut self, video: VideoId, total_videos: usize, now: DateTime<Utc>) {
        self.current_video = Some(video);
        self.completed_videos.insert(video);
        self.update_progress(total_videos, now);
    }

    /// Recompute the percentage; the first time it reaches 100 stamps `completed_at`.
    pub fn update_progress(&mut self, total_videos: usize, now: DateTime<Utc>) {
        if total_videos == 0 {
            return;
        }
        let completed = self.completed_videos.len().min(total_videos);
        self.progress_percentage = completed as f64 / total_videos as f64 * 100.0;
        if completed == total_videos && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }
}

impl Record for CourseProgress {
    type Key = ProgressKey;
    const KIND: &'static str = "course progress";

    fn key(&self) -> ProgressKey {
        ProgressKey {
            user: self.user,
            course: self.course,
        }
    }
}

impl Shape for CourseProgress {
    const FIELDS: &'static [&'static str] = &[
        "current_video",
        "progress_percentage",
        "completed_videos",
        "started_at",
        "completed_at",
    ];

    fn field(&self, name: &str, _p: &Projection<'_>) -> Value {
        match name {
            "current_video" => json!(self.current_video),
            "progress_percentage" => json!(self.progress_percentage),
            "completed_videos" => json!(self.completed_videos),
            "started_at" => iso8601(&self.started_at),
            "completed_at" => iso8601_opt(self.completed_at.as_ref()),
            _ => Value::Null,
        }
    }
}
