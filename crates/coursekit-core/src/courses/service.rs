//! Course operations: create, list, detail with progress, soft delete, progress tracking.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use crate::app::AppState;
use crate::domain::{
    Course, CourseId, CourseProgress, CourseView, ProgressKey, User, UserId, Video, VideoId,
};
use crate::error::CoreError;
use crate::ports::Record;
use crate::serializer::{FieldMask, FieldWriter};

/// Fields of the course detail response (plus `progress`).
pub const DETAIL_FIELDS: [&str; 6] = [
    "title",
    "description",
    "category",
    "instructor",
    "created_at",
    "videos",
];

/// Viewer progress as embedded in the course detail.
pub const DETAIL_PROGRESS_FIELDS: [&str; 3] =
    ["current_video", "progress_percentage", "completed_videos"];

#[derive(Clone)]
pub struct CourseService {
    state: Arc<AppState>,
}

impl CourseService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Create a published course owned by `instructor`; returns every field.
    pub async fn create(
        &self,
        instructor: UserId,
        payload: &Map<String, Value>,
    ) -> Result<Map<String, Value>, CoreError> {
        let owner = self.user(instructor).await?;
        let draft = Course::draft(self.state.ids.generate(), owner.id, self.state.clock.now());
        let course = FieldWriter::only(Course::CREATE_FIELDS.iter().copied())
            .apply(&draft, payload, false)?;

        self.state.courses.save(course.clone()).await?;
        info!(course_id = %course.id, instructor = %owner.id, "course created");

        let view = CourseView::new(course, owner, Vec::new());
        Ok(FieldMask::all().serialize(&view, &self.state.media))
    }

    /// Published, non-deleted courses.
    pub async fn list(&self, mask: &FieldMask) -> Result<Vec<Value>, CoreError> {
        let courses = self.state.courses.find(&|c: &Course| c.is_visible()).await?;
        let mut views = Vec::with_capacity(courses.len());
        for course in courses {
            views.push(self.view(course).await?);
        }
        Ok(mask.serialize_many(&views, &self.state.media))
    }

    /// Course detail with the viewer's progress (`null` when none).
    pub async fn detail(
        &self,
        course_id: CourseId,
        viewer: Option<UserId>,
    ) -> Result<Map<String, Value>, CoreError> {
        let course = self.visible_course(course_id).await?;
        let view = self.view(course).await?;
        let mut out = FieldMask::only(DETAIL_FIELDS).serialize(&view, &self.state.media);

        let progress = match viewer {
            Some(user) => self.state.progress.get(&ProgressKey { user, course: course_id }).await?,
            None => None,
        };
        let progress = progress.map_or(Value::Null, |p| {
            Value::Object(FieldMask::only(DETAIL_PROGRESS_FIELDS).serialize(&p, &self.state.media))
        });
        out.insert("progress".to_string(), progress);
        Ok(out)
    }

    pub async fn soft_delete(&self, course_id: CourseId, instructor: UserId) -> Result<(), CoreError> {
        let mut course = self
            .owned_course(course_id, instructor, |c| !c.is_deleted)
            .await?;
        course.soft_delete(self.state.clock.now());
        self.state.courses.save(course).await?;
        info!(course_id = %course_id, "course deleted");
        Ok(())
    }

    pub async fn recover(&self, course_id: CourseId, instructor: UserId) -> Result<(), CoreError> {
        let mut course = self
            .owned_course(course_id, instructor, |c| c.is_deleted)
            .await?;
        course.recover(self.state.clock.now());
        self.state.courses.save(course).await?;
        info!(course_id = %course_id, "course recovered");
        Ok(())
    }

    /// Add a lesson video to an owned course; returns the stored video.
    pub async fn add_video(
        &self,
        course_id: CourseId,
        instructor: UserId,
        payload: &Map<String, Value>,
    ) -> Result<Map<String, Value>, CoreError> {
        let course = self
            .owned_course(course_id, instructor, |c| !c.is_deleted)
            .await?;
        let draft = Video::draft(self.state.ids.generate(), course.id, self.state.clock.now());
        let video = FieldWriter::default().apply(&draft, payload, false)?;

        self.state.videos.save(video.clone()).await?;
        info!(course_id = %course.id, video_id = %video.id, "video added");
        Ok(FieldMask::all().serialize(&video, &self.state.media))
    }

    /// Record a watched video and recompute the viewer's progress.
    pub async fn complete_video(
        &self,
        user: UserId,
        course_id: CourseId,
        video_id: VideoId,
    ) -> Result<Map<String, Value>, CoreError> {
        self.user(user).await?;
        let course = self.visible_course(course_id).await?;
        let videos = self.videos_of(course.id).await?;
        if !videos.iter().any(|v| v.id == video_id) {
            return Err(CoreError::not_found(Video::KIND, video_id));
        }

        let now = self.state.clock.now();
        let key = ProgressKey { user, course: course.id };
        let mut progress = self
            .state
            .progress
            .get(&key)
            .await?
            .unwrap_or_else(|| CourseProgress::start(user, course.id, now));
        progress.complete_video(video_id, videos.len(), now);

        self.state.progress.save(progress.clone()).await?;
        info!(
            user_id = %user,
            course_id = %course.id,
            progress = progress.progress_percentage,
            "video completed"
        );
        Ok(FieldMask::all().serialize(&progress, &self.state.media))
    }

    async fn user(&self, id: UserId) -> Result<User, CoreError> {
        self.state
            .users
            .get(&id)
            .await?
            .ok_or_else(|| CoreError::not_found(User::KIND, id))
    }

    async fn visible_course(&self, id: CourseId) -> Result<Course, CoreError> {
        self.state
            .courses
            .get(&id)
            .await?
            .filter(Course::is_visible)
            .ok_or_else(|| CoreError::not_found(Course::KIND, id))
    }

    /// A course owned by `instructor` that passes `state`; anything else is not found.
    async fn owned_course(
        &self,
        id: CourseId,
        instructor: UserId,
        state: impl Fn(&Course) -> bool,
    ) -> Result<Course, CoreError> {
        self.state
            .courses
            .get(&id)
            .await?
            .filter(|c| c.instructor == instructor && state(c))
            .ok_or_else(|| CoreError::not_found(Course::KIND, id))
    }

    async fn videos_of(&self, course: CourseId) -> Result<Vec<Video>, CoreError> {
        Ok(self
            .state
            .videos
            .find(&|v: &Video| v.course == course)
            .await?)
    }

    async fn view(&self, course: Course) -> Result<CourseView, CoreError> {
        let instructor = self.user(course.instructor).await?;
        let videos = self.videos_of(course.id).await?;
        Ok(CourseView::new(course, instructor, videos))
    }
}
