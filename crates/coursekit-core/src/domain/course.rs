//! Course and Video entities, and the read view that joins them with the instructor.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::ids::{CourseId, UserId, VideoId};
use super::user::User;
use crate::ports::Record;
use crate::serializer::shape::{Projection, Shape, hms, iso8601};
use crate::serializer::validation::{self, FieldResult};
use crate::serializer::{FieldMask, Writable};

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub instructor: UserId,
    pub preview_image: Option<String>,
    pub preview_video: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_published: bool,
    pub is_deleted: bool,
}

impl Course {
    /// Fields an instructor supplies when creating a course.
    pub const CREATE_FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "category",
        "preview_image",
        "preview_video",
    ];

    /// Empty published course owned by `instructor`; filled in by the writer.
    pub fn draft(id: CourseId, instructor: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            category: String::new(),
            instructor,
            preview_image: None,
            preview_video: None,
            created_at: now,
            updated_at: now,
            is_published: true,
            is_deleted: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.is_published && !self.is_deleted
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.updated_at = now;
    }

    pub fn recover(&mut self, now: DateTime<Utc>) {
        self.is_deleted = false;
        self.updated_at = now;
    }
}

impl Record for Course {
    type Key = CourseId;
    const KIND: &'static str = "course";

    fn key(&self) -> CourseId {
        self.id
    }
}

impl Writable for Course {
    const WRITABLE: &'static [&'static str] = Course::CREATE_FIELDS;
    const REQUIRED: &'static [&'static str] = &["title", "description", "category"];

    fn write_field(&mut self, name: &str, value: &Value) -> FieldResult<()> {
        match name {
            "title" => self.title = validation::required_string(value, 255)?,
            "description" => self.description = validation::required_string(value, usize::MAX)?,
            "category" => self.category = validation::required_string(value, 100)?,
            "preview_image" => self.preview_image = validation::optional_string(value, 255)?,
            "preview_video" => self.preview_video = validation::optional_string(value, 255)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub course: CourseId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration_secs: u64,
    pub order: u32,
    pub is_preview: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl Video {
    pub fn draft(id: VideoId, course: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            course,
            title: String::new(),
            description: String::new(),
            video_url: String::new(),
            duration_secs: 0,
            order: 0,
            is_preview: false,
            uploaded_at: now,
        }
    }
}

impl Record for Video {
    type Key = VideoId;
    const KIND: &'static str = "video";

    fn key(&self) -> VideoId {
        self.id
    }
}

impl Shape for Video {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "video_url",
        "duration",
        "order",
        "is_preview",
    ];

    fn field(&self, name: &str, _p: &Projection<'_>) -> Value {
        match name {
            "id" => json!(self.id),
            "title" => json!(self.title),
            "description" => json!(self.description),
            "video_url" => json!(self.video_url),
            "duration" => hms(self.duration_secs),
            "order" => json!(self.order),
            "is_preview" => json!(self.is_preview),
            _ => Value::Null,
        }
    }
}

impl Writable for Video {
    const WRITABLE: &'static [&'static str] = &[
        "title",
        "description",
        "video_url",
        "duration",
        "order",
        "is_preview",
    ];
    const REQUIRED: &'static [&'static str] =
        &["title", "description", "video_url", "duration", "order"];

    fn write_field(&mut self, name: &str, value: &Value) -> FieldResult<()> {
        match name {
            "title" => self.title = validation::required_string(value, 255)?,
            "description" => self.description = validation::required_string(value, usize::MAX)?,
            "video_url" => self.video_url = validation::required_url(value, 200)?,
            "duration" => self.duration_secs = validation::duration_secs(value)?,
            "order" => self.order = validation::positive_integer(value)?,
            "is_preview" => self.is_preview = validation::boolean(value)?,
            _ => {}
        }
        Ok(())
    }
}

/// A course joined with its instructor and videos (ordered by `order`).
///
/// The store holds only the instructor id; services load the related rows
/// before rendering so a dangling reference becomes a not-found error there.
#[derive(Debug, Clone)]
pub struct CourseView {
    pub course: Course,
    pub instructor: User,
    pub videos: Vec<Video>,
}

impl CourseView {
    pub fn new(course: Course, instructor: User, mut videos: Vec<Video>) -> Self {
        videos.sort_by_key(|v| v.order);
        Self {
            course,
            instructor,
            videos,
        }
    }
}

impl Shape for CourseView {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "category",
        "instructor",
        "preview_image",
        "preview_image_url",
        "preview_video",
        "preview_video_url",
        "created_at",
        "updated_at",
        "is_published",
        "videos",
    ];

    fn field(&self, name: &str, p: &Projection<'_>) -> Value {
        let c = &self.course;
        match name {
            "id" => json!(c.id),
            "title" => json!(c.title),
            "description" => json!(c.description),
            "category" => json!(c.category),
            "instructor" => p.one("instructor", &self.instructor),
            "preview_image" => json!(c.preview_image),
            "preview_image_url" => p.file_url(c.preview_image.as_deref()),
            "preview_video" => json!(c.preview_video),
            "preview_video_url" => p.file_url(c.preview_video.as_deref()),
            "created_at" => iso8601(&c.created_at),
            "updated_at" => iso8601(&c.updated_at),
            "is_published" => json!(c.is_published),
            "videos" => p.many("videos", &self.videos),
            _ => Value::Null,
        }
    }

    fn nested_mask(relation: &str) -> Option<FieldMask> {
        match relation {
            "instructor" => Some(FieldMask::only(["id", "email", "name"])),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::{FieldWriter, SerializeContext};
    use chrono::TimeZone;
    use ulid::Ulid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn view() -> CourseView {
        let mut instructor = User::new(UserId::from_ulid(Ulid::new()), now());
        instructor.name = "Linus".into();
        instructor.email = "linus@example.com".into();
        instructor.bio = Some("kernel".into());

        let mut course = Course::draft(CourseId::from_ulid(Ulid::new()), instructor.id, now());
        course.title = "Rust 101".into();
        course.description = "Ownership and borrowing".into();
        course.category = "programming".into();

        let mut second = Video::draft(VideoId::from_ulid(Ulid::new()), course.id, now());
        second.title = "Borrowing".into();
        second.order = 2;
        second.duration_secs = 600;
        let mut first = Video::draft(VideoId::from_ulid(Ulid::new()), course.id, now());
        first.title = "Ownership".into();
        first.order = 1;
        first.duration_secs = 750;

        CourseView::new(course, instructor, vec![second, first])
    }

    fn ctx() -> SerializeContext {
        SerializeContext::new("http://127.0.0.1:8013")
    }

    #[test]
    fn instructor_uses_the_default_nested_mask() {
        let v = view();
        let out = FieldMask::only(["title", "instructor"]).serialize(&v, &ctx());
        assert_eq!(
            Value::Object(out),
            json!({
                "title": "Rust 101",
                "instructor": {
                    "id": v.instructor.id,
                    "email": "linus@example.com",
                    "name": "Linus",
                },
            })
        );
    }

    #[test]
    fn caller_mask_overrides_the_nested_default() {
        let mask = FieldMask::only(["instructor"])
            .with_nested("instructor", FieldMask::only(["name", "bio"]));
        let out = mask.serialize(&view(), &ctx());
        assert_eq!(out["instructor"], json!({"name": "Linus", "bio": "kernel"}));
    }

    #[test]
    fn videos_render_in_lesson_order_with_their_own_mask() {
        let mask =
            FieldMask::only(["videos"]).with_nested("videos", FieldMask::only(["title", "duration"]));
        let out = mask.serialize(&view(), &ctx());
        assert_eq!(
            out["videos"],
            json!([
                {"title": "Ownership", "duration": "00:12:30"},
                {"title": "Borrowing", "duration": "00:10:00"},
            ])
        );
    }

    #[test]
    fn course_create_requires_title_description_category() {
        let draft = Course::draft(CourseId::from_ulid(Ulid::new()), UserId::from_ulid(Ulid::new()), now());
        let errors = FieldWriter::default()
            .apply(&draft, &serde_json::Map::new(), false)
            .unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["category", "description", "title"]
        );
    }

    #[test]
    fn video_writer_parses_duration_and_order() {
        let draft = Video::draft(VideoId::from_ulid(Ulid::new()), CourseId::from_ulid(Ulid::new()), now());
        let payload = json!({
            "title": "Intro",
            "description": "Welcome",
            "video_url": "https://videos.example.com/intro.mp4",
            "duration": "00:05:00",
            "order": "1",
            "is_preview": "true",
        });
        let video = FieldWriter::default()
            .apply(&draft, payload.as_object().unwrap(), false)
            .unwrap();
        assert_eq!(video.duration_secs, 300);
        assert_eq!(video.order, 1);
        assert!(video.is_preview);
    }
}
