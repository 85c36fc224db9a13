//! Domain model (IDs, entities).

pub mod course;
pub mod ids;
pub mod progress;
pub mod subscription;
pub mod user;

pub use course::{Course, CourseView, Video};
pub use ids::{CourseId, Id, IdMarker, ParseIdError, TaskId, UserId, VideoId};
pub use progress::{CourseProgress, ProgressKey};
pub use subscription::{Plan, Subscription, SubscriptionStatus};
pub use user::{Role, User};
