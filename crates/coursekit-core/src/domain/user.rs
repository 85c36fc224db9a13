//! User account entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ids::UserId;
use super::subscription::Plan;
use crate::ports::Record;
use crate::serializer::shape::{Projection, Shape, iso8601, iso8601_opt};
use crate::serializer::validation::{self, FieldResult};
use crate::serializer::Writable;

/// Account role. Serialized lower-case (`"admin"`, `"subscribed"`, `"user"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Subscribed,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Subscribed => "subscribed",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    /// Stored file reference (`uploads/avatars/...`), not a URL.
    pub avatar: Option<String>,
    pub password_hash: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub is_staff: bool,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone_number: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub subscription_plan: Option<String>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub is_subscription_active: bool,
    pub is_deleted: bool,
}

impl User {
    /// Fields a user may change on their own profile.
    pub const PROFILE_FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "avatar",
        "bio",
        "location",
        "phone_number",
        "linkedin",
        "github",
    ];

    /// A fresh, active but unverified account with the `user` role.
    pub fn new(id: UserId, joined_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email: String::new(),
            name: String::new(),
            avatar: None,
            password_hash: String::new(),
            is_verified: false,
            is_active: true,
            is_staff: false,
            role: Role::User,
            date_joined: joined_at,
            last_login: None,
            stripe_customer_id: None,
            bio: None,
            location: None,
            phone_number: None,
            linkedin: None,
            github: None,
            subscription_plan: None,
            subscription_start_date: None,
            subscription_end_date: None,
            is_subscription_active: false,
            is_deleted: false,
        }
    }

    /// Staff account with the `admin` role; verified from the start.
    pub fn promote_to_admin(&mut self) {
        self.role = Role::Admin;
        self.is_staff = true;
        self.is_verified = true;
    }

    /// Paid plan is live until `end`. Admins keep their role.
    pub fn activate_subscription(&mut self, plan: Plan, start: DateTime<Utc>, end: DateTime<Utc>) {
        if self.role != Role::Admin {
            self.role = Role::Subscribed;
        }
        self.subscription_plan = Some(plan.as_str().to_string());
        self.subscription_start_date = Some(start);
        self.subscription_end_date = Some(end);
        self.is_subscription_active = true;
    }

    /// Attributes the password policy compares new passwords against.
    pub fn similarity_attributes(&self) -> [(&'static str, &str); 2] {
        [("email", self.email.as_str()), ("name", self.name.as_str())]
    }
}

impl Record for User {
    type Key = UserId;
    const KIND: &'static str = "user";

    fn key(&self) -> UserId {
        self.id
    }
}

impl Shape for User {
    // password_hash and stripe_customer_id are never declared, so never rendered.
    const FIELDS: &'static [&'static str] = &[
        "id",
        "email",
        "name",
        "avatar",
        "avatar_url",
        "is_verified",
        "is_active",
        "role",
        "date_joined",
        "last_login",
        "bio",
        "location",
        "phone_number",
        "linkedin",
        "github",
        "subscription_plan",
        "subscription_start_date",
        "subscription_end_date",
        "is_subscription_active",
    ];

    fn field(&self, name: &str, p: &Projection<'_>) -> Value {
        match name {
            "id" => json!(self.id),
            "email" => json!(self.email),
            "name" => json!(self.name),
            "avatar" => json!(self.avatar),
            "avatar_url" => p.file_url(self.avatar.as_deref()),
            "is_verified" => json!(self.is_verified),
            "is_active" => json!(self.is_active),
            "role" => json!(self.role.as_str()),
            "date_joined" => iso8601(&self.date_joined),
            "last_login" => iso8601_opt(self.last_login.as_ref()),
            "bio" => json!(self.bio),
            "location" => json!(self.location),
            "phone_number" => json!(self.phone_number),
            "linkedin" => json!(self.linkedin),
            "github" => json!(self.github),
            "subscription_plan" => json!(self.subscription_plan),
            "subscription_start_date" => iso8601_opt(self.subscription_start_date.as_ref()),
            "subscription_end_date" => iso8601_opt(self.subscription_end_date.as_ref()),
            "is_subscription_active" => json!(self.is_subscription_active),
            _ => Value::Null,
        }
    }
}

impl Writable for User {
    const WRITABLE: &'static [&'static str] = User::PROFILE_FIELDS;
    const REQUIRED: &'static [&'static str] = &["name", "email"];

    fn write_field(&mut self, name: &str, value: &Value) -> FieldResult<()> {
        match name {
            "name" => self.name = validation::required_string(value, 255)?,
            "email" => self.email = validation::email(value)?,
            "avatar" => self.avatar = validation::optional_string(value, 100)?,
            "bio" => self.bio = validation::optional_text(value)?,
            "location" => self.location = validation::optional_string(value, 255)?,
            "phone_number" => self.phone_number = validation::optional_string(value, 20)?,
            "linkedin" => self.linkedin = validation::optional_url(value, 200)?,
            "github" => self.github = validation::optional_url(value, 200)?,
            _ => {}
        }
        Ok(())
    }
}
