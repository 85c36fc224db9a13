//! Paid plan subscription (one per user).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ids::UserId;
use crate::ports::Record;
use crate::serializer::shape::{Projection, Shape, iso8601, iso8601_opt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Plan::Free),
            "pro" => Some(Plan::Pro),
            "enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Inactive,
    Active,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Active => "active",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub user: UserId,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    /// Subscription id at the payment provider.
    pub provider_subscription_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn inactive(user: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user,
            plan: Plan::Free,
            status: SubscriptionStatus::Inactive,
            provider_subscription_id: None,
            current_period_end: None,
            created_at: now,
        }
    }

    pub fn activate(&mut self, plan: Plan, provider_id: String, period_end: DateTime<Utc>) {
        self.plan = plan;
        self.status = SubscriptionStatus::Active;
        self.provider_subscription_id = Some(provider_id);
        self.current_period_end = Some(period_end);
    }
}

impl Record for Subscription {
    type Key = UserId;
    const KIND: &'static str = "subscription";

    fn key(&self) -> UserId {
        self.user
    }
}

impl Shape for Subscription {
    const FIELDS: &'static [&'static str] = &[
        "subscription_id",
        "plan",
        "status",
        "current_period_end",
        "created_at",
    ];

    fn field(&self, name: &str, _p: &Projection<'_>) -> Value {
        match name {
            "subscription_id" => json!(self.provider_subscription_id),
            "plan" => json!(self.plan.as_str()),
            "status" => json!(self.status.as_str()),
            "current_period_end" => iso8601_opt(self.current_period_end.as_ref()),
            "created_at" => iso8601(&self.created_at),
            _ => Value::Null,
        }
    }
}
