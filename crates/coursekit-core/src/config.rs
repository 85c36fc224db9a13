//! Application configuration (YAML file, overridden by CLI flags).

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Plan;
use crate::queue::{BrokerConfig, RetryPolicy};
use crate::tasks::EnqueueFailurePolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Public base URL of this backend; media URLs are built from it.
    pub website_url: String,
    /// Base URL of the web client; email links point there.
    pub frontend_url: String,
    /// Sender address for outbound mail (`None`: transport default).
    pub admin_email: Option<String>,
    pub password_hash_cost: u32,
    pub enqueue_failure: EnqueueFailurePolicy,
    pub worker: WorkerSettings,
    pub billing: BillingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            website_url: "http://127.0.0.1:8013".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            admin_email: None,
            password_hash_cost: bcrypt::DEFAULT_COST,
            enqueue_failure: EnqueueFailurePolicy::default(),
            worker: WorkerSettings::default(),
            billing: BillingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub concurrency: usize,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_multiplier: f64,
    /// Also the task time limit: a lease older than this is handed out again.
    pub visibility_timeout_ms: u64,
    pub dead_letter_limit: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_attempts: 5,
            retry_base_delay_ms: 2_000,
            retry_multiplier: 2.0,
            visibility_timeout_ms: 360_000,
            dead_letter_limit: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    /// Provider price id → plan it unlocks. Unknown price ids are rejected.
    pub plans: BTreeMap<String, Plan>,
    /// Subscription length when the provider reports no period end.
    pub period_days: u32,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            plans: BTreeMap::from([
                ("price_pro_monthly".to_string(), Plan::Pro),
                ("price_enterprise_monthly".to_string(), Plan::Enterprise),
            ]),
            period_days: 30,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn broker_config(&self) -> BrokerConfig {
        let w = &self.worker;
        BrokerConfig {
            max_attempts: w.max_attempts.max(1),
            retry: RetryPolicy::new(
                Duration::from_millis(w.retry_base_delay_ms),
                w.retry_multiplier,
            ),
            visibility_timeout: Duration::from_millis(w.visibility_timeout_ms),
            dead_letter_limit: w.dead_letter_limit,
        }
    }

    /// `frontend_url` without surrounding whitespace or a trailing slash.
    pub fn frontend_base(&self) -> &str {
        self.frontend_url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.worker.concurrency, 4);
        assert_eq!(config.enqueue_failure, EnqueueFailurePolicy::Fail);
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let yaml = r#"
frontend_url: "https://learn.example.com/"
admin_email: admin@example.com
enqueue_failure: log_and_continue
worker:
  concurrency: 8
  retry_base_delay_ms: 100
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.frontend_base(), "https://learn.example.com");
        assert_eq!(config.admin_email.as_deref(), Some("admin@example.com"));
        assert_eq!(config.enqueue_failure, EnqueueFailurePolicy::LogAndContinue);
        assert_eq!(config.worker.concurrency, 8);
        assert_eq!(config.worker.max_attempts, 5);

        let broker = config.broker_config();
        assert_eq!(broker.retry.base_delay, Duration::from_millis(100));
        assert_eq!(broker.visibility_timeout, Duration::from_secs(360));
        assert_eq!(config.billing, BillingSettings::default());
    }

    #[test]
    fn billing_plans_replace_the_default_price_table() {
        let yaml = r#"
billing:
  plans:
    price_live_pro: pro
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.billing.plans.len(), 1);
        assert_eq!(config.billing.plans["price_live_pro"], Plan::Pro);
        assert_eq!(config.billing.period_days, 30);
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = AppConfig::from_yaml_str("enqueue_failure: shrug").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = AppConfig::from_file("/nonexistent/coursekit.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/coursekit.yaml"));
    }
}
