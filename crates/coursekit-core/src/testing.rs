//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::app::AppState;
use crate::config::AppConfig;
use crate::domain::User;
use crate::impls::{InMemoryPaymentProvider, MemoryMailer};
use crate::ports::FixedClock;
use crate::queue::{BrokerConfig, InMemoryBroker};

pub struct TestApp {
    pub state: Arc<AppState>,
    pub broker: InMemoryBroker,
    pub mailer: Arc<MemoryMailer>,
    pub payments: Arc<InMemoryPaymentProvider>,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Self::config())
    }

    pub fn config() -> AppConfig {
        AppConfig {
            admin_email: Some("admin@coursekit.test".to_string()),
            password_hash_cost: 4,
            ..AppConfig::default()
        }
    }

    pub fn with_config(config: AppConfig) -> Self {
        let broker = InMemoryBroker::new(BrokerConfig::default());
        let mailer = Arc::new(MemoryMailer::new());
        let payments = Arc::new(InMemoryPaymentProvider::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        let state = AppState::in_memory(
            config,
            Arc::new(broker.clone()),
            mailer.clone(),
            payments.clone(),
            clock.clone(),
        );
        Self {
            state: Arc::new(state),
            broker,
            mailer,
            payments,
            clock,
        }
    }

    /// Store a verified user directly (no registration flow, no tasks).
    pub async fn seed_user(&self, email: &str, name: &str) -> User {
        let mut user = User::new(self.state.ids.generate(), self.clock_now());
        user.email = email.to_string();
        user.name = name.to_string();
        user.is_verified = true;
        self.state.users.save(user.clone()).await.unwrap();
        user
    }

    pub fn clock_now(&self) -> chrono::DateTime<Utc> {
        use crate::ports::Clock;
        self.clock.now()
    }
}
