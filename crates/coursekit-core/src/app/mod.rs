//! App - アプリケーション層のワイヤリング
//!
//! `AppState` は ports の実装と設定をまとめたもので、API 側のサービスと
//! ワーカー側の Handler の両方が `Arc<AppState>` を共有します。

use std::sync::Arc;

use crate::accounts::tasks::{ACCOUNT_TASK_TYPES, register_account_tasks};
use crate::billing::tasks::{BILLING_TASK_TYPES, register_billing_tasks};
use crate::config::AppConfig;
use crate::domain::{Course, CourseProgress, Subscription, User, Video};
use crate::impls::{InMemoryRepository, InMemoryTokenIssuer};
use crate::ports::{
    Clock, IdGenerator, Mailer, PaymentProvider, Repository, TokenIssuer, UlidGenerator,
};
use crate::queue::Broker;
use crate::serializer::SerializeContext;
use crate::tasks::{BuildError, Dispatcher, Runtime, RuntimeBuilder};

pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn Repository<User>>,
    pub courses: Arc<dyn Repository<Course>>,
    pub videos: Arc<dyn Repository<Video>>,
    pub progress: Arc<dyn Repository<CourseProgress>>,
    pub subscriptions: Arc<dyn Repository<Subscription>>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub mailer: Arc<dyn Mailer>,
    pub payments: Arc<dyn PaymentProvider>,
    pub dispatcher: Dispatcher,
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
    pub media: SerializeContext,
}

impl AppState {
    /// In-memory stores and token issuer around the given external services and clock.
    pub fn in_memory(
        config: AppConfig,
        broker: Arc<dyn Broker>,
        mailer: Arc<dyn Mailer>,
        payments: Arc<dyn PaymentProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(Arc::clone(&clock)));
        let dispatcher = Dispatcher::new(broker, Arc::clone(&ids), Arc::clone(&clock))
            .with_failure_policy(config.enqueue_failure);
        let media = SerializeContext::new(config.website_url.clone());

        Self {
            config,
            users: Arc::new(InMemoryRepository::<User>::new()),
            courses: Arc::new(InMemoryRepository::<Course>::new()),
            videos: Arc::new(InMemoryRepository::<Video>::new()),
            progress: Arc::new(InMemoryRepository::<CourseProgress>::new()),
            subscriptions: Arc::new(InMemoryRepository::<Subscription>::new()),
            tokens: Arc::new(InMemoryTokenIssuer::new()),
            mailer,
            payments,
            dispatcher,
            ids,
            clock,
            media,
        }
    }

    /// Worker runtime with every task this application enqueues.
    pub fn worker_runtime(self: &Arc<Self>) -> Result<Runtime, BuildError> {
        RuntimeBuilder::new()
            .with(|registry| register_account_tasks(registry, self))?
            .with(|registry| register_billing_tasks(registry, self))?
            .expect_tasks(ACCOUNT_TASK_TYPES)
            .expect_tasks(BILLING_TASK_TYPES)
            .build()
    }
}
