use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde_json::{Map, Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursekit_core::accounts::AccountService;
use coursekit_core::billing::SubscriptionService;
use coursekit_core::courses::CourseService;
use coursekit_core::domain::UserId;
use coursekit_core::impls::{InMemoryPaymentProvider, MemoryMailer};
use coursekit_core::ports::SystemClock;
use coursekit_core::queue::{Broker, InMemoryBroker};
use coursekit_core::serializer::FieldMask;
use coursekit_core::tasks::WorkerGroup;
use coursekit_core::{AppConfig, AppState};

/// Runs the account and course flows against in-memory adapters, with a
/// worker group draining the notification tasks they enqueue.
#[derive(Parser, Debug)]
#[command(name = "coursekit")]
#[command(about = "Course platform backend demo", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/coursekit.yaml")]
    config: PathBuf,

    /// Number of worker loops
    #[arg(long)]
    workers: Option<usize>,

    /// Base URL of the web client used in email links
    #[arg(long)]
    frontend_url: Option<String>,

    /// How long to wait for queued tasks before shutting down
    #[arg(long, default_value_t = 10)]
    settle_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = if args.config.exists() {
        AppConfig::from_file(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?
    } else {
        tracing::warn!(path = %args.config.display(), "config file not found, using defaults");
        AppConfig::default()
    };
    if let Some(workers) = args.workers {
        config.worker.concurrency = workers;
    }
    if let Some(frontend_url) = args.frontend_url {
        config.frontend_url = frontend_url;
    }
    tracing::info!(?config, "starting");

    let broker = InMemoryBroker::new(config.broker_config());
    let mailer = Arc::new(MemoryMailer::new());
    let payments = Arc::new(InMemoryPaymentProvider::new());
    let concurrency = config.worker.concurrency;
    let state = Arc::new(AppState::in_memory(
        config,
        Arc::new(broker.clone()),
        mailer.clone(),
        payments.clone(),
        Arc::new(SystemClock),
    ));

    let runtime = Arc::new(state.worker_runtime()?);
    let workers = WorkerGroup::spawn(concurrency, Arc::new(broker.clone()), runtime);

    let result = tokio::select! {
        result = run_demo(&state, &payments) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            Ok(())
        }
    };

    if !broker
        .wait_until_settled(Duration::from_secs(args.settle_timeout_secs))
        .await
    {
        tracing::warn!("tasks still pending at shutdown");
    }
    workers.shutdown_and_join().await;
    broker.close().await;

    let counts = broker.counts().await;
    println!("queue: {}", serde_json::to_string(&counts)?);
    for mail in mailer.sent() {
        println!("mail to {:?}: {}", mail.to, mail.subject);
    }
    for dead in broker.dead_letters().await {
        println!(
            "dead: {} after {} attempts: {}",
            dead.envelope.task_type,
            dead.attempts,
            dead.last_error.unwrap_or_default()
        );
    }
    result
}

async fn run_demo(state: &Arc<AppState>, payments: &InMemoryPaymentProvider) -> anyhow::Result<()> {
    let accounts = AccountService::new(Arc::clone(state));
    let courses = CourseService::new(Arc::clone(state));

    let instructor = accounts
        .register(&object(json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "password1": "compilers-all-the-way",
            "password2": "compilers-all-the-way",
        }))?)
        .await?;
    println!(
        "registered: {}",
        Value::Object(
            accounts
                .profile(instructor.id, &FieldMask::only(["name", "email"]))
                .await?
        )
    );

    let updated = accounts
        .update_profile(
            instructor.id,
            &object(json!({"bio": "Rear admiral and programmer", "github": "https://github.com/grace"}))?,
            true,
        )
        .await?;
    println!("profile bio: {}", updated["bio"]);

    accounts
        .request_password_reset(&object(json!({"email": "grace@example.com"}))?)
        .await?;

    let course = courses
        .create(
            instructor.id,
            &object(json!({
                "title": "Compilers from scratch",
                "description": "Lexing, parsing and code generation",
                "category": "programming",
            }))?,
        )
        .await?;
    println!("created: {}", Value::Object(course));

    let listed = courses
        .list(&FieldMask::only(["id", "title", "instructor"]))
        .await?;
    println!("catalogue: {}", Value::Array(listed));

    print_detail(&courses, &instructor.id).await?;
    subscribe(state, payments, instructor.id).await
}

/// Pay for the first configured plan through the in-memory provider.
async fn subscribe(
    state: &Arc<AppState>,
    payments: &InMemoryPaymentProvider,
    user: UserId,
) -> anyhow::Result<()> {
    let Some(price_id) = state.config.billing.plans.keys().next().cloned() else {
        tracing::warn!("no billing plans configured");
        return Ok(());
    };
    let billing = SubscriptionService::new(Arc::clone(state));
    let checkout = billing
        .create_checkout(user, &object(json!({ "price_id": price_id }))?)
        .await?;
    println!("checkout: {}", checkout["checkout_url"]);

    let session_id = checkout["session_id"].as_str().unwrap_or_default();
    let period_end =
        chrono::Utc::now() + chrono::Duration::days(i64::from(state.config.billing.period_days));
    if !payments.complete_checkout(session_id, period_end) {
        anyhow::bail!("checkout session {session_id} vanished");
    }
    let subscription = billing.complete_checkout(user, session_id).await?;
    println!("subscription: {}", Value::Object(subscription));
    Ok(())
}

async fn print_detail(courses: &CourseService, viewer: &UserId) -> anyhow::Result<()> {
    let listed = courses.list(&FieldMask::only(["id"])).await?;
    for entry in listed {
        let id = serde_json::from_value(entry["id"].clone())?;
        let detail = courses.detail(id, Some(*viewer)).await?;
        println!("detail: {}", Value::Object(detail));
    }
    Ok(())
}

fn object(value: Value) -> anyhow::Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, got {other}"),
    }
}
