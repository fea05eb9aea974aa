use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use huntrelay_core::config::HuntrelayConfig;
use huntrelay_notify::{ChannelPoster, NoMapping, Poller, WebhookPoster};
use huntrelay_scheduler::{ScheduledTask, TaskSet};
use huntrelay_store::{KvStore, SqliteKv, SubscriptionStore, WatermarkStore};
use huntrelay_tracker::{HackerOneClient, TrackerApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huntrelay=info".into()),
        )
        .init();

    // load config: HUNTRELAY_CONFIG env > ~/.huntrelay/huntrelay.toml
    let config_path = std::env::var("HUNTRELAY_CONFIG").ok();
    let config = HuntrelayConfig::load(config_path.as_deref())?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");
    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let kv: Arc<dyn KvStore> = Arc::new(SqliteKv::new(conn)?);
    let watermark = WatermarkStore::new(Arc::clone(&kv));
    let subscriptions = SubscriptionStore::new(kv);

    let tracker: Arc<dyn TrackerApi> = Arc::new(HackerOneClient::new(&config.tracker));
    let poster: Arc<dyn ChannelPoster> =
        Arc::new(WebhookPoster::new(config.delivery.webhook_url.clone()));

    let poller = Arc::new(Poller::new(
        tracker,
        poster,
        watermark,
        subscriptions,
        Arc::new(NoMapping),
        config.sla.clone(),
    ));

    let mut tasks = TaskSet::new();

    let activity_poller = Arc::clone(&poller);
    let activity_task = ScheduledTask::spawn(
        "activity-poll",
        Duration::from_secs(config.poll.activity_interval_secs),
        true,
        move || {
            let poller = Arc::clone(&activity_poller);
            async move {
                if let Err(e) = poller.poll_activities().await {
                    tracing::error!(error = %e, "activity poll cycle failed");
                }
            }
        },
    );
    info!(task = %activity_task, "poll task scheduled");
    tasks.add(activity_task);

    let deadline_poller = Arc::clone(&poller);
    let deadline_task = ScheduledTask::spawn(
        "deadline-poll",
        Duration::from_secs(config.poll.deadline_interval_secs),
        true,
        move || {
            let poller = Arc::clone(&deadline_poller);
            async move {
                if let Err(e) = poller.poll_deadlines().await {
                    tracing::error!(error = %e, "deadline poll cycle failed");
                }
            }
        },
    );
    info!(task = %deadline_task, "poll task scheduled");
    tasks.add(deadline_task);

    info!(program = %config.tracker.program, "huntrelay started");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining poll tasks");
    tasks.cancel_all().await;
    info!("huntrelay stopped");
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
