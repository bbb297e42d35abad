use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trellis_engine::PublicationStateMachine;
use trellis_worker::{PublicationScheduler, SchedulerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trellis_worker=debug,trellis_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SchedulerConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = trellis_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    trellis_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let scheduler = PublicationScheduler::new(PublicationStateMachine::new(pool), config);
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let handle = tokio::spawn(async move {
        scheduler.run(cancel_clone).await;
    });

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Received Ctrl-C, stopping scheduler");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
    tracing::info!("Worker stopped");
}
