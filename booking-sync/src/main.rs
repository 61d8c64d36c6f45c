use std::time::Duration;

use anyhow::Result;
use booking_sync::{HttpBookingFetcher, KafkaChangeFeed, SessionContext, Synchronizer};
use clap::Parser;
use shared::PartyRole;
use tokio::time;
use tracing::info;
use uuid::Uuid;

/// Follows one party's bookings live and prints changes as they land.
#[derive(Parser)]
#[command(name = "booking-sync")]
struct Args {
    #[arg(long, env = "API_URL", default_value = "http://localhost:3001")]
    api_url: String,

    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092")]
    kafka_brokers: String,

    #[arg(long, default_value = shared::CHANGE_TOPIC)]
    change_topic: String,

    #[arg(long, env = "SESSION_TOKEN")]
    session_token: String,

    #[arg(long, env = "PARTY_ID")]
    party_id: Uuid,

    #[arg(long, default_value = "customer")]
    role: PartyRole,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let session = SessionContext::new(args.party_id, args.role);
    let fetcher = HttpBookingFetcher::new(&args.api_url, &args.session_token);
    let feed = KafkaChangeFeed::new(&args.kafka_brokers, &args.change_topic);

    // Subscribe before loading so nothing committed in between is missed.
    let handle = Synchronizer::new(session, Vec::new(), fetcher.clone()).spawn(&feed)?;
    let snapshot = fetcher.list(args.role).await?;
    info!("Loaded {} bookings for {} {}", snapshot.len(), args.role, args.party_id);
    handle.seed(snapshot).await;

    let mut ticker = time::interval(Duration::from_secs(1));
    let mut last_toast = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let toast = handle.current_toast().await;
                if toast != last_toast {
                    if let Some(toast) = &toast {
                        let today = chrono::Local::now().date_naive();
                        println!(
                            "[{}] {} ({} upcoming, {} past)",
                            toast.title,
                            toast.message,
                            handle.upcoming(today).await.len(),
                            handle.past(today).await.len(),
                        );
                    }
                    last_toast = toast;
                }
                if !handle.is_running() {
                    break;
                }
            }
        }
    }

    handle.close().await?;
    info!("Watcher stopped");
    Ok(())
}
