use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use trade_index::{ChannelQueue, Config, Coordinator, FsObjectStore, NotificationQueueClient, Store};

/// Demo CLI for trade-index: backfills a local directory tree of JSON
/// objects into the store, then optionally watches it for new arrivals.
///
/// This talks to [`FsObjectStore`]/[`ChannelQueue`], the reference
/// adapters — not a real S3/SQS deployment. Wiring a cloud-backed
/// `ObjectStoreClient`/`NotificationQueueClient` is left to the operator.
#[derive(Parser)]
#[command(name = "trade-index", about = "Bucketed time-series index for object-store-ingested trade events")]
struct Cli {
    /// Local directory standing in for the object-store bucket.
    #[arg(long, default_value = "./data")]
    root: String,

    /// Prefix under `root` to ingest from.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Run one backfill pass and exit, instead of watching for new objects.
    #[arg(long)]
    once: bool,

    /// How long to watch before exiting, when not `--once`.
    #[arg(long, default_value_t = 30)]
    watch_seconds: u64,

    /// Write debug logs to /tmp/trade-index-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/trade-index-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("trade-index debug log started — tail -f /tmp/trade-index-debug.log");
    }

    let config = Config::load().unwrap_or_default();
    let store = Store::new();
    let object_store = Arc::new(FsObjectStore::new(&cli.root));

    let queue: Option<Arc<dyn NotificationQueueClient>> = if config.source.queue_url.is_some() {
        Some(Arc::new(ChannelQueue::new()))
    } else {
        None
    };

    let coordinator = Coordinator::new(
        store.clone(),
        object_store,
        queue,
        cli.prefix.clone(),
        Duration::from_millis(config.ingest.polling_interval_ms),
    );

    let backfill = coordinator.backfill().await;
    tracing::info!(
        files_processed = backfill.files_processed,
        entries_loaded = backfill.entries_loaded,
        errors = backfill.errors.len(),
        "initial backfill complete"
    );
    for error in &backfill.errors {
        tracing::warn!(key = %error.key, message = %error.message, "backfill object failed");
    }

    if cli.once {
        print_stats(&store);
        return Ok(());
    }

    coordinator.start_watching().await;
    let deadline = tokio::time::sleep(Duration::from_secs(cli.watch_seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(5)) => {
                print_stats(&store);
                for event in store.diagnostics().drain() {
                    tracing::warn!(source = ?event.source, message = %event.message, "diagnostic event");
                }
            }
            _ = &mut deadline => break,
        }
    }

    coordinator.stop_watching().await;
    print_stats(&store);
    Ok(())
}

fn print_stats(store: &Store) {
    let stats = store.stats();
    println!(
        "entries={} buckets={} earliest={:?} latest={:?} estimated_bytes={}",
        stats.total_entries, stats.bucket_count, stats.earliest, stats.latest, stats.estimated_bytes
    );
}
