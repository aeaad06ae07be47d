use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use checkpoint_store::CheckpointStore;
use ledger_services::{AddressService, ObservationService, TransactionService};
use node_config::NodeConfig;
use node_metrics::NodeMetrics;
use snapshot_service::{Pools, SnapshotService, SnapshotServiceConfig};
use snapshot_store::{RedownloadStorage, SnapshotStorage};
use storage::LocalFileStorage;
use trust_manager::TrustManager;

/// Runs the snapshot lifecycle on a fixed timer against a local node's
/// storages. The peer RPC, gossip transport and HTTP metrics surface that
/// would normally feed checkpoint blocks and drive a real majority-height
/// view are out of scope here; this binary only demonstrates the timer
/// contract that an external caller is expected to provide.
#[derive(Parser, Debug)]
#[command(name = "snapshot-noded")]
#[command(about = "Snapshot lifecycle node daemon")]
struct Cli {
    /// Path to a TOML file layered above built-in defaults and below
    /// environment variables.
    #[arg(long)]
    config: Option<String>,

    /// Seconds between attempt_snapshot calls.
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = NodeConfig::load(cli.config.as_deref())?;

    let filter = tracing_subscriber::EnvFilter::try_new(&config.node.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let data_dir = Path::new(&config.node.data_dir);
    let snapshot_blob_storage = LocalFileStorage::new(data_dir.join("snapshots"))?;
    let snapshot_info_storage = LocalFileStorage::new(data_dir.join("snapshot-info"))?;
    let metrics = Arc::new(NodeMetrics::new()?);

    let service = SnapshotService::new(
        CheckpointStore::new(),
        SnapshotStorage::new(),
        RedownloadStorage::new(0),
        TrustManager::new(),
        AddressService::new(),
        TransactionService::new(),
        ObservationService::new(),
        snapshot_blob_storage,
        snapshot_info_storage,
        metrics.clone(),
        Pools::default(),
        SnapshotServiceConfig {
            snapshot_height_interval: config.snapshot.snapshot_height_interval,
            snapshot_height_delay_interval: config.snapshot.snapshot_height_delay_interval,
            distance_from_majority: config.snapshot.distance_from_majority,
            snapshot_size_disk_limit: config.snapshot.snapshot_size_disk_limit,
            max_accepted_cb_hashes_in_memory: config.snapshot.max_accepted_cb_hashes_in_memory,
            max_accepted_cb_hashes_check_enabled: false,
        },
    );

    tracing::info!(
        data_dir = %config.node.data_dir,
        metrics_addr = %config.node.metrics_addr,
        interval_secs = cli.interval_secs,
        "snapshot-noded starting"
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(cli.interval_secs));
    loop {
        ticker.tick().await;
        match service.attempt_snapshot().await {
            Ok(created) => {
                tracing::info!(
                    height = created.height,
                    hash = %created.hash,
                    blocks = created.checkpoint_blocks.len(),
                    "snapshot committed"
                );
            }
            Err(err) if err.is_benign() => {
                tracing::debug!(error = %err, "snapshot attempt skipped");
            }
            Err(err) => {
                tracing::warn!(error = %err, "snapshot attempt failed");
            }
        }
    }
}
