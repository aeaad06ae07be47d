//! Prometheus counters and gauges for the snapshot lifecycle.
//!
//! `lastSnapshotHash` is a string identity rather than a number, so it is
//! tracked separately from the registry (see [`NodeMetrics::last_snapshot_hash`])
//! instead of being forced into a label on every scrape.

use std::sync::{Arc, Mutex};

use prometheus::{Counter, Gauge, Registry};

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    snapshot_count: Counter,
    last_snapshot_height: Gauge,
    next_snapshot_height: Gauge,
    accepted: Gauge,
    awaiting: Gauge,
    waiting_for_acceptance: Gauge,
    snapshot_write_to_disk_success: Counter,
    snapshot_write_to_disk_failure: Counter,
    snapshot_height_interval_condition_met: Counter,
    snapshot_height_interval_condition_not_met: Counter,
    snapshot_no_blocks_within_height_interval: Counter,
    snapshot_invalid_data: Counter,
    snapshot_cb_accept_query_failed: Counter,
    min_tip_height: Gauge,
    min_waiting_height: Gauge,
    last_snapshot_hash: Arc<Mutex<String>>,
}

impl NodeMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let snapshot_count = Counter::new("snapshot_count", "Total snapshots committed")?;
        let last_snapshot_height = Gauge::new("last_snapshot_height", "Height of the current snapshot")?;
        let next_snapshot_height = Gauge::new("next_snapshot_height", "Height of the next snapshot hash")?;
        let accepted = Gauge::new("accepted", "Accepted checkpoint blocks awaiting a snapshot")?;
        let awaiting = Gauge::new("awaiting", "Checkpoint blocks awaiting validation")?;
        let waiting_for_acceptance =
            Gauge::new("waiting_for_acceptance", "Validated checkpoint blocks waiting on dependencies")?;
        let snapshot_write_to_disk_success =
            Counter::new("snapshot_write_to_disk_success", "Successful snapshot disk writes")?;
        let snapshot_write_to_disk_failure =
            Counter::new("snapshot_write_to_disk_failure", "Failed snapshot disk writes")?;
        let snapshot_height_interval_condition_met = Counter::new(
            "snapshot_height_interval_condition_met",
            "attemptSnapshot calls that passed the interval condition",
        )?;
        let snapshot_height_interval_condition_not_met = Counter::new(
            "snapshot_height_interval_condition_not_met",
            "attemptSnapshot calls that failed the interval condition",
        )?;
        let snapshot_no_blocks_within_height_interval = Counter::new(
            "snapshot_no_blocks_within_height_interval",
            "attemptSnapshot calls with no block in the target height interval",
        )?;
        let snapshot_invalid_data =
            Counter::new("snapshot_invalid_data", "Snapshot writes aborted on a missing checkpoint block")?;
        let snapshot_cb_accept_query_failed = Counter::new(
            "snapshot_cb_accept_query_failed",
            "Failed queries against the accepted checkpoint set",
        )?;
        let min_tip_height = Gauge::new("min_tip_height", "Lowest height among current tips")?;
        let min_waiting_height = Gauge::new("min_waiting_height", "Lowest height among blocks waiting for acceptance")?;

        for collector in [
            Box::new(snapshot_count.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(last_snapshot_height.clone()),
            Box::new(next_snapshot_height.clone()),
            Box::new(accepted.clone()),
            Box::new(awaiting.clone()),
            Box::new(waiting_for_acceptance.clone()),
            Box::new(snapshot_write_to_disk_success.clone()),
            Box::new(snapshot_write_to_disk_failure.clone()),
            Box::new(snapshot_height_interval_condition_met.clone()),
            Box::new(snapshot_height_interval_condition_not_met.clone()),
            Box::new(snapshot_no_blocks_within_height_interval.clone()),
            Box::new(snapshot_invalid_data.clone()),
            Box::new(snapshot_cb_accept_query_failed.clone()),
            Box::new(min_tip_height.clone()),
            Box::new(min_waiting_height.clone()),
        ] {
            registry.register(collector)?;
        }

        Ok(Self {
            registry,
            snapshot_count,
            last_snapshot_height,
            next_snapshot_height,
            accepted,
            awaiting,
            waiting_for_acceptance,
            snapshot_write_to_disk_success,
            snapshot_write_to_disk_failure,
            snapshot_height_interval_condition_met,
            snapshot_height_interval_condition_not_met,
            snapshot_no_blocks_within_height_interval,
            snapshot_invalid_data,
            snapshot_cb_accept_query_failed,
            min_tip_height,
            min_waiting_height,
            last_snapshot_hash: Arc::new(Mutex::new(String::new())),
        })
    }

    pub fn record_snapshot_committed(&self, height: i32, hash: &str) {
        self.snapshot_count.inc();
        self.last_snapshot_height.set(height as f64);
        *self.last_snapshot_hash.lock().unwrap() = hash.to_string();
    }

    pub fn set_next_snapshot_height(&self, height: i64) {
        self.next_snapshot_height.set(height as f64);
    }

    pub fn set_checkpoint_state_sizes(&self, accepted: usize, awaiting: usize, waiting_for_acceptance: usize) {
        self.accepted.set(accepted as f64);
        self.awaiting.set(awaiting as f64);
        self.waiting_for_acceptance.set(waiting_for_acceptance as f64);
    }

    pub fn set_tip_heights(&self, min_tip_height: i64, min_waiting_height: Option<i64>) {
        self.min_tip_height.set(min_tip_height as f64);
        self.min_waiting_height.set(min_waiting_height.unwrap_or(0) as f64);
    }

    pub fn record_write_to_disk_success(&self) {
        self.snapshot_write_to_disk_success.inc();
    }

    pub fn record_write_to_disk_failure(&self) {
        self.snapshot_write_to_disk_failure.inc();
    }

    pub fn record_height_interval_condition_met(&self) {
        self.snapshot_height_interval_condition_met.inc();
    }

    pub fn record_height_interval_condition_not_met(&self) {
        self.snapshot_height_interval_condition_not_met.inc();
    }

    pub fn record_no_blocks_within_height_interval(&self) {
        self.snapshot_no_blocks_within_height_interval.inc();
    }

    pub fn record_invalid_data(&self) {
        self.snapshot_invalid_data.inc();
    }

    pub fn record_cb_accept_query_failed(&self) {
        self.snapshot_cb_accept_query_failed.inc();
    }

    pub fn last_snapshot_hash(&self) -> String {
        self.last_snapshot_hash.lock().unwrap().clone()
    }

    /// Renders the registry in Prometheus text exposition format, for the
    /// (out-of-scope) metrics HTTP sink to serve verbatim.
    pub fn metrics_text(&self) -> Result<String, MetricsError> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf).map_err(MetricsError::Prometheus)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
