//! `NodeConfig` loading: built-in defaults, an optional `config/default.toml`,
//! an optional `--config <path>` override, and `SNAPSHOT_NODE__*` environment
//! variables, in increasing precedence.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSection {
    pub snapshot_height_interval: i64,
    pub snapshot_height_delay_interval: i64,
    pub distance_from_majority: i64,
    /// Bytes; `0` disables the on-disk capacity cap.
    pub snapshot_size_disk_limit: u64,
    pub max_accepted_cb_hashes_in_memory: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSection {
    pub data_dir: String,
    pub log_level: String,
    pub metrics_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub snapshot: SnapshotSection,
    pub node: NodeSection,
}

impl NodeConfig {
    /// `override_path`, when given, is an additional TOML file layered above
    /// `config/default.toml` and below environment variables: the
    /// `--config <path>` CLI flag's effect.
    pub fn load(override_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("snapshot.snapshot_height_interval", 2)?
            .set_default("snapshot.snapshot_height_delay_interval", 4)?
            .set_default("snapshot.distance_from_majority", 30)?
            .set_default("snapshot.snapshot_size_disk_limit", 0)?
            .set_default("snapshot.max_accepted_cb_hashes_in_memory", 100_000)?
            .set_default("node.data_dir", "./data")?
            .set_default("node.log_level", "info")?
            .set_default("node.metrics_addr", "127.0.0.1:9898")?
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(path) = override_path {
            builder = builder.add_source(config::File::from(std::path::PathBuf::from(path)).required(true));
        }

        let config = builder
            .add_source(config::Environment::with_prefix("SNAPSHOT_NODE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_built_in_defaults_with_no_files() {
        let config = NodeConfig::load(None).unwrap();
        assert_eq!(config.snapshot.snapshot_height_interval, 2);
        assert_eq!(config.node.data_dir, "./data");
    }

    #[test]
    fn override_file_takes_precedence_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[snapshot]").unwrap();
        writeln!(file, "snapshot_height_interval = 7").unwrap();
        writeln!(file, "snapshot_height_delay_interval = 4").unwrap();
        writeln!(file, "distance_from_majority = 30").unwrap();
        writeln!(file, "snapshot_size_disk_limit = 0").unwrap();
        writeln!(file, "max_accepted_cb_hashes_in_memory = 100000").unwrap();
        writeln!(file, "[node]").unwrap();
        writeln!(file, "data_dir = \"./data\"").unwrap();
        writeln!(file, "log_level = \"info\"").unwrap();
        writeln!(file, "metrics_addr = \"127.0.0.1:9898\"").unwrap();

        let config = NodeConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.snapshot.snapshot_height_interval, 7);
    }
}
