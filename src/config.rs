use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub replication: ReplicationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_http_addr() -> String {
    "127.0.0.1:9400".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            log_level: default_log_level(),
        }
    }
}

/// Defaults for the simulated discovery scope used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_fleet_size")]
    pub fleet_size: usize,
    #[serde(default = "default_subnets")]
    pub subnet_ranges: Vec<String>,
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_fleet_size() -> usize {
    10
}

fn default_subnets() -> Vec<String> {
    vec!["10.0.0.0/24".to_string()]
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            fleet_size: default_fleet_size(),
            subnet_ranges: default_subnets(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationConfig {
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
}

fn default_batch_limit() -> usize {
    3
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            batch_limit: default_batch_limit(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("caravan").join("config.toml"))
    }
}

pub fn load() -> Result<Config> {
    let path = Config::path()?;
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.daemon.http_addr, "127.0.0.1:9400");
        assert_eq!(config.discovery.fleet_size, 10);
        assert_eq!(config.replication.batch_limit, 3);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[discovery]\nfleet_size = 25\nenvironment = \"staging\"\n")
            .unwrap();
        let config = load_from(&path).unwrap();
        assert_eq!(config.discovery.fleet_size, 25);
        assert_eq!(config.discovery.environment, "staging");
        assert_eq!(config.daemon.log_level, "info");
    }
}
