//! Discovery — pluggable source of migration inventories.
//!
//! Real discovery would query an agent-based inventory service; the
//! `SimulatedDiscovery` source stands in for it with a deterministic fleet
//! derived purely from the server index, so every call with the same scope
//! yields the same inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::info;

use super::error::{FactoryError, Result};
use super::inventory::{Complexity, Inventory, OsClass, PortfolioSummary, Server};

/// What to discover: address ranges and the environment the fleet serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryScope {
    #[serde(default = "default_subnets")]
    pub subnet_ranges: Vec<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Number of servers the scope resolves to.
    #[serde(default = "default_fleet_size")]
    pub fleet_size: usize,
}

fn default_subnets() -> Vec<String> {
    vec!["10.0.0.0/24".to_string()]
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_fleet_size() -> usize {
    10
}

impl Default for DiscoveryScope {
    fn default() -> Self {
        Self {
            subnet_ranges: default_subnets(),
            environment: default_environment(),
            fleet_size: default_fleet_size(),
        }
    }
}

/// Result of one discovery pass: the inventory plus presentation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub discovery_id: String,
    pub inventory: Inventory,
    pub portfolio_summary: PortfolioSummary,
    pub completed_at: DateTime<Utc>,
    pub next_steps: Vec<String>,
}

/// Capability contract a real discovery integration must satisfy.
///
/// Implementations return the server sequence for a scope and may fail with
/// `FactoryError::Validation` (empty scope) or `FactoryError::Discovery`.
pub trait DiscoverySource: Send + Sync {
    fn discover(&self, scope: &DiscoveryScope) -> Result<Vec<Server>>;
}

/// Deterministic in-memory discovery used for demos and tests.
#[derive(Debug, Default, Clone)]
pub struct SimulatedDiscovery;

const APPLICATION_CATALOGUE: [&[&str]; 10] = [
    &["Web Server", "Apache", "PHP"],
    &["Database", "SQL Server", "SSRS"],
    &["Application Server", "IIS", ".NET Framework"],
    &["File Server", "Windows File Services"],
    &["Domain Controller", "Active Directory"],
    &["Monitoring", "SCOM", "SQL Express"],
    &["Backup Server", "Veeam", "PowerShell"],
    &["ERP System", "SAP", "Oracle DB"],
    &["CRM Application", "Salesforce Connect", "IIS"],
    &["Analytics Platform", "Tableau Server", "PostgreSQL"],
];

impl SimulatedDiscovery {
    fn applications(index: usize) -> Vec<String> {
        APPLICATION_CATALOGUE[(index - 1) % APPLICATION_CATALOGUE.len()]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Dependencies always reference strictly earlier indices, so the
    /// relation is acyclic for any fleet size.
    fn dependencies(index: usize) -> BTreeSet<String> {
        let mut deps = BTreeSet::new();
        if index <= 2 {
            // Independent servers
        } else if index <= 6 {
            deps.insert(format!("srv-{:03}", index - 1));
        } else {
            deps.insert(format!("srv-{:03}", (index - 1) % 5 + 1));
            deps.insert(format!("srv-{:03}", (index - 2) % 5 + 1));
        }
        deps
    }

    /// Index-fraction complexity ranking: monotonic, splits the fleet into
    /// the leading 30% LOW, the next 40% MEDIUM, and the trailing 30% HIGH.
    fn complexity(index: usize, fleet_size: usize) -> Complexity {
        if index * 10 <= fleet_size * 3 {
            Complexity::Low
        } else if index * 10 <= fleet_size * 7 {
            Complexity::Medium
        } else {
            Complexity::High
        }
    }

    fn server(index: usize, fleet_size: usize, environment: &str) -> Server {
        let small = index <= 5;
        Server {
            server_id: format!("srv-{index:03}"),
            hostname: format!("{environment}-app-{index:02}"),
            ip_address: format!("10.0.0.{}", 10 + index),
            os_class: if index % 2 == 0 {
                OsClass::Windows
            } else {
                OsClass::Linux
            },
            cpu_cores: if small { 4 } else { 8 },
            memory_gb: if small { 16 } else { 32 },
            storage_gb: (100 + index * 50) as u32,
            applications: Self::applications(index),
            dependencies: Self::dependencies(index),
            complexity: Self::complexity(index, fleet_size),
            target_profile: if small { "t3.large" } else { "m5.xlarge" }.to_string(),
        }
    }
}

impl DiscoverySource for SimulatedDiscovery {
    fn discover(&self, scope: &DiscoveryScope) -> Result<Vec<Server>> {
        if scope.fleet_size == 0 {
            return Err(FactoryError::Validation(
                "discovery scope resolved to zero servers".to_string(),
            ));
        }

        let servers: Vec<Server> = (1..=scope.fleet_size)
            .map(|i| Self::server(i, scope.fleet_size, &scope.environment))
            .collect();

        info!(
            servers = servers.len(),
            environment = %scope.environment,
            "server discovery completed"
        );
        Ok(servers)
    }
}

/// Run discovery through a source and wrap the inventory with summary data.
///
/// The discovery id is derived from the scope, so identical scopes produce
/// identical ids.
pub fn run_discovery(
    source: &dyn DiscoverySource,
    scope: &DiscoveryScope,
) -> Result<DiscoveryOutcome> {
    let servers = source.discover(scope)?;
    let inventory = Inventory::new(servers);
    let portfolio_summary = inventory.summary();

    let fingerprint = Sha256::digest(
        serde_json::to_vec(scope)
            .map_err(|e| FactoryError::Discovery(format!("scope not serializable: {e}")))?,
    );
    let hex = format!("{:x}", fingerprint);
    let discovery_id = format!("disc-{}", &hex[..12]);

    Ok(DiscoveryOutcome {
        discovery_id,
        portfolio_summary,
        inventory,
        completed_at: Utc::now(),
        next_steps: vec![
            "Review server dependencies and migration complexity".to_string(),
            "Plan migration waves based on dependencies".to_string(),
            "Set up replication for source servers".to_string(),
        ],
    })
}
