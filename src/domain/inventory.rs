//! Inventory model — the discovered fleet a migration plan operates on.
//!
//! A `Server` is immutable within one planning cycle. The portfolio summary
//! is always recomputed from the server list so the aggregates can never
//! drift from the servers they describe.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hourly on-demand price per CPU core used for the recurring cost estimate.
const COST_PER_CORE_HOUR: f64 = 0.05;
const HOURS_PER_MONTH: f64 = 730.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsClass {
    Windows,
    Linux,
}

/// Coarse migration-risk tier used to sequence waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// A single discovered source server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub server_id: String,
    pub hostname: String,
    pub ip_address: String,
    pub os_class: OsClass,
    pub cpu_cores: u32,
    pub memory_gb: u32,
    pub storage_gb: u32,
    pub applications: Vec<String>,
    /// Identifiers of servers this one depends on. Never contains the
    /// server's own id; may be empty.
    pub dependencies: BTreeSet<String>,
    pub complexity: Complexity,
    /// Opaque target sizing tag (e.g. an instance type).
    pub target_profile: String,
}

/// Aggregate view over an inventory, derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_servers: usize,
    pub windows_servers: usize,
    pub linux_servers: usize,
    pub total_cpu_cores: u32,
    pub total_memory_gb: u32,
    pub total_storage_gb: u32,
    pub estimated_monthly_cost: f64,
}

/// The discovered fleet: an ordered server list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub servers: Vec<Server>,
}

impl Inventory {
    pub fn new(servers: Vec<Server>) -> Self {
        Self { servers }
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Fraction of HIGH-complexity servers, in [0, 1]. Zero for an empty fleet.
    pub fn high_complexity_fraction(&self) -> f64 {
        if self.servers.is_empty() {
            return 0.0;
        }
        let high = self
            .servers
            .iter()
            .filter(|s| s.complexity == Complexity::High)
            .count();
        high as f64 / self.servers.len() as f64
    }

    /// Compute the portfolio summary from the current server list.
    pub fn summary(&self) -> PortfolioSummary {
        let total_cpu_cores: u32 = self.servers.iter().map(|s| s.cpu_cores).sum();
        let raw_cost = f64::from(total_cpu_cores) * COST_PER_CORE_HOUR * HOURS_PER_MONTH;

        PortfolioSummary {
            total_servers: self.servers.len(),
            windows_servers: self
                .servers
                .iter()
                .filter(|s| s.os_class == OsClass::Windows)
                .count(),
            linux_servers: self
                .servers
                .iter()
                .filter(|s| s.os_class == OsClass::Linux)
                .count(),
            total_cpu_cores,
            total_memory_gb: self.servers.iter().map(|s| s.memory_gb).sum(),
            total_storage_gb: self.servers.iter().map(|s| s.storage_gb).sum(),
            estimated_monthly_cost: (raw_cost * 100.0).round() / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn server(id: &str, complexity: Complexity) -> Server {
        Server {
            server_id: id.to_string(),
            hostname: format!("test-{id}"),
            ip_address: "10.0.0.10".to_string(),
            os_class: OsClass::Linux,
            cpu_cores: 4,
            memory_gb: 16,
            storage_gb: 150,
            applications: vec!["Web Server".to_string()],
            dependencies: BTreeSet::new(),
            complexity,
            target_profile: "t3.large".to_string(),
        }
    }

    #[test]
    fn summary_is_derived_from_servers() {
        let mut inv = Inventory::new(vec![
            server("srv-001", Complexity::Low),
            server("srv-002", Complexity::Low),
        ]);
        assert_eq!(inv.summary().total_servers, 2);
        assert_eq!(inv.summary().total_cpu_cores, 8);

        inv.servers.pop();
        // No stored aggregate to go stale.
        assert_eq!(inv.summary().total_servers, 1);
        assert_eq!(inv.summary().total_cpu_cores, 4);
    }

    #[test]
    fn monthly_cost_rounds_to_cents() {
        let inv = Inventory::new(vec![server("srv-001", Complexity::Low)]);
        // 4 cores * 0.05 * 730 = 146.00
        assert_eq!(inv.summary().estimated_monthly_cost, 146.0);
    }

    #[test]
    fn high_fraction_empty_fleet_is_zero() {
        assert_eq!(Inventory::new(vec![]).high_complexity_fraction(), 0.0);
    }

    #[test]
    fn complexity_tiers_are_ordered() {
        assert!(Complexity::Low < Complexity::Medium);
        assert!(Complexity::Medium < Complexity::High);
    }
}
