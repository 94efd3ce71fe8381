//! Wave planner — partitions an inventory into ordered migration waves.
//!
//! Two strategies:
//! - `complexity_based`: exactly three waves (LOW, MEDIUM, HIGH) in that
//!   fixed order. Coarse but predictable; the right default for rehearsals.
//! - `dependency_based`: topological layering over the dependency graph.
//!   A server's wave index is the longest dependency path ending at it, so
//!   every server lands in a wave at or after all of its dependencies and
//!   the plan uses the minimum number of waves satisfying that constraint.
//!
//! Every plan strictly partitions its inventory: each server appears in
//! exactly one wave.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::info;

use super::error::{FactoryError, Result};
use super::inventory::{Complexity, Inventory, Server};

/// Days between the starts of consecutive waves.
pub const INTER_WAVE_OFFSET_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStrategy {
    /// Fixed three-wave split by complexity tier.
    #[default]
    ComplexityBased,
    /// Longest-path topological layering over the dependency graph.
    DependencyBased,
}

impl std::str::FromStr for WaveStrategy {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "complexity_based" => Ok(Self::ComplexityBased),
            "dependency_based" => Ok(Self::DependencyBased),
            other => Err(FactoryError::Validation(format!(
                "unknown wave strategy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A scheduled batch of servers migrated together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    pub wave_id: String,
    /// Explicit position used for ordering and start-time derivation.
    pub index: usize,
    pub name: String,
    pub description: String,
    pub servers: Vec<Server>,
    pub estimated_duration_days: i64,
    pub prerequisites: Vec<String>,
    pub planned_start: DateTime<Utc>,
    pub planned_end: DateTime<Utc>,
    pub risk: RiskLevel,
}

impl Wave {
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }
}

/// Plan-level risk summary derived from the HIGH-complexity fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk_level: RiskLevel,
    pub high_complexity_percentage: f64,
    pub recommended_testing_weeks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavePlan {
    pub plan_id: String,
    pub strategy: WaveStrategy,
    pub waves: Vec<Wave>,
    pub total_duration_days: i64,
    pub risk_assessment: RiskAssessment,
    pub planned_start: DateTime<Utc>,
}

/// Bucket a HIGH-complexity fraction into a risk level: LOW below 20%,
/// MEDIUM below 50%, HIGH at or above.
pub fn risk_level_for_fraction(fraction: f64) -> RiskLevel {
    let pct = fraction * 100.0;
    if pct < 20.0 {
        RiskLevel::Low
    } else if pct < 50.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

fn assess_risk(inventory: &Inventory) -> RiskAssessment {
    let fraction = inventory.high_complexity_fraction();
    let level = risk_level_for_fraction(fraction);
    RiskAssessment {
        overall_risk_level: level,
        high_complexity_percentage: (fraction * 1000.0).round() / 10.0,
        recommended_testing_weeks: if level == RiskLevel::High { 2 } else { 1 },
    }
}

fn duration_for_tier(tier: Complexity) -> i64 {
    match tier {
        Complexity::Low => 7,
        Complexity::Medium => 14,
        Complexity::High => 21,
    }
}

fn wave_risk(servers: &[Server]) -> RiskLevel {
    match servers.iter().map(|s| s.complexity).max() {
        Some(Complexity::High) => RiskLevel::High,
        Some(Complexity::Medium) => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// An unscheduled wave: servers grouped, schedule not yet computed.
struct WaveDraft {
    name: String,
    description: String,
    servers: Vec<Server>,
    duration_days: i64,
    prerequisites: Vec<String>,
}

/// The fixed three-wave split: (name, description, tier, prerequisites).
fn complexity_wave_specs() -> [(&'static str, &'static str, Complexity, Vec<String>); 3] {
    [
        (
            "Independent Systems",
            "Servers with minimal dependencies - lowest risk",
            Complexity::Low,
            vec![
                "Replication setup".to_string(),
                "Target VPC configuration".to_string(),
            ],
        ),
        (
            "Mid-tier Applications",
            "Applications with moderate dependencies",
            Complexity::Medium,
            vec![
                "Wave 1 completion".to_string(),
                "Database migration".to_string(),
                "Network connectivity".to_string(),
            ],
        ),
        (
            "Core Business Systems",
            "Critical systems with complex dependencies",
            Complexity::High,
            vec![
                "All previous waves".to_string(),
                "Extended testing".to_string(),
                "Rollback procedures".to_string(),
            ],
        ),
    ]
}

/// Group servers by complexity into the three canonical waves.
fn partition_by_complexity(inventory: &Inventory) -> Vec<WaveDraft> {
    complexity_wave_specs()
        .into_iter()
        .map(|(name, description, tier, prerequisites)| WaveDraft {
            name: name.to_string(),
            description: description.to_string(),
            servers: inventory
                .servers
                .iter()
                .filter(|s| s.complexity == tier)
                .cloned()
                .collect(),
            duration_days: duration_for_tier(tier),
            prerequisites,
        })
        .collect()
}

/// Layer servers by longest dependency path. Dependencies on servers outside
/// the inventory are ignored; a cycle is a planning error.
fn partition_by_dependency(inventory: &Inventory) -> Result<Vec<WaveDraft>> {
    let index_of: HashMap<&str, usize> = inventory
        .servers
        .iter()
        .enumerate()
        .map(|(i, s)| (s.server_id.as_str(), i))
        .collect();

    // Longest-path layer per server, memoized; the path stack detects cycles.
    let mut layer: Vec<Option<usize>> = vec![None; inventory.servers.len()];
    let mut on_stack = vec![false; inventory.servers.len()];

    fn resolve(
        i: usize,
        servers: &[Server],
        index_of: &HashMap<&str, usize>,
        layer: &mut [Option<usize>],
        on_stack: &mut [bool],
    ) -> Result<usize> {
        if let Some(l) = layer[i] {
            return Ok(l);
        }
        if on_stack[i] {
            return Err(FactoryError::Planning(format!(
                "dependency cycle involving {}",
                servers[i].server_id
            )));
        }
        on_stack[i] = true;
        let mut depth = 0;
        for dep in &servers[i].dependencies {
            if let Some(&j) = index_of.get(dep.as_str()) {
                depth = depth.max(resolve(j, servers, index_of, layer, on_stack)? + 1);
            }
        }
        on_stack[i] = false;
        layer[i] = Some(depth);
        Ok(depth)
    }

    for i in 0..inventory.servers.len() {
        resolve(i, &inventory.servers, &index_of, &mut layer, &mut on_stack)?;
    }

    let wave_count = layer.iter().map(|l| l.unwrap_or(0)).max().unwrap_or(0) + 1;
    let mut buckets: Vec<Vec<Server>> = vec![Vec::new(); wave_count];
    for (i, server) in inventory.servers.iter().enumerate() {
        buckets[layer[i].unwrap_or(0)].push(server.clone());
    }

    Ok(buckets
        .into_iter()
        .enumerate()
        .map(|(idx, servers)| WaveDraft {
            name: format!("Dependency Layer {}", idx + 1),
            description: "Servers whose dependencies are satisfied by earlier waves"
                .to_string(),
            duration_days: servers
                .iter()
                .map(|s| s.complexity)
                .max()
                .map(duration_for_tier)
                .unwrap_or(7),
            prerequisites: if idx == 0 {
                vec![
                    "Replication setup".to_string(),
                    "Target VPC configuration".to_string(),
                ]
            } else {
                vec![format!("Wave {idx} completion")]
            },
            servers,
        })
        .collect())
}

/// Partition an inventory into ordered waves and compute the schedule.
pub fn plan(inventory: &Inventory, strategy: WaveStrategy, start: DateTime<Utc>) -> Result<WavePlan> {
    if inventory.is_empty() {
        return Err(FactoryError::Planning(
            "cannot plan waves over an empty inventory".to_string(),
        ));
    }

    let groups = match strategy {
        WaveStrategy::ComplexityBased => partition_by_complexity(inventory),
        WaveStrategy::DependencyBased => partition_by_dependency(inventory)?,
    };

    let waves: Vec<Wave> = groups
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            let planned_start = start + Duration::days(index as i64 * INTER_WAVE_OFFSET_DAYS);
            let risk = wave_risk(&draft.servers);
            Wave {
                wave_id: format!("wave-{:03}", index + 1),
                index,
                name: draft.name,
                description: draft.description,
                planned_start,
                planned_end: planned_start + Duration::days(draft.duration_days),
                estimated_duration_days: draft.duration_days,
                prerequisites: draft.prerequisites,
                risk,
                servers: draft.servers,
            }
        })
        .collect();

    let max_duration = waves
        .iter()
        .map(|w| w.estimated_duration_days)
        .max()
        .unwrap_or(0);
    let total_duration_days =
        max_duration + (waves.len() as i64 - 1) * INTER_WAVE_OFFSET_DAYS;

    let digest = Sha256::digest(
        serde_json::to_vec(&(strategy, inventory.servers.iter().map(|s| &s.server_id).collect::<Vec<_>>()))
            .map_err(|e| FactoryError::Planning(format!("plan not serializable: {e}")))?,
    );
    let hex = format!("{:x}", digest);

    info!(
        waves = waves.len(),
        servers = inventory.len(),
        ?strategy,
        "migration waves created"
    );

    Ok(WavePlan {
        plan_id: format!("plan-{}", &hex[..12]),
        strategy,
        waves,
        total_duration_days,
        risk_assessment: assess_risk(inventory),
        planned_start: start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discovery::{DiscoveryScope, DiscoverySource, SimulatedDiscovery};
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeSet, HashSet};

    fn ten_server_inventory() -> Inventory {
        Inventory::new(
            SimulatedDiscovery
                .discover(&DiscoveryScope::default())
                .unwrap(),
        )
    }

    fn start() -> DateTime<Utc> {
        "2026-01-05T00:00:00Z".parse().unwrap()
    }

    fn assert_partitions(plan: &WavePlan, inventory: &Inventory) {
        let mut seen = HashSet::new();
        for wave in &plan.waves {
            for server in &wave.servers {
                assert!(
                    seen.insert(server.server_id.clone()),
                    "{} assigned to more than one wave",
                    server.server_id
                );
            }
        }
        let all: HashSet<String> = inventory
            .servers
            .iter()
            .map(|s| s.server_id.clone())
            .collect();
        assert_eq!(seen, all);
    }

    #[test]
    fn complexity_strategy_yields_three_waves_sized_3_4_3() {
        let inventory = ten_server_inventory();
        let plan = plan(&inventory, WaveStrategy::ComplexityBased, start()).unwrap();
        let sizes: Vec<usize> = plan.waves.iter().map(Wave::server_count).collect();
        assert_eq!(sizes, vec![3, 4, 3]);
        assert_partitions(&plan, &inventory);
    }

    #[test]
    fn dependency_strategy_partitions_and_respects_dependencies() {
        let inventory = ten_server_inventory();
        let plan = plan(&inventory, WaveStrategy::DependencyBased, start()).unwrap();
        assert_partitions(&plan, &inventory);

        let wave_of: std::collections::HashMap<String, usize> = plan
            .waves
            .iter()
            .flat_map(|w| w.servers.iter().map(move |s| (s.server_id.clone(), w.index)))
            .collect();
        for wave in &plan.waves {
            for server in &wave.servers {
                for dep in &server.dependencies {
                    assert!(
                        wave_of[dep] < wave.index,
                        "{} scheduled no later than its dependency {}",
                        server.server_id,
                        dep
                    );
                }
            }
        }
    }

    #[test]
    fn total_duration_matches_formula() {
        let inventory = ten_server_inventory();
        for strategy in [WaveStrategy::ComplexityBased, WaveStrategy::DependencyBased] {
            let plan = plan(&inventory, strategy, start()).unwrap();
            let max = plan
                .waves
                .iter()
                .map(|w| w.estimated_duration_days)
                .max()
                .unwrap();
            assert_eq!(
                plan.total_duration_days,
                max + (plan.waves.len() as i64 - 1) * INTER_WAVE_OFFSET_DAYS
            );
        }
    }

    #[test]
    fn wave_schedule_is_offset_by_index() {
        let plan = plan(&ten_server_inventory(), WaveStrategy::ComplexityBased, start()).unwrap();
        for wave in &plan.waves {
            assert_eq!(
                wave.planned_start,
                start() + Duration::days(wave.index as i64 * INTER_WAVE_OFFSET_DAYS)
            );
            assert_eq!(
                wave.planned_end,
                wave.planned_start + Duration::days(wave.estimated_duration_days)
            );
        }
    }

    #[test]
    fn empty_inventory_is_a_planning_error() {
        let err = plan(&Inventory::new(vec![]), WaveStrategy::ComplexityBased, start()).unwrap_err();
        assert!(matches!(err, FactoryError::Planning(_)));
    }

    #[test]
    fn dependency_cycle_is_a_planning_error() {
        let mut inventory = ten_server_inventory();
        // srv-001 <-> srv-002
        inventory.servers[0].dependencies = BTreeSet::from(["srv-002".to_string()]);
        inventory.servers[1].dependencies = BTreeSet::from(["srv-001".to_string()]);
        let err = plan(&inventory, WaveStrategy::DependencyBased, start()).unwrap_err();
        assert!(matches!(err, FactoryError::Planning(_)));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn risk_thresholds_bucket_correctly() {
        assert_eq!(risk_level_for_fraction(0.0), RiskLevel::Low);
        assert_eq!(risk_level_for_fraction(0.19), RiskLevel::Low);
        assert_eq!(risk_level_for_fraction(0.2), RiskLevel::Medium);
        assert_eq!(risk_level_for_fraction(0.49), RiskLevel::Medium);
        assert_eq!(risk_level_for_fraction(0.5), RiskLevel::High);
    }

    #[test]
    fn ten_server_plan_risk_is_medium() {
        // 3 of 10 servers are HIGH → 30%
        let plan = plan(&ten_server_inventory(), WaveStrategy::ComplexityBased, start()).unwrap();
        assert_eq!(plan.risk_assessment.overall_risk_level, RiskLevel::Medium);
        assert_eq!(plan.risk_assessment.high_complexity_percentage, 30.0);
        assert_eq!(plan.risk_assessment.recommended_testing_weeks, 1);
    }

    #[test]
    fn plan_id_is_deterministic() {
        let inventory = ten_server_inventory();
        let a = plan(&inventory, WaveStrategy::ComplexityBased, start()).unwrap();
        let b = plan(&inventory, WaveStrategy::ComplexityBased, start()).unwrap();
        assert_eq!(a.plan_id, b.plan_id);
    }
}
