//! Reporting aggregator — stakeholder-facing summary over inventory, wave
//! plan, and execution outcomes.
//!
//! Pure aggregation: cost figures are echoed from the caller, nothing is
//! mutated, and the report id is derived from the report body so identical
//! inputs always produce the identical report.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{FactoryError, Result};
use super::execution::{ExecutionRun, RunStatus};
use super::inventory::{Complexity, Inventory};
use super::planner::{risk_level_for_fraction, RiskLevel, WavePlan};

/// Everything a report is built from. Cost figures come from the caller;
/// this component performs no cost modeling of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInput {
    pub inventory: Option<Inventory>,
    pub plan: Option<WavePlan>,
    #[serde(default)]
    pub runs: Vec<ExecutionRun>,
    #[serde(default)]
    pub costs: CostFigures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostFigures {
    pub current_monthly_cost: f64,
    pub target_monthly_cost: f64,
    pub migration_investment: f64,
}

/// Servers bucketed by migration readiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessBuckets {
    /// LOW complexity: ready to migrate.
    pub ready: usize,
    /// MEDIUM complexity: needs remediation first.
    pub needs_remediation: usize,
    /// HIGH complexity: complex migration.
    pub complex_migration: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub servers_discovered: usize,
    pub migration_readiness: ReadinessBuckets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub current_estimated_monthly_cost: f64,
    pub target_monthly_cost: f64,
    /// Heuristic, not modeled: typical savings seen after rightsizing.
    pub estimated_savings_percentage: u32,
    pub migration_investment_required: f64,
    pub roi_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRiskAssessment {
    pub overall_risk_level: RiskLevel,
    pub key_risks: Vec<String>,
    pub mitigation_strategies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineProjection {
    pub total_migration_duration_days: i64,
    pub waves_planned: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub runs_completed: usize,
    pub runs_failed: usize,
    pub rollback_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub portfolio_analysis: PortfolioAnalysis,
    pub cost_analysis: CostAnalysis,
    pub risk_assessment: ReportRiskAssessment,
    pub timeline_projection: Option<TimelineProjection>,
    pub execution_summary: ExecutionSummary,
    pub recommendations: Vec<String>,
}

fn readiness(inventory: &Inventory) -> ReadinessBuckets {
    let count = |tier: Complexity| {
        inventory
            .servers
            .iter()
            .filter(|s| s.complexity == tier)
            .count()
    };
    ReadinessBuckets {
        ready: count(Complexity::Low),
        needs_remediation: count(Complexity::Medium),
        complex_migration: count(Complexity::High),
    }
}

/// Aggregate the supplied inputs into a stakeholder report.
pub fn generate(input: &ReportInput) -> Result<Report> {
    let inventory = input.inventory.as_ref().ok_or_else(|| {
        FactoryError::Reporting("report requires a discovered inventory".to_string())
    })?;

    let execution_summary = ExecutionSummary {
        runs_completed: input
            .runs
            .iter()
            .filter(|r| r.status == RunStatus::Completed)
            .count(),
        runs_failed: input
            .runs
            .iter()
            .filter(|r| r.status == RunStatus::Failed)
            .count(),
        rollback_required: input.runs.iter().any(|r| r.rollback_required),
    };

    let mut report = Report {
        report_id: String::new(),
        portfolio_analysis: PortfolioAnalysis {
            servers_discovered: inventory.len(),
            migration_readiness: readiness(inventory),
        },
        cost_analysis: CostAnalysis {
            current_estimated_monthly_cost: input.costs.current_monthly_cost,
            target_monthly_cost: input.costs.target_monthly_cost,
            estimated_savings_percentage: 25,
            migration_investment_required: input.costs.migration_investment,
            roi_months: 12,
        },
        risk_assessment: ReportRiskAssessment {
            overall_risk_level: risk_level_for_fraction(inventory.high_complexity_fraction()),
            key_risks: vec![
                "Application dependencies require careful sequencing".to_string(),
                "Legacy systems may need modernization".to_string(),
                "Network connectivity during transition".to_string(),
            ],
            mitigation_strategies: vec![
                "Implement comprehensive testing in each wave".to_string(),
                "Establish robust rollback procedures".to_string(),
                "Use block-level replication for minimal downtime".to_string(),
            ],
        },
        timeline_projection: input.plan.as_ref().map(|plan| TimelineProjection {
            total_migration_duration_days: plan.total_duration_days,
            waves_planned: plan.waves.len(),
        }),
        execution_summary,
        recommendations: vec![
            "Proceed with the low-complexity wave for quick wins".to_string(),
            "Invest in application modernization for legacy systems".to_string(),
            "Implement comprehensive monitoring and alerting".to_string(),
            "Establish cloud governance and cost optimization practices".to_string(),
        ],
    };

    // Content-derived id: identical inputs yield the identical report.
    let digest = Sha256::digest(
        serde_json::to_vec(&report)
            .map_err(|e| FactoryError::Reporting(format!("report not serializable: {e}")))?,
    );
    let hex = format!("{:x}", digest);
    report.report_id = format!("rpt-{}", &hex[..12]);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discovery::{DiscoveryScope, DiscoverySource, SimulatedDiscovery};
    use crate::domain::execution::{execute, ExecutionMode, SimulatedPhaseRunner};
    use crate::domain::planner::{plan, WaveStrategy};
    use pretty_assertions::assert_eq;

    fn full_input() -> ReportInput {
        let inventory = Inventory::new(
            SimulatedDiscovery
                .discover(&DiscoveryScope::default())
                .unwrap(),
        );
        let wave_plan = plan(
            &inventory,
            WaveStrategy::ComplexityBased,
            "2026-01-05T00:00:00Z".parse().unwrap(),
        )
        .unwrap();
        let runs = wave_plan
            .waves
            .iter()
            .map(|w| execute(&SimulatedPhaseRunner, w, ExecutionMode::Test))
            .collect();
        ReportInput {
            inventory: Some(inventory),
            plan: Some(wave_plan),
            runs,
            costs: CostFigures {
                current_monthly_cost: 5000.0,
                target_monthly_cost: 3750.0,
                migration_investment: 20000.0,
            },
        }
    }

    #[test]
    fn readiness_buckets_follow_complexity() {
        let report = generate(&full_input()).unwrap();
        assert_eq!(
            report.portfolio_analysis.migration_readiness,
            ReadinessBuckets {
                ready: 3,
                needs_remediation: 4,
                complex_migration: 3,
            }
        );
        assert_eq!(report.portfolio_analysis.servers_discovered, 10);
    }

    #[test]
    fn cost_figures_are_echoed_not_modeled() {
        let report = generate(&full_input()).unwrap();
        assert_eq!(report.cost_analysis.current_estimated_monthly_cost, 5000.0);
        assert_eq!(report.cost_analysis.target_monthly_cost, 3750.0);
        assert_eq!(report.cost_analysis.migration_investment_required, 20000.0);
    }

    #[test]
    fn report_is_idempotent_and_does_not_mutate_input() {
        let input = full_input();
        let before = serde_json::to_value(&input).unwrap();
        let a = generate(&input).unwrap();
        let b = generate(&input).unwrap();
        assert_eq!(a.report_id, b.report_id);
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
        assert_eq!(before, serde_json::to_value(&input).unwrap());
    }

    #[test]
    fn missing_inventory_is_a_reporting_error() {
        let err = generate(&ReportInput::default()).unwrap_err();
        assert!(matches!(err, FactoryError::Reporting(_)));
    }

    #[test]
    fn execution_summary_counts_failures() {
        use crate::domain::execution::{PhaseName, PhaseRunner};
        use crate::domain::planner::Wave;

        struct AlwaysFail;
        impl PhaseRunner for AlwaysFail {
            fn run(
                &self,
                _wave: &Wave,
                _phase: PhaseName,
                _mode: ExecutionMode,
            ) -> crate::domain::error::Result<()> {
                Err(FactoryError::Execution("unreachable target".to_string()))
            }
        }

        let mut input = full_input();
        let wave = input.plan.as_ref().unwrap().waves[0].clone();
        input.runs.push(execute(&AlwaysFail, &wave, ExecutionMode::Cutover));

        let report = generate(&input).unwrap();
        assert_eq!(report.execution_summary.runs_completed, 3);
        assert_eq!(report.execution_summary.runs_failed, 1);
        assert!(report.execution_summary.rollback_required);
    }
}
