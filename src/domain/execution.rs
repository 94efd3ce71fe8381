//! Execution state machine — drives one wave through its migration phases.
//!
//! Phase order is fixed and strictly sequential:
//! `PRE_VALIDATION → LAUNCH → POST_VALIDATION → (CUTOVER | TEST_COMPLETION)`.
//! The fourth phase depends on the execution mode. A run that loses any
//! phase terminates FAILED with `rollback_required` set; retries are a new
//! run started by the caller, never automatic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{FactoryError, Result};
use super::planner::Wave;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Rehearsal: launch, validate, tear down.
    #[default]
    Test,
    /// The real production traffic switch.
    Cutover,
}

impl std::str::FromStr for ExecutionMode {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "test" => Ok(Self::Test),
            "cutover" => Ok(Self::Cutover),
            other => Err(FactoryError::Validation(format!(
                "unknown execution mode '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    PreValidation,
    Launch,
    PostValidation,
    Cutover,
    TestCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub name: PhaseName,
    pub status: PhaseStatus,
    pub duration_minutes: i64,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// How to back out of a run, and what it costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackPlan {
    pub available: bool,
    pub procedure: String,
    pub estimated_time_minutes: i64,
}

impl RollbackPlan {
    /// Cutover rollback is always more expensive than test rollback: backing
    /// out of a production switch means restarting sources and re-pointing
    /// DNS, not just deleting rehearsal instances.
    pub fn for_mode(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Test => Self {
                available: true,
                procedure: "Terminate test instances, revert DNS changes".to_string(),
                estimated_time_minutes: 15,
            },
            ExecutionMode::Cutover => Self {
                available: true,
                procedure: "Restart source servers, revert DNS, investigate issues"
                    .to_string(),
                estimated_time_minutes: 60,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRun {
    pub execution_id: String,
    pub wave_id: String,
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    pub estimated_completion: DateTime<Utc>,
    pub phases: Vec<Phase>,
    pub status: RunStatus,
    pub rollback_plan: RollbackPlan,
    pub rollback_required: bool,
}

/// Capability port for carrying a phase out against the real world.
///
/// The simulated runner always succeeds; an integration backed by real
/// launch/cutover tooling reports failures through the error result.
pub trait PhaseRunner: Send + Sync {
    fn run(&self, wave: &Wave, phase: PhaseName, mode: ExecutionMode) -> Result<()>;
}

/// Runner used for demos: every phase succeeds instantly.
#[derive(Debug, Default, Clone)]
pub struct SimulatedPhaseRunner;

impl PhaseRunner for SimulatedPhaseRunner {
    fn run(&self, _wave: &Wave, _phase: PhaseName, _mode: ExecutionMode) -> Result<()> {
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The fixed phase catalogue for a mode, all phases PENDING.
fn phase_catalogue(mode: ExecutionMode) -> Vec<Phase> {
    let mut phases = vec![
        Phase {
            name: PhaseName::PreValidation,
            status: PhaseStatus::Pending,
            duration_minutes: 15,
            items: strings(&[
                "Replication sync status verified",
                "Target VPC connectivity confirmed",
                "Security groups validated",
                "IAM roles and policies checked",
            ]),
        },
        Phase {
            name: PhaseName::Launch,
            status: PhaseStatus::Pending,
            duration_minutes: 30,
            items: strings(&[
                "Launch instances from replication",
                "Apply launch templates",
                "Configure monitoring",
                "Update DNS records (test)",
            ]),
        },
        Phase {
            name: PhaseName::PostValidation,
            status: PhaseStatus::Pending,
            duration_minutes: 45,
            items: strings(&[
                "Application functionality testing",
                "Database connectivity verification",
                "Performance baseline comparison",
                "Security configuration validation",
            ]),
        },
    ];

    phases.push(match mode {
        ExecutionMode::Cutover => Phase {
            name: PhaseName::Cutover,
            status: PhaseStatus::Pending,
            duration_minutes: 60,
            items: strings(&[
                "Final replication sync",
                "Source server shutdown",
                "DNS cutover",
                "Monitoring activation",
            ]),
        },
        ExecutionMode::Test => Phase {
            name: PhaseName::TestCompletion,
            status: PhaseStatus::Pending,
            duration_minutes: 15,
            items: strings(&[
                "Test results documentation",
                "Instance cleanup",
                "Lessons learned capture",
            ]),
        },
    });

    phases
}

/// Drive a wave through its phases under the given runner and mode.
///
/// Always returns a run; phase failures are recorded on the run itself
/// (status FAILED, `rollback_required`) rather than surfaced as an `Err`,
/// so the caller gets the partial phase history either way.
pub fn execute(runner: &dyn PhaseRunner, wave: &Wave, mode: ExecutionMode) -> ExecutionRun {
    let started_at = Utc::now();
    let mut phases = phase_catalogue(mode);
    let mut failed = false;

    for phase in phases.iter_mut() {
        if failed {
            // Strictly sequential: nothing after a failed phase runs.
            break;
        }
        phase.status = PhaseStatus::InProgress;
        match runner.run(wave, phase.name, mode) {
            Ok(()) => phase.status = PhaseStatus::Completed,
            Err(e) => {
                warn!(wave_id = %wave.wave_id, phase = ?phase.name, error = %e, "phase failed");
                phase.status = PhaseStatus::Failed;
                failed = true;
            }
        }
    }

    let status = if failed {
        RunStatus::Failed
    } else {
        RunStatus::Completed
    };
    let estimated_hours = match mode {
        ExecutionMode::Test => 2,
        ExecutionMode::Cutover => 4,
    };

    info!(
        wave_id = %wave.wave_id,
        ?mode,
        ?status,
        "migration wave execution finished"
    );

    ExecutionRun {
        execution_id: format!(
            "exec-{}-{}",
            wave.wave_id,
            started_at.format("%Y%m%d%H%M%S")
        ),
        wave_id: wave.wave_id.clone(),
        mode,
        started_at,
        estimated_completion: started_at + Duration::hours(estimated_hours),
        phases,
        status,
        rollback_plan: RollbackPlan::for_mode(mode),
        rollback_required: failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discovery::{DiscoveryScope, DiscoverySource, SimulatedDiscovery};
    use crate::domain::inventory::Inventory;
    use crate::domain::planner::{plan, WaveStrategy};
    use pretty_assertions::assert_eq;

    fn a_wave() -> Wave {
        let inventory = Inventory::new(
            SimulatedDiscovery
                .discover(&DiscoveryScope::default())
                .unwrap(),
        );
        plan(
            &inventory,
            WaveStrategy::ComplexityBased,
            "2026-01-05T00:00:00Z".parse().unwrap(),
        )
        .unwrap()
        .waves
        .remove(0)
    }

    /// Fails every phase whose name matches.
    struct FailAt(PhaseName);

    impl PhaseRunner for FailAt {
        fn run(&self, _wave: &Wave, phase: PhaseName, _mode: ExecutionMode) -> crate::domain::error::Result<()> {
            if phase == self.0 {
                Err(FactoryError::Execution(format!("{phase:?} lost quorum")))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn phases_run_in_fixed_order_for_both_modes() {
        let wave = a_wave();
        for (mode, last) in [
            (ExecutionMode::Test, PhaseName::TestCompletion),
            (ExecutionMode::Cutover, PhaseName::Cutover),
        ] {
            let run = execute(&SimulatedPhaseRunner, &wave, mode);
            let names: Vec<PhaseName> = run.phases.iter().map(|p| p.name).collect();
            assert_eq!(
                names,
                vec![
                    PhaseName::PreValidation,
                    PhaseName::Launch,
                    PhaseName::PostValidation,
                    last
                ]
            );
        }
    }

    #[test]
    fn successful_run_completes_every_phase() {
        let run = execute(&SimulatedPhaseRunner, &a_wave(), ExecutionMode::Test);
        assert_eq!(run.status, RunStatus::Completed);
        assert!(!run.rollback_required);
        assert!(run
            .phases
            .iter()
            .all(|p| p.status == PhaseStatus::Completed));
    }

    #[test]
    fn mode_selects_final_phase_actions() {
        let wave = a_wave();
        let cutover = execute(&SimulatedPhaseRunner, &wave, ExecutionMode::Cutover);
        let last = cutover.phases.last().unwrap();
        assert_eq!(last.name, PhaseName::Cutover);
        assert!(last.items.iter().any(|i| i.contains("Source server shutdown")));
        assert!(last.items.iter().any(|i| i.contains("DNS cutover")));

        let test = execute(&SimulatedPhaseRunner, &wave, ExecutionMode::Test);
        let last = test.phases.last().unwrap();
        assert_eq!(last.name, PhaseName::TestCompletion);
        assert!(last.items.iter().any(|i| i.contains("Instance cleanup")));
    }

    #[test]
    fn cutover_rollback_is_strictly_more_expensive() {
        let test = RollbackPlan::for_mode(ExecutionMode::Test);
        let cutover = RollbackPlan::for_mode(ExecutionMode::Cutover);
        assert!(cutover.estimated_time_minutes > test.estimated_time_minutes);
        assert!(test.available && cutover.available);
    }

    #[test]
    fn post_validation_failure_is_terminal_and_requires_rollback() {
        let run = execute(
            &FailAt(PhaseName::PostValidation),
            &a_wave(),
            ExecutionMode::Cutover,
        );
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.rollback_required);
        assert!(run.rollback_plan.procedure.contains("Restart source servers"));

        let statuses: Vec<PhaseStatus> = run.phases.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                PhaseStatus::Completed,
                PhaseStatus::Completed,
                PhaseStatus::Failed,
                PhaseStatus::Pending
            ]
        );
    }

    #[test]
    fn first_phase_failure_leaves_everything_else_pending() {
        let run = execute(
            &FailAt(PhaseName::PreValidation),
            &a_wave(),
            ExecutionMode::Test,
        );
        assert_eq!(run.phases[0].status, PhaseStatus::Failed);
        assert!(run.phases[1..]
            .iter()
            .all(|p| p.status == PhaseStatus::Pending));
        assert!(run.rollback_required);
    }
}
