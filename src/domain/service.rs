//! Migration service — wires the capability ports behind one entry point.
//!
//! Each component receives only the narrow capability it needs: discovery
//! behind `DiscoverySource`, replication behind `ReplicationSetupPort`,
//! phase execution behind `PhaseRunner`. The API layer and the CLI both
//! talk to this service; neither reaches into the ports directly.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::discovery::{self, DiscoveryOutcome, DiscoveryScope, DiscoverySource, SimulatedDiscovery};
use super::error::Result;
use super::execution::{self, ExecutionMode, ExecutionRun, PhaseRunner, SimulatedPhaseRunner};
use super::inventory::{Inventory, Server};
use super::planner::{self, Wave, WavePlan, WaveStrategy};
use super::replication::{ReplicationBatch, ReplicationSetupPort, SimulatedReplication};
use super::report::{self, Report, ReportInput};

pub struct MigrationService {
    discovery: Arc<dyn DiscoverySource>,
    replication: Arc<dyn ReplicationSetupPort>,
    runner: Arc<dyn PhaseRunner>,
}

impl MigrationService {
    pub fn new(
        discovery: Arc<dyn DiscoverySource>,
        replication: Arc<dyn ReplicationSetupPort>,
        runner: Arc<dyn PhaseRunner>,
    ) -> Self {
        Self {
            discovery,
            replication,
            runner,
        }
    }

    /// All-simulated wiring used by the CLI and the demo daemon.
    pub fn simulated() -> Self {
        Self::new(
            Arc::new(SimulatedDiscovery),
            Arc::new(SimulatedReplication::default()),
            Arc::new(SimulatedPhaseRunner),
        )
    }

    pub fn discover(&self, scope: &DiscoveryScope) -> Result<DiscoveryOutcome> {
        discovery::run_discovery(self.discovery.as_ref(), scope)
    }

    pub fn plan(
        &self,
        inventory: &Inventory,
        strategy: WaveStrategy,
        start: DateTime<Utc>,
    ) -> Result<WavePlan> {
        planner::plan(inventory, strategy, start)
    }

    pub fn setup_replication(&self, servers: &[Server]) -> Result<ReplicationBatch> {
        self.replication.setup(servers)
    }

    pub fn execute(&self, wave: &Wave, mode: ExecutionMode) -> ExecutionRun {
        execution::execute(self.runner.as_ref(), wave, mode)
    }

    pub fn report(&self, input: &ReportInput) -> Result<Report> {
        report::generate(input)
    }

    /// Run the whole pipeline once: discover → plan → rehearse every wave →
    /// report. Used by `caravan report` and handy for smoke tests.
    pub fn rehearse(
        &self,
        scope: &DiscoveryScope,
        strategy: WaveStrategy,
        start: DateTime<Utc>,
    ) -> Result<Report> {
        let outcome = self.discover(scope)?;
        let plan = self.plan(&outcome.inventory, strategy, start)?;
        let runs: Vec<ExecutionRun> = plan
            .waves
            .iter()
            .map(|wave| self.execute(wave, ExecutionMode::Test))
            .collect();

        let current = outcome.portfolio_summary.estimated_monthly_cost;
        let input = ReportInput {
            costs: super::report::CostFigures {
                current_monthly_cost: current,
                target_monthly_cost: (current * 0.75 * 100.0).round() / 100.0,
                migration_investment: 0.0,
            },
            inventory: Some(outcome.inventory),
            plan: Some(plan),
            runs,
        };
        self.report(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rehearsal_pipeline_produces_a_clean_report() {
        let service = MigrationService::simulated();
        let report = service
            .rehearse(
                &DiscoveryScope::default(),
                WaveStrategy::ComplexityBased,
                "2026-01-05T00:00:00Z".parse().unwrap(),
            )
            .unwrap();
        assert_eq!(report.portfolio_analysis.servers_discovered, 10);
        assert_eq!(report.execution_summary.runs_completed, 3);
        assert!(!report.execution_summary.rollback_required);
    }
}
