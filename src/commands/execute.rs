//! `caravan execute` — drive one wave of the current plan through its phases.

use anyhow::{bail, Result};
use chrono::Utc;
use colored::Colorize;

use crate::config;
use crate::domain::discovery::DiscoveryScope;
use crate::domain::execution::{ExecutionRun, PhaseStatus, RunStatus};
use crate::domain::service::MigrationService;

pub fn run(wave_id: &str, mode: &str, strategy: &str, format: &str) -> Result<()> {
    let cfg = config::load()?;
    let mode = mode.parse()?;
    let strategy = strategy.parse()?;
    let scope = DiscoveryScope {
        environment: cfg.discovery.environment,
        fleet_size: cfg.discovery.fleet_size,
        subnet_ranges: cfg.discovery.subnet_ranges,
    };

    let service = MigrationService::simulated();
    let outcome = service.discover(&scope)?;
    let plan = service.plan(&outcome.inventory, strategy, Utc::now())?;

    let Some(wave) = plan.waves.iter().find(|w| w.wave_id == wave_id) else {
        let known: Vec<&str> = plan.waves.iter().map(|w| w.wave_id.as_str()).collect();
        bail!("unknown wave '{}' (known: {})", wave_id, known.join(", "));
    };

    let run = service.execute(wave, mode);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&run)?),
        _ => print_table(&run),
    }

    if run.status == RunStatus::Failed {
        bail!("wave execution failed, rollback required");
    }
    Ok(())
}

fn print_table(run: &ExecutionRun) {
    println!("{}", "═══ Wave Execution ═══".cyan().bold());
    println!("  Execution ID:  {}", run.execution_id.bold());
    println!("  Wave:          {}", run.wave_id);
    println!("  Mode:          {:?}", run.mode);
    println!(
        "  Status:        {}",
        match run.status {
            RunStatus::Completed => "completed".green().to_string(),
            RunStatus::Failed => "failed".red().to_string(),
        }
    );
    println!("  Est. done:     {}", run.estimated_completion.to_rfc3339());
    println!();

    println!("{}", "── Phases ──".yellow());
    for phase in &run.phases {
        let status = match phase.status {
            PhaseStatus::Completed => "completed".green().to_string(),
            PhaseStatus::Failed => "failed".red().to_string(),
            PhaseStatus::InProgress => "in progress".yellow().to_string(),
            PhaseStatus::Pending => "pending".dimmed().to_string(),
        };
        println!(
            "  {:<16} {:<12} {:>3} min",
            format!("{:?}", phase.name),
            status,
            phase.duration_minutes
        );
        for item in &phase.items {
            println!("      {}", item.dimmed());
        }
    }

    println!();
    println!("{}", "── Rollback ──".yellow());
    println!(
        "  Required:   {}",
        if run.rollback_required {
            "yes".red().to_string()
        } else {
            "no".to_string()
        }
    );
    println!("  Procedure:  {}", run.rollback_plan.procedure);
    println!(
        "  Estimate:   {} min",
        run.rollback_plan.estimated_time_minutes
    );
}
