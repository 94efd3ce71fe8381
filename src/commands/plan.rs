//! `caravan plan` — discover the fleet and partition it into waves.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use crate::config;
use crate::domain::discovery::DiscoveryScope;
use crate::domain::planner::{RiskLevel, WavePlan, WaveStrategy};
use crate::domain::service::MigrationService;

pub fn run(strategy: &str, fleet_size: Option<usize>, format: &str) -> Result<()> {
    let cfg = config::load()?;
    let strategy: WaveStrategy = strategy.parse()?;
    let scope = DiscoveryScope {
        environment: cfg.discovery.environment,
        fleet_size: fleet_size.unwrap_or(cfg.discovery.fleet_size),
        subnet_ranges: cfg.discovery.subnet_ranges,
    };

    let service = MigrationService::simulated();
    let outcome = service.discover(&scope)?;
    let plan = service.plan(&outcome.inventory, strategy, Utc::now())?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        _ => print_table(&plan),
    }
    Ok(())
}

fn risk_str(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::Low => "low".green().to_string(),
        RiskLevel::Medium => "medium".yellow().to_string(),
        RiskLevel::High => "high".red().to_string(),
    }
}

fn print_table(plan: &WavePlan) {
    println!("{}", "═══ Wave Plan ═══".cyan().bold());
    println!("  Plan ID:    {}", plan.plan_id.bold());
    println!("  Strategy:   {:?}", plan.strategy);
    println!("  Start:      {}", plan.planned_start.to_rfc3339());
    println!("  Duration:   {} days", plan.total_duration_days);
    println!();

    for wave in &plan.waves {
        println!(
            "{}",
            format!("── {} ({}) ──", wave.name, wave.wave_id).yellow()
        );
        println!("  {}", wave.description.dimmed());
        println!(
            "  Servers: {}   Duration: {} days   Risk: {}",
            wave.server_count(),
            wave.estimated_duration_days,
            risk_str(wave.risk)
        );
        println!(
            "  Window:  {} → {}",
            wave.planned_start.format("%Y-%m-%d"),
            wave.planned_end.format("%Y-%m-%d")
        );
        if !wave.servers.is_empty() {
            let ids: Vec<&str> = wave.servers.iter().map(|s| s.server_id.as_str()).collect();
            println!("  Members: {}", ids.join(", "));
        }
        if !wave.prerequisites.is_empty() {
            println!("  Prereqs: {}", wave.prerequisites.join("; "));
        }
        println!();
    }

    let risk = &plan.risk_assessment;
    println!("{}", "── Risk ──".yellow());
    println!("  Overall:           {}", risk_str(risk.overall_risk_level));
    println!(
        "  High-complexity:   {:.1}%",
        risk.high_complexity_percentage
    );
    println!(
        "  Testing budget:    {} week(s)",
        risk.recommended_testing_weeks
    );
}
