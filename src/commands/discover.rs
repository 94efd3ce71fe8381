//! `caravan discover` — run simulated discovery and display the inventory.

use anyhow::Result;
use colored::Colorize;

use crate::config;
use crate::domain::discovery::{DiscoveryOutcome, DiscoveryScope};
use crate::domain::service::MigrationService;

pub fn run(
    environment: Option<String>,
    fleet_size: Option<usize>,
    subnets: Vec<String>,
    format: &str,
) -> Result<()> {
    let cfg = config::load()?;
    let scope = DiscoveryScope {
        environment: environment.unwrap_or(cfg.discovery.environment),
        fleet_size: fleet_size.unwrap_or(cfg.discovery.fleet_size),
        subnet_ranges: if subnets.is_empty() {
            cfg.discovery.subnet_ranges
        } else {
            subnets
        },
    };

    let outcome = MigrationService::simulated().discover(&scope)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome)?),
        _ => print_table(&outcome),
    }
    Ok(())
}

fn print_table(outcome: &DiscoveryOutcome) {
    println!("{}", "═══ Discovered Inventory ═══".cyan().bold());
    println!("  Discovery ID:  {}", outcome.discovery_id.bold());
    println!();

    println!("{}", "── Servers ──".yellow());
    for server in &outcome.inventory.servers {
        println!(
            "  {:<9} {:<20} {:<12} {:>2} cores {:>3} GB RAM {:>4} GB disk  {}",
            server.server_id.bold(),
            server.hostname,
            format!("{:?}", server.os_class).to_lowercase(),
            server.cpu_cores,
            server.memory_gb,
            server.storage_gb,
            match server.complexity {
                crate::domain::inventory::Complexity::Low => "low".green().to_string(),
                crate::domain::inventory::Complexity::Medium => "medium".yellow().to_string(),
                crate::domain::inventory::Complexity::High => "high".red().to_string(),
            }
        );
        if !server.dependencies.is_empty() {
            let deps: Vec<&str> = server.dependencies.iter().map(String::as_str).collect();
            println!("            {} {}", "depends on:".dimmed(), deps.join(", "));
        }
    }

    let summary = &outcome.portfolio_summary;
    println!();
    println!("{}", "── Portfolio ──".yellow());
    println!("  Servers:       {}", summary.total_servers);
    println!(
        "  OS Split:      {} Windows / {} Linux",
        summary.windows_servers, summary.linux_servers
    );
    println!("  CPU Cores:     {}", summary.total_cpu_cores);
    println!("  Memory:        {} GB", summary.total_memory_gb);
    println!("  Storage:       {} GB", summary.total_storage_gb);
    println!(
        "  Est. Monthly:  ${:.2}",
        summary.estimated_monthly_cost
    );

    println!();
    println!("{}", "Next steps:".dimmed());
    for step in &outcome.next_steps {
        println!("  • {}", step);
    }
}
