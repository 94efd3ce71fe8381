//! `caravan report` — run the rehearsal pipeline and display the report.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use crate::config;
use crate::domain::discovery::DiscoveryScope;
use crate::domain::report::Report;
use crate::domain::service::MigrationService;

pub fn run(strategy: &str, format: &str, push: bool, controller_url: Option<&str>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { run_async(strategy, format, push, controller_url).await })
}

async fn run_async(
    strategy: &str,
    format: &str,
    push: bool,
    controller_url: Option<&str>,
) -> Result<()> {
    let cfg = config::load()?;
    let scope = DiscoveryScope {
        environment: cfg.discovery.environment,
        fleet_size: cfg.discovery.fleet_size,
        subnet_ranges: cfg.discovery.subnet_ranges,
    };

    let report = MigrationService::simulated().rehearse(&scope, strategy.parse()?, Utc::now())?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_table(&report),
    }

    if push {
        let url = controller_url.unwrap_or("http://localhost:9400");
        let endpoint = format!("{}/api/v1/reports/{}", url, report.report_id);

        println!("\n{} to {}...", "Pushing report".cyan(), endpoint);

        let client = reqwest::Client::new();
        let resp = client.post(&endpoint).json(&report).send().await?;

        if resp.status().is_success() {
            println!("{}", "Report pushed successfully".green());
        } else {
            println!(
                "{}: {} {}",
                "Push failed".red(),
                resp.status(),
                resp.text().await.unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn print_table(report: &Report) {
    println!("{}", "═══ Migration Report ═══".cyan().bold());
    println!("  Report ID:  {}", report.report_id.bold());
    println!();

    let readiness = &report.portfolio_analysis.migration_readiness;
    println!("{}", "── Portfolio ──".yellow());
    println!(
        "  Discovered:         {}",
        report.portfolio_analysis.servers_discovered
    );
    println!("  Ready:              {}", readiness.ready.to_string().green());
    println!(
        "  Needs remediation:  {}",
        readiness.needs_remediation.to_string().yellow()
    );
    println!(
        "  Complex migration:  {}",
        readiness.complex_migration.to_string().red()
    );

    let cost = &report.cost_analysis;
    println!();
    println!("{}", "── Cost ──".yellow());
    println!("  Current monthly:    ${:.2}", cost.current_estimated_monthly_cost);
    println!("  Target monthly:     ${:.2}", cost.target_monthly_cost);
    println!("  Est. savings:       {}%", cost.estimated_savings_percentage);
    println!("  Investment:         ${:.2}", cost.migration_investment_required);
    println!("  ROI horizon:        {} months", cost.roi_months);

    println!();
    println!("{}", "── Risk ──".yellow());
    println!(
        "  Overall: {:?}",
        report.risk_assessment.overall_risk_level
    );
    for risk in &report.risk_assessment.key_risks {
        println!("  • {}", risk);
    }

    if let Some(timeline) = &report.timeline_projection {
        println!();
        println!("{}", "── Timeline ──".yellow());
        println!("  Waves:     {}", timeline.waves_planned);
        println!(
            "  Duration:  {} days",
            timeline.total_migration_duration_days
        );
    }

    let exec = &report.execution_summary;
    println!();
    println!("{}", "── Execution ──".yellow());
    println!("  Runs completed:  {}", exec.runs_completed);
    println!(
        "  Runs failed:     {}",
        if exec.runs_failed > 0 {
            exec.runs_failed.to_string().red().to_string()
        } else {
            exec.runs_failed.to_string()
        }
    );
    if exec.rollback_required {
        println!("  {}", "Rollback required".red().bold());
    }

    println!();
    println!("{}", "Recommendations:".dimmed());
    for rec in &report.recommendations {
        println!("  • {}", rec);
    }
}
