mod api;
mod commands;
mod config;
mod domain;
mod server;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "caravan", version, about = "Migration-wave planning and execution service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run simulated discovery and display the inventory
    Discover {
        /// Environment tag for the discovery scope
        #[arg(long)]
        environment: Option<String>,

        /// Number of servers the scope resolves to
        #[arg(long)]
        fleet_size: Option<usize>,

        /// Subnet range to scan (repeatable)
        #[arg(long = "subnet")]
        subnets: Vec<String>,

        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Partition the discovered fleet into migration waves
    Plan {
        /// Wave strategy (complexity_based or dependency_based)
        #[arg(long, default_value = "complexity_based")]
        strategy: String,

        /// Number of servers the scope resolves to
        #[arg(long)]
        fleet_size: Option<usize>,

        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Drive one wave through its execution phases
    Execute {
        /// Wave to execute (e.g. wave-001)
        wave_id: String,

        /// Execution mode (test or cutover)
        #[arg(long, default_value = "test")]
        mode: String,

        /// Wave strategy the plan was built with
        #[arg(long, default_value = "complexity_based")]
        strategy: String,

        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Run the full rehearsal pipeline and display the report
    Report {
        /// Wave strategy (complexity_based or dependency_based)
        #[arg(long, default_value = "complexity_based")]
        strategy: String,

        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,

        /// Push the report to a controller endpoint
        #[arg(long)]
        push: bool,

        /// Controller URL (used with --push)
        #[arg(long)]
        controller_url: Option<String>,
    },

    /// Run the caravan daemon (REST API)
    Daemon {
        /// HTTP listen address (overrides config)
        #[arg(long)]
        http_addr: Option<String>,

        /// Log level (overrides config)
        #[arg(long)]
        log_level: Option<String>,

        /// Path to config file (default: ~/.config/caravan/config.toml)
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Discover {
            environment,
            fleet_size,
            subnets,
            format,
        } => commands::discover::run(environment, fleet_size, subnets, &format),
        Commands::Plan {
            strategy,
            fleet_size,
            format,
        } => commands::plan::run(&strategy, fleet_size, &format),
        Commands::Execute {
            wave_id,
            mode,
            strategy,
            format,
        } => commands::execute::run(&wave_id, &mode, &strategy, &format),
        Commands::Report {
            strategy,
            format,
            push,
            controller_url,
        } => commands::report::run(&strategy, &format, push, controller_url.as_deref()),
        Commands::Daemon {
            http_addr,
            log_level,
            config,
        } => commands::daemon::run(http_addr, log_level, config),
    }
}
