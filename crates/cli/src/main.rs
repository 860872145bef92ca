use clap::{Parser, Subcommand};

mod commands;

use commands::{EvaluateArgs, OpenHedgesArgs, PlanArgs, ServeArgs};

#[derive(Parser)]
#[command(name = "hedgebot")]
#[command(about = "Exposure hedging decision engine", long_about = None)]
struct Cli {
    /// Config profile layered over config/Config.toml (e.g. "paper")
    #[arg(long, global = true, env = "HEDGEBOT_PROFILE")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve(ServeArgs),
    /// Run one hedge cycle against the database
    Evaluate(EvaluateArgs),
    /// Compute decisions for a request without persisting anything
    Plan(PlanArgs),
    /// List hedges in the registry
    OpenHedges(OpenHedgesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let profile = cli.profile.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, profile).await?,
        Commands::Evaluate(args) => commands::run_evaluate(args, profile).await?,
        Commands::Plan(args) => commands::run_plan(args, profile).await?,
        Commands::OpenHedges(args) => commands::run_open_hedges(args, profile).await?,
    }

    Ok(())
}
