use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use scout_cli::AppContext;
use scout_config::ScoutConfig;

mod cli;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Scout - competitor research powered by deep research tasks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in through the browser (hosted mode)
    Login,
    /// Remove the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Research a competitor and print the report
    Analyze {
        /// Competitor website URL
        #[arg(long)]
        url: String,
        /// What the competitor does
        #[arg(long)]
        summary: String,
        /// Submit and exit without waiting for the result
        #[arg(long)]
        detach: bool,
        /// Save the PDF report into this directory
        #[arg(long)]
        pdf_dir: Option<PathBuf>,
    },
    /// Check a task's status
    Status {
        task_id: String,
        /// Keep polling until the task finishes
        #[arg(long)]
        watch: bool,
        /// Save the PDF report into this directory once available
        #[arg(long)]
        pdf_dir: Option<PathBuf>,
    },
    /// Cancel a running task
    Cancel { task_id: String },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scout=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let config = ScoutConfig::from_env()?;
    let ctx = AppContext::new(config).await?;

    match command {
        Commands::Login => cli::auth::login(&ctx).await,
        Commands::Logout => cli::auth::logout(&ctx).await,
        Commands::Whoami => cli::auth::whoami(&ctx).await,
        Commands::Analyze {
            url,
            summary,
            detach,
            pdf_dir,
        } => cli::research::analyze(&ctx, &url, &summary, detach, pdf_dir.as_deref()).await,
        Commands::Status {
            task_id,
            watch,
            pdf_dir,
        } => cli::research::status(&ctx, &task_id, watch, pdf_dir.as_deref()).await,
        Commands::Cancel { task_id } => cli::research::cancel(&ctx, &task_id).await,
    }
}
