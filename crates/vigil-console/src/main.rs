use anyhow::Result;
use clap::{Parser, Subcommand};
use vigil_client::Backend;
use vigil_core::Notice;

mod config;
mod dashboard;
mod toast;
mod wizard;

use config::Config;

#[derive(Parser)]
#[command(name = "vigil", about = "Terminal console for a face-recognition backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live dashboard: status and log polling plus recognition controls
    Dashboard,
    /// Register a new face through the capture wizard
    Register {
        /// Person to register (prompted for when omitted)
        #[arg(short, long)]
        name: Option<String>,
        /// Start with automatic capture enabled
        #[arg(long)]
        auto: bool,
    },
    /// Print one status snapshot
    Status,
    /// Toggle recognition on or off
    Toggle,
    /// Reload the face database from disk
    Reload,
    /// Test the Home Assistant integration
    Test,
}

// One cooperative UI thread; work interleaves only at await points and
// timers.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let backend = Backend::new(&config.backend_url)?;

    match cli.command {
        Commands::Dashboard => dashboard::run(backend, &config).await?,
        Commands::Register { name, auto } => wizard::run(backend, &config, name, auto).await?,
        Commands::Status => print_status(&backend).await?,
        Commands::Toggle => {
            let toggled = backend.toggle_recognition().await?;
            toast::show(&Notice::success(toggled.message));
        }
        Commands::Reload => {
            let reloaded = backend.reload_faces().await?;
            toast::show(&Notice::success(reloaded.message));
        }
        Commands::Test => {
            let outcome = backend.test_home_assistant().await?;
            let notice = if outcome.success {
                Notice::success(outcome.message)
            } else {
                Notice::error(outcome.message)
            };
            toast::show(&notice);
        }
    }

    Ok(())
}

async fn print_status(backend: &Backend) -> Result<()> {
    let status = backend.status().await?;
    let mut state = vigil_core::DashboardState::new();
    let _ = state.apply_status(&status);
    dashboard::print_snapshot(&state);
    Ok(())
}
