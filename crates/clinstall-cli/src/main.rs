use anyhow::Result;
use clap::{Parser, Subcommand};
use clinstall_core::installation::{ConsoleErrorPresenter, ConsoleNotifier};
use clinstall_core::{ConfigLoader, InstallOrchestrator, InstallOutcome, InstallerConfig};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

mod progress;

use progress::ProgressObserver;

#[derive(Parser, Debug)]
#[clap(
    name = "clinstall",
    author,
    version,
    about = "Install a command-line tool through its package manager or a prebuilt binary"
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(long, short, help = "Path to a YAML configuration file")]
    config: Option<PathBuf>,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Directory the downloaded binary is installed into")]
    install_dir: Option<PathBuf>,

    #[clap(long, help = "Skip the package manager and always download the binary")]
    no_package_manager: bool,

    #[clap(long, help = "Do not render progress")]
    headless: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Install the tool (default command)
    Install,
    /// Print the effective configuration as YAML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let config = effective_config(&cli).await?;

    match cli.command.unwrap_or(Commands::Install) {
        Commands::Install => {
            let outcome = run_install(&config, cli.headless).await?;
            if !outcome.is_installed() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

/// Configuration file (or defaults) with command-line overrides applied
async fn effective_config(cli: &Cli) -> Result<InstallerConfig> {
    let mut config = ConfigLoader::load_or_default(cli.config.as_deref()).await?;
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut InstallerConfig, cli: &Cli) {
    if let Some(install_dir) = &cli.install_dir {
        config.install_dir = Some(install_dir.clone());
    }
    if cli.no_package_manager {
        config.package_manager.enabled = false;
    }
}

async fn run_install(config: &InstallerConfig, headless: bool) -> Result<InstallOutcome> {
    let orchestrator = InstallOrchestrator::create_default(
        config,
        Arc::new(ConsoleNotifier),
        Arc::new(ConsoleErrorPresenter),
    )?;

    let outcome = if headless {
        orchestrator.run(None).await
    } else {
        let progress = ProgressObserver::new(&config.tool.name)?;
        orchestrator.run(Some(&progress)).await
    };

    match &outcome {
        InstallOutcome::Installed(method) => log::debug!("Installed via {:?}", method),
        InstallOutcome::Offline => log::debug!("Skipped installation while offline"),
        InstallOutcome::Failed(e) => log::debug!("Installation failed: {}", e),
    }

    Ok(outcome)
}
