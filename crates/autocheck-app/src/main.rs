use autocheck_domain::events::EventReceiver;
use autocheck_domain::shared::DomainError;
use autocheck_infrastructure::clock::LocalClock;
use autocheck_infrastructure::config::AppConfig;
use autocheck_infrastructure::logging::init_logger;
use autocheck_infrastructure::secrets::EnvSecretStore;
use autocheck_lib::application::ResultExt;
use autocheck_lib::presentation::cli::{Cli, Command};
use autocheck_lib::presentation::commands::{list_tabs, run_tab};
use autocheck_lib::presentation::console::ConsolePresenter;
use autocheck_lib::presentation::{AppState, CommandError};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = prepare(&cli)
        .and_then(|(config_path, config)| start_runtime(cli.cmd, config_path, config));

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn prepare(cli: &Cli) -> Result<(PathBuf, AppConfig), CommandError> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_path()?,
    };
    let config = AppConfig::load(&config_path)?;

    init_logging(&config, cli.verbose);
    tracing::info!("🚀 autocheck starting...");

    Ok((config_path, config))
}

/// Drive the command on a runtime whose teardown is bounded: a check body
/// that never returns must not keep the process alive past the grace.
fn start_runtime(
    cmd: Command,
    config_path: PathBuf,
    config: AppConfig,
) -> Result<ExitCode, CommandError> {
    let grace = config.timings().shutdown_grace;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .to_infra_err()?;

    let outcome = runtime.block_on(run(cmd, config_path, config));
    runtime.shutdown_timeout(grace);
    outcome
}

async fn run(
    cmd: Command,
    config_path: PathBuf,
    config: AppConfig,
) -> Result<ExitCode, CommandError> {
    match cmd {
        Command::InitConfig => {
            config.save(&config_path)?;
            println!("Configuration written to {}", config_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            let (state, _rx) = bootstrap(&config)?;
            print!("{}", list_tabs(&state));
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            tab,
            check,
            with_scheduled,
        } => {
            let (state, mut rx) = bootstrap(&config)?;
            let presenter = ConsolePresenter::new(std::io::stdout().is_terminal());

            let summary = run_tab(
                &state,
                &mut rx,
                &presenter,
                &tab,
                check.as_deref(),
                with_scheduled,
            )
            .await?;

            Ok(match summary {
                Some(summary) if summary.failed == 0 && !summary.was_interrupted() => {
                    ExitCode::SUCCESS
                }
                Some(_) => ExitCode::FAILURE,
                None => ExitCode::from(130),
            })
        }
    }
}

fn bootstrap(config: &AppConfig) -> Result<(AppState, EventReceiver), DomainError> {
    AppState::bootstrap(config, Arc::new(EnvSecretStore), Arc::new(LocalClock))
}

fn init_logging(config: &AppConfig, verbose: bool) {
    let initialized = AppConfig::default_log_dir().and_then(|log_dir| {
        init_logger(log_dir.clone(), config.log_level, verbose)?;
        Ok(log_dir)
    });

    match initialized {
        Ok(log_dir) => {
            tracing::info!("📝 File logging initialized at: {}", log_dir.display());
        }
        Err(e) => {
            eprintln!("⚠️  Failed to initialize file logging: {}", e);
            eprintln!("   Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
                )
                .with_target(true)
                .with_line_number(true)
                .try_init();
        }
    }
}
