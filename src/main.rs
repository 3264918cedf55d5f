use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use cpucheck::check::{Check, list_checks, resolve_check};
use cpucheck::config::{self, log_config_error, read_config, try_load_config};
use cpucheck::error::ConfigError;
use cpucheck::logging::init_tracing;
use cpucheck::sender::{OutputFormat, WriterSender};

#[derive(Parser)]
#[command(
    name = "cpucheck",
    about = "Run a metric check on a fixed interval and print its gauges"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of the registered check to run
    #[arg(long, default_value = "cpu")]
    check: String,

    /// Collection interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many runs (0 runs until Ctrl-C)
    #[arg(long, default_value_t = 0)]
    iterations: u64,

    /// Metric output: json, text
    #[arg(long)]
    format: Option<String>,

    /// Log filter, e.g. info or cpucheck=debug
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,

    /// List registered checks and exit
    #[arg(long, default_value_t = false)]
    list_checks: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if cli.list_checks {
        for (name, description) in list_checks() {
            println!("{name:<12}{description}");
        }
        return Ok(());
    }

    let (config, config_error) = load_config_for_cli(&cli);
    init_tracing(&config.general.log_level, cli.log_json)?;
    if let Some(e) = config_error {
        log_config_error(&e);
    }

    let format = OutputFormat::parse(&config.general.format)
        .ok_or_else(|| eyre!("unknown output format `{}`", config.general.format))?;

    let mut check = resolve_check(&cli.check)?;
    check.configure(&config.instance(&cli.check))?;

    let mut sender = WriterSender::new(stdout(), check.name(), format, config.general.tags.clone());
    let period = Duration::from_millis(config.general.interval_ms.max(1));
    info!(check = check.name(), ?period, "starting check");

    run(check.as_mut(), &mut sender, period, cli.iterations).await;
    Ok(())
}

/// Runs `check` every `period` until Ctrl-C or `iterations` runs. Runs never
/// overlap; a failed run is logged and the next one happens on schedule.
async fn run(
    check: &mut dyn Check,
    sender: &mut WriterSender<std::io::Stdout>,
    period: Duration,
    iterations: u64,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut runs = 0u64;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted, stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = check.run(sender) {
                    error!(check = check.name(), error = %e, "check run failed");
                }
                runs += 1;
                if iterations != 0 && runs >= iterations {
                    break;
                }
            }
        }
    }
}

/// Loads the config and applies CLI overrides. A config failure is returned
/// alongside the defaults so it can be logged once tracing is up.
fn load_config_for_cli(cli: &Cli) -> (config::Config, Option<ConfigError>) {
    let loaded = match &cli.config {
        Some(path) => read_config(path),
        None => try_load_config(),
    };
    let (mut config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (config::Config::default(), Some(e)),
    };

    if let Some(ms) = cli.interval_ms {
        config.general.interval_ms = ms;
    }
    if let Some(ref format) = cli.format {
        config.general.format = format.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }

    (config, config_error)
}
