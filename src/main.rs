use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use trailguard::cloudtrail::{build_baseline_selectors, CloudTrailClient, RecordingTrail};
use trailguard::config::RemediationConfig;
use trailguard::event::ChangeEvent;
use trailguard::logging::{self, LogFormat};
use trailguard::remediate;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "trailguard")]
#[command(about = "CloudTrail drift remediation", long_about = None)]
struct Cli {
    #[arg(long, value_enum, default_value_t = LogFormat::Json, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Remediate one change event (EventBridge JSON from a file or stdin).
    Remediate {
        /// TOML config; the process environment is used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        event: Option<PathBuf>,
        /// Record the calls that would be made instead of issuing them.
        #[arg(long)]
        plan: bool,
    },
    /// Print the baseline event selectors for the config.
    Selectors {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Remediate {
            config,
            event,
            plan,
        } => {
            let config = load_config(config.as_deref())?;
            info!(
                trail_name = %config.trail_name,
                home_region = %config.home_region,
                data_events = config.has_data_events(),
                plan,
                "config loaded"
            );
            if let Err(err) = config.validate() {
                warn!(error = %err, "remediation will fail until the config is fixed");
            }

            let raw = read_event(event.as_deref())?;
            let event = ChangeEvent::from_json(&raw)?;

            if plan {
                let trail = RecordingTrail::new();
                let result = remediate(&config, &event, &trail);
                let ok = result.ok;
                let document = json!({
                    "result": result,
                    "calls": trail.calls(),
                });
                println!("{}", serde_json::to_string_pretty(&document)?);
                return Ok(ok);
            }

            let trail = CloudTrailClient::from_config(&config)?;
            let result = remediate(&config, &event, &trail);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(result.ok)
        }
        Commands::Selectors { config } => {
            let config = load_config(config.as_deref())?;
            let selectors = build_baseline_selectors(&config);
            println!("{}", serde_json::to_string_pretty(&selectors)?);
            Ok(true)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RemediationConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(RemediationConfig::from_path(path)?),
        None => Ok(RemediationConfig::from_env()),
    }
}

fn read_event(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}
