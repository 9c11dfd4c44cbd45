//! scav-cli: replay operation scripts against a configured reward pool.
//!
//! Loads pool parameters from TOML (with `SCAV_*` environment overrides),
//! wires the pool to in-memory token, registry and attribute stores, replays
//! a JSON script and prints the event stream and final pool state as JSON.

mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scav_pool::{AdminRoles, PoolConfig};
use tracing::info;

use crate::script::{Simulation, parse_script};

/// Scavenge reward pool simulator.
#[derive(Parser)]
#[command(name = "scav-cli", version, about = "Replay Scavenge pool scripts")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script and print events, rejections and the final snapshot.
    Simulate(SimulateArgs),
    /// Load and validate a pool configuration.
    CheckConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Pool configuration file (default: <config dir>/scavenge/pool.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct SimulateArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// JSON operation script.
    #[arg(short, long)]
    script: PathBuf,

    /// Abort on the first rejected operation.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::CheckConfig(args) => check_config(args),
    }
}

fn config_path(args: &ConfigArgs) -> PathBuf {
    args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scavenge")
            .join("pool.toml")
    })
}

fn load_config(args: &ConfigArgs) -> Result<PoolConfig> {
    let path = config_path(args);
    let config = PoolConfig::load(&path)
        .with_context(|| format!("failed to load pool config from {}", path.display()))?;
    info!(path = %path.display(), variant = %config.variant, "loaded pool config");
    Ok(config)
}

fn check_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    let roles = AdminRoles::from_config(&config).context("invalid admin list")?;
    info!(admins = roles.len(), "admin list ok");
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let script = parse_script(&text)?;

    let sim = Simulation::new(config, script.start_block)?;
    let report = sim.run(&script, args.strict)?;
    info!(
        steps = script.steps.len(),
        events = report.events.len(),
        rejections = report.rejections.len(),
        "simulation finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level`. Pass `format = "json"` for
/// structured output; anything else selects human-readable text. Logs go to
/// stderr so stdout stays machine-readable.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "scav-cli",
            "simulate",
            "--config",
            "pool.toml",
            "--script",
            "run.json",
            "--strict",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, "json");
        match cli.command {
            Commands::Simulate(args) => {
                assert!(args.strict);
                assert_eq!(args.script, PathBuf::from("run.json"));
                assert_eq!(config_path(&args.config), PathBuf::from("pool.toml"));
            }
            Commands::CheckConfig(_) => panic!("expected simulate"),
        }
    }

    #[test]
    fn default_config_path_under_scavenge() {
        let path = config_path(&ConfigArgs { config: None });
        assert!(path.ends_with("scavenge/pool.toml"));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = ConfigArgs {
            config: Some(dir.path().join("missing.toml")),
        };
        let err = load_config(&args).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }

    #[test]
    fn load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
reward_asset = "ORB"
stake_asset = "LAY"
pool_account = "0x5050505050505050505050505050505050505050"
treasury = "0x7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e"
variant = "consumable-entry"
burn_sink = "0xdededededededededededededededededededede"
admins = ["0xadadadadadadadadadadadadadadadadadadadad"]
"#
        )
        .unwrap();
        let config = load_config(&ConfigArgs {
            config: Some(file.path().to_path_buf()),
        })
        .unwrap();
        assert!(config.variant.burns_on_entry());
        assert_eq!(config.tax_percent, 15);
    }
}
