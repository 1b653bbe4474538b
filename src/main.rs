//! PhishGuard Core - CLI Entry Point
//!
//! Thin caller over the engine surface: classify, feedback, retrain,
//! status. HTTP transport is deliberately out of scope; this binary is
//! the reference caller.

use clap::{Parser, Subcommand};

use phishguard_core::{CoreError, Engine, EngineConfig};

#[derive(Parser)]
#[command(name = "phishguard", version, about = "PhishGuard URL classification core")]
struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Enable network-derived features (TLS probe, RDAP domain age)
    #[arg(long, global = true)]
    network: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a URL and store the verdict
    Classify { url: String },
    /// Print the extracted feature vector for a URL
    Features { url: String },
    /// Submit a corrected label ("legitimate" or "phishing") for a URL
    Feedback { url: String, label: String },
    /// Submit a corrected label for a stored prediction id
    FeedbackId { prediction_id: String, label: String },
    /// Rebuild the model from the corpus and hot-swap it
    Retrain,
    /// Show engine status
    Status,
    /// List stored prediction records
    Records,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CoreError> {
    let mut config = EngineConfig::default();

    // A config file in the default data dir overrides built-in defaults;
    // CLI flags override both.
    let config_path = config.config_path();
    if config_path.exists() {
        config = EngineConfig::load(&config_path)?;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if cli.network || phishguard_core::constants::network_checks_env_enabled() {
        config.network_checks = true;
    }

    log::info!(
        "Starting {} v{}",
        phishguard_core::constants::APP_NAME,
        phishguard_core::constants::APP_VERSION
    );

    let engine = Engine::new(config)?;
    engine.init();

    match cli.command {
        Command::Classify { url } => {
            let verdict = engine.classify_url(&url)?;
            print_json(&verdict)?;
        }
        Command::Features { url } => {
            let vector = engine.extract_features(&url)?;
            println!("{}", serde_json::to_string_pretty(&vector.to_named_map())?);
        }
        Command::Feedback { url, label } => {
            let receipt = engine.submit_feedback(&url, &label)?;
            print_json(&receipt)?;
        }
        Command::FeedbackId {
            prediction_id,
            label,
        } => {
            let receipt = engine.submit_feedback_for(&prediction_id, &label)?;
            print_json(&receipt)?;
        }
        Command::Retrain => {
            let report = engine.retrain()?;
            print_json(&report)?;
        }
        Command::Status => {
            let status = engine.status()?;
            print_json(&status)?;
        }
        Command::Records => {
            let records = engine.predictions()?;
            print_json(&records)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CoreError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
