//! # RTW Adapter Binary
//!
//! Runs a generated model behind the UDP model service, or calls it
//! directly for a fixed number of steps.
//!
//! # Usage
//!
//! ```bash
//! # Serve with the configured model
//! rtw_adapter serve --config config/adapter.toml
//!
//! # Ten steps of the built-in sum model on a fixed input
//! rtw_adapter call --model sum --steps 10 --input 1,2,3,4
//!
//! # Procedural build: call a generated library directly
//! rtw_adapter call --model plant --library out/libmodel.so
//!
//! # List built-in models
//! rtw_adapter list
//! ```

#![deny(warnings)]

use clap::{Parser, Subcommand};
use rtw_adapter::call::run_call;
use rtw_adapter::config::AdapterConfig;
use rtw_adapter::models::builtin_registry;
use rtw_adapter::{Executor, ModelService, BINDING_VARIANT};
use rtw_common::config::{ConfigError, ConfigLoader, Validate};
use rtw_common::consts::DEFAULT_CONFIG_PATH;
use rtw_common::model::InputRecord;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// RTW Adapter - generated model adapter and UDP model service
#[derive(Parser, Debug)]
#[command(name = "rtw_adapter")]
#[command(version)]
#[command(about = "Adapter over generated real-time models with a UDP model service")]
#[command(long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs (and the call report) in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the UDP model service
    Serve {
        /// Path to adapter configuration
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Step the model on a fixed input and report timing
    Call {
        /// Path to adapter configuration (model and cache sections are used)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Model name, overrides the configuration
        #[arg(short, long)]
        model: Option<String>,

        /// Model library, overrides the configuration (procedural builds)
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Number of steps
        #[arg(short = 'n', long, default_value_t = 1)]
        steps: u64,

        /// Input record as a,b,c,d
        #[arg(short, long, value_parser = parse_input, default_value = "0,0,0,0")]
        input: InputRecord,

        /// Enable the output cache, persisted at this path
        #[arg(long, value_name = "PATH")]
        cache: Option<PathBuf>,

        /// Do not log every step
        #[arg(short, long)]
        quiet: bool,
    },

    /// List built-in models
    List,
}

impl Command {
    fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Serve { config } => Some(config),
            Command::Call { config, .. } => config.as_ref(),
            Command::List => None,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("rtw_adapter failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = args
        .command
        .config_path()
        .map(|path| AdapterConfig::load_validated(path));
    let config_level = loaded
        .as_ref()
        .and_then(|r| r.as_ref().ok())
        .map(|c| c.shared.log_level.as_tracing_level());
    setup_tracing(&args, config_level);

    info!(
        "RTW Adapter v{} ({} binding)",
        env!("CARGO_PKG_VERSION"),
        BINDING_VARIANT
    );

    let loaded = loaded.transpose()?;

    match args.command {
        Command::Serve { ref config } => {
            let config = loaded.ok_or_else(|| ConfigError::FileNotFound(config.display().to_string()))?;
            serve(config)
        }
        Command::Call {
            ref model,
            ref library,
            steps,
            input,
            ref cache,
            quiet,
            ..
        } => {
            let mut config = loaded.unwrap_or_else(|| AdapterConfig::for_model("echo"));
            if let Some(model) = model {
                config.model.name = model.clone();
            }
            if let Some(library) = library {
                config.model.library = library.clone();
            }
            if let Some(path) = cache {
                config.cache.enabled = true;
                config.cache.path = path.clone();
            }
            config.validate()?;

            let mut executor =
                Executor::from_config(&config.model, &config.cache, builtin_registry())?;
            let report = run_call(&mut executor, &input, steps, !quiet)?;

            if args.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("{report}");
                if let Some(output) = report.last_output {
                    println!("Output: {output}");
                }
            }
            Ok(())
        }
        Command::List => {
            for name in builtin_registry().list_models() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn serve(config: AdapterConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Serving model '{}'", config.model.name);

    let executor = Executor::from_config(&config.model, &config.cache, builtin_registry())?;
    let mut service = ModelService::new(config, executor)?;
    service.init()?;

    let running = service.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    if let Err(e) = service.run() {
        error!("Service loop error: {}", e);
    }

    service.shutdown()?;
    Ok(())
}

/// Parse `a,b,c,d` into an input record.
fn parse_input(s: &str) -> Result<InputRecord, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("'{v}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let channels: [f32; 4] = values
        .try_into()
        .map_err(|v: Vec<f32>| format!("expected 4 comma-separated values, got {}", v.len()))?;
    Ok(InputRecord::from_array(channels))
}

fn setup_tracing(args: &Args, config_level: Option<Level>) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config_level.unwrap_or(Level::INFO)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
