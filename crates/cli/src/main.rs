//! Air-quality estimator CLI
//!
//! Fetches live readings from the WAQI feed, trains the linear estimator on
//! synthetic or CSV data and predicts index values with their categories.

mod client;
mod commands;
mod config;
mod output;

use aqi_lib::estimator::SweepRange;
use aqi_lib::{FeatureVector, LiveReadingAdapter, PipelineMetrics, StructuredLogger};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use commands::model::FeatureArg;
use commands::{estimate, live, model, TrainingArgs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Air-quality estimator CLI
#[derive(Parser)]
#[command(name = "aqi")]
#[command(author, version, about = "Air Quality Index estimator and live feed dashboard", long_about = None)]
pub struct Cli {
    /// Feed API base URL (overrides the config file)
    #[arg(long, env = "AQI_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Feed API token (overrides the config file)
    #[arg(long, env = "AQI_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Path to the config file (defaults to ~/.config/aqi/config.json)
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Print pipeline metrics to stderr when the command finishes
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current reading for a city
    Fetch {
        /// City name as known to the feed
        city: String,
    },

    /// Check the feed API and print the raw response
    Probe {
        /// City name as known to the feed
        city: String,
    },

    /// Train a model and show its coefficients and evaluation
    Train {
        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Predict the index for one set of feature values
    Predict {
        /// Temperature in °C
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,

        /// Traffic level
        #[arg(long, allow_negative_numbers = true)]
        traffic_level: f64,

        /// Industrial activity
        #[arg(long, allow_negative_numbers = true)]
        industrial_activity: f64,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Predict across a range of one feature, holding the others fixed
    Sweep {
        /// Feature to vary
        #[arg(long, value_enum)]
        feature: FeatureArg,

        /// First value of the range
        #[arg(long, allow_negative_numbers = true)]
        from: f64,

        /// Last value of the range (inclusive)
        #[arg(long, allow_negative_numbers = true)]
        to: f64,

        /// Distance between consecutive values
        #[arg(long, default_value_t = 1.0)]
        step: f64,

        /// Temperature held fixed
        #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
        temperature: f64,

        /// Traffic level held fixed
        #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
        traffic_level: f64,

        /// Industrial activity held fixed
        #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
        industrial_activity: f64,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Compare a city's live reading with the model's estimate
    Estimate {
        /// City name as known to the feed
        city: String,

        /// Traffic level assumed for the city
        #[arg(long, allow_negative_numbers = true)]
        traffic_level: Option<f64>,

        /// Industrial activity assumed for the city
        #[arg(long, allow_negative_numbers = true)]
        industrial_activity: Option<f64>,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Show the AQI category bands
    Categories,

    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn api_token<'a>(cli: &'a Cli, config: &'a config::Config) -> Option<&'a str> {
    cli.token.as_deref().or(config.api_token.as_deref())
}

fn feed_client(cli: &Cli, config: &config::Config) -> Result<client::FeedClient> {
    let api_url = cli.api_url.as_deref().unwrap_or(&config.api_url);
    let Some(token) = api_token(cli, config) else {
        bail!("No API token configured. Pass --token, set AQI_TOKEN or add api_token to the config file");
    };
    client::FeedClient::new(api_url, token, Duration::from_secs(config.timeout_secs))
}

fn config_command(
    command: &ConfigCommands,
    config: &config::Config,
    path: Option<&Path>,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let mut shown = config.clone();
            if shown.api_token.is_some() {
                shown.api_token = Some("********".to_string());
            }
            output::print_json(&shown)?;
        }
        ConfigCommands::Init { force } => {
            let path = match path {
                Some(p) => p.to_path_buf(),
                None => config::Config::config_path()?,
            };
            if path.exists() && !force {
                bail!("{} already exists, use --force to overwrite", path.display());
            }
            config
                .save(&path)
                .with_context(|| format!("Failed to initialize {}", path.display()))?;
            output::print_success(&format!("Wrote {}", path.display()));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::Config::load(cli.config_file.as_deref())?;
    let logger = StructuredLogger::new("aqi-cli");
    let adapter = LiveReadingAdapter::new(config.live_defaults);

    match &cli.command {
        Commands::Fetch { city } => {
            let client = feed_client(&cli, &config)?;
            live::show_reading(&client, &adapter, city, cli.format, &logger).await?;
        }
        Commands::Probe { city } => {
            let client = feed_client(&cli, &config)?;
            live::probe(&client, city, cli.format).await?;
        }
        Commands::Train { training } => {
            model::train(training, &config, cli.format, &logger)?;
        }
        Commands::Predict {
            temperature,
            traffic_level,
            industrial_activity,
            training,
        } => {
            let features = FeatureVector::new(*temperature, *traffic_level, *industrial_activity);
            model::predict(features, training, &config, cli.format, &logger)?;
        }
        Commands::Sweep {
            feature,
            from,
            to,
            step,
            temperature,
            traffic_level,
            industrial_activity,
            training,
        } => {
            let base = FeatureVector::new(*temperature, *traffic_level, *industrial_activity);
            let range = SweepRange {
                feature: (*feature).into(),
                start: *from,
                end: *to,
                step: *step,
            };
            model::sweep_feature(base, range, training, &config, cli.format, &logger)?;
        }
        Commands::Estimate {
            city,
            traffic_level,
            industrial_activity,
            training,
        } => {
            let mut defaults = config.live_defaults;
            if let Some(v) = traffic_level {
                defaults.traffic_level = *v;
            }
            if let Some(v) = industrial_activity {
                defaults.industrial_activity = *v;
            }
            let adapter = LiveReadingAdapter::new(defaults);
            // Without a token the estimate degrades to model-only output
            let client = match api_token(&cli, &config) {
                Some(_) => Some(feed_client(&cli, &config)?),
                None => {
                    tracing::warn!("No API token configured, skipping the live reading");
                    None
                }
            };
            estimate::estimate_city(
                client.as_ref(),
                &adapter,
                city,
                training,
                &config,
                cli.format,
                &logger,
            )
            .await?;
        }
        Commands::Categories => {
            live::show_categories(cli.format)?;
        }
        Commands::Config(command) => {
            config_command(command, &config, cli.config_file.as_deref())?;
        }
    }

    if cli.metrics {
        eprint!("{}", PipelineMetrics::new().render());
    }

    Ok(())
}
