//! Live estimate: compare a measured reading with the model's estimate

use aqi_lib::pipeline::{estimate_reading, Estimate};
use aqi_lib::live::DefaultedFields;
use aqi_lib::{LiveReadingAdapter, Predictor, Reading, StructuredLogger};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::live::{fetch_reading, print_reading};
use super::model::print_trained;
use super::{train_model, warn_untrained, TrainingArgs};
use crate::client::FeedClient;
use crate::config::Config;
use crate::output::{color_category, format_aqi, print_error, print_json, OutputFormat};

/// Why there is no reading when no feed client was built
const NO_TOKEN_REASON: &str =
    "no API token configured; pass --token, set AQI_TOKEN or add api_token to the config file";

#[derive(Serialize)]
struct EstimateOutput {
    reading: Option<Reading>,
    reading_error: Option<String>,
    model: aqi_lib::ModelState,
    estimate: Option<Estimate>,
    defaulted: Option<DefaultedFields>,
}

/// Fetch a reading when a client is available, train, and estimate from the reading
async fn build_estimate(
    client: Option<&FeedClient>,
    adapter: &LiveReadingAdapter,
    city: &str,
    args: &TrainingArgs,
    config: &Config,
    logger: &StructuredLogger,
) -> Result<EstimateOutput> {
    let (reading, reading_error) = match client {
        Some(client) => match fetch_reading(client, adapter, city, logger).await {
            Ok(r) => (Some(r), None),
            Err(e) => (None, Some(e.to_string())),
        },
        None => (None, Some(NO_TOKEN_REASON.to_string())),
    };

    let state = train_model(args, config, logger)?;

    let estimated = match (&reading, state.model()) {
        (Some(r), Some(model)) => {
            let (estimate, defaulted) = estimate_reading(model, adapter, r);
            logger.log_estimate(
                &r.city,
                r.aqi,
                estimate.predicted_aqi,
                estimate
                    .category
                    .map(|c| c.label())
                    .unwrap_or("unknown"),
                model.model_version(),
            );
            Some((estimate, defaulted))
        }
        _ => None,
    };

    Ok(EstimateOutput {
        reading,
        reading_error,
        estimate: estimated.map(|(e, _)| e),
        defaulted: estimated.map(|(_, d)| d),
        model: state,
    })
}

/// Fetch a reading, train a model and estimate the index from the reading.
///
/// A failed fetch, a missing client or an untrained model is reported and
/// the rest still runs.
pub async fn estimate_city(
    client: Option<&FeedClient>,
    adapter: &LiveReadingAdapter,
    city: &str,
    args: &TrainingArgs,
    config: &Config,
    format: OutputFormat,
    logger: &StructuredLogger,
) -> Result<()> {
    let output = build_estimate(client, adapter, city, args, config, logger).await?;

    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Table => {
            match (&output.reading, &output.reading_error) {
                (Some(r), _) => print_reading(r),
                (None, Some(e)) => print_error(&format!("Live reading unavailable: {}", e)),
                (None, None) => {}
            }
            println!();

            match output.model.trained() {
                Some(trained) => print_trained(trained),
                None => warn_untrained(&output.model),
            }

            if let (Some(r), Some(estimate), Some(defaulted)) =
                (&output.reading, output.estimate, output.defaulted)
            {
                println!();
                println!("{}", "Estimate".bold());
                println!("{}", "-".repeat(50));
                println!("Measured AQI:        {}", format_aqi(r.aqi));
                println!(
                    "Estimated AQI:       {} ({})",
                    format_aqi(estimate.predicted_aqi).bold(),
                    color_category(estimate.category)
                );
                println!(
                    "Difference:          {:+.1}",
                    estimate.predicted_aqi - r.aqi
                );
                let assumed = assumed_fields(&defaulted);
                if !assumed.is_empty() {
                    println!(
                        "{}",
                        format!("Assumed from defaults: {}", assumed.join(", ")).dimmed()
                    );
                }
            }
        }
    }

    Ok(())
}

fn assumed_fields(defaulted: &DefaultedFields) -> Vec<&'static str> {
    [
        (defaulted.temperature, "temperature"),
        (defaulted.traffic_level, "traffic_level"),
        (defaulted.industrial_activity, "industrial_activity"),
    ]
    .into_iter()
    .filter_map(|(assumed, name)| assumed.then_some(name))
    .collect()
}
