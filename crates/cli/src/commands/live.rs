//! Live reading CLI commands

use aqi_lib::live::STATUS_OK;
use aqi_lib::{categorize, LiveReadingAdapter, PipelineMetrics, Reading, StructuredLogger};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::client::{FeedClient, FetchError};
use crate::output::{
    color_category, format_aqi, format_optional, print_error, print_info, print_json,
    print_success, OutputFormat,
};

#[derive(Serialize)]
struct ReadingOutput<'a> {
    #[serde(flatten)]
    reading: &'a Reading,
    category: aqi_lib::Category,
    color: &'static str,
}

#[derive(Tabled)]
struct BandRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "AQI")]
    range: String,
    #[tabled(rename = "Color")]
    color: &'static str,
}

#[derive(Serialize)]
struct BandOutput {
    category: aqi_lib::Category,
    label: &'static str,
    /// Exclusive lower edge, absent for the first band
    above: Option<f64>,
    /// Inclusive upper edge, absent for the last band
    up_to: Option<f64>,
    color: &'static str,
}

/// Index range of a band as shown in the legend
fn band_range(lower: f64, upper: f64) -> String {
    match (lower.is_finite(), upper.is_finite()) {
        (false, true) => format!("≤ {}", upper),
        (true, false) => format!("> {}", lower),
        (true, true) => format!("{} - {}", lower + 1.0, upper),
        (false, false) => "any".to_string(),
    }
}

/// Print the category legend
pub fn show_categories(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let bands: Vec<BandOutput> = aqi_lib::Category::ALL
                .iter()
                .map(|c| {
                    let (lower, upper) = c.bounds();
                    BandOutput {
                        category: *c,
                        label: c.label(),
                        above: Some(lower).filter(|v| v.is_finite()),
                        up_to: Some(upper).filter(|v| v.is_finite()),
                        color: c.color(),
                    }
                })
                .collect();
            print_json(&bands)?;
        }
        OutputFormat::Table => {
            let rows: Vec<BandRow> = aqi_lib::Category::ALL
                .iter()
                .map(|c| {
                    let (lower, upper) = c.bounds();
                    BandRow {
                        category: color_category(Some(*c)).to_string(),
                        range: band_range(lower, upper),
                        color: c.color(),
                    }
                })
                .collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }
    Ok(())
}

/// Fetch and adapt a live reading, recording the outcome
pub async fn fetch_reading(
    client: &FeedClient,
    adapter: &LiveReadingAdapter,
    city: &str,
    logger: &StructuredLogger,
) -> Result<Reading> {
    let metrics = PipelineMetrics::new();
    let result = match client.fetch_feed(city).await {
        Ok(payload) => adapter.adapt(city, &payload).map_err(anyhow::Error::from),
        Err(e) => Err(anyhow::Error::from(e)),
    };

    match result {
        Ok(reading) => {
            metrics.inc_readings_fetched();
            Ok(reading)
        }
        Err(e) => {
            metrics.inc_reading_errors();
            let code = e
                .downcast_ref::<aqi_lib::PipelineError>()
                .map(|p| p.kind().as_str().to_string())
                .unwrap_or_else(|| "transport".to_string());
            logger.log_reading_failed(city, &code, &e.to_string());
            Err(e)
        }
    }
}

/// Show the current reading for a city
pub async fn show_reading(
    client: &FeedClient,
    adapter: &LiveReadingAdapter,
    city: &str,
    format: OutputFormat,
    logger: &StructuredLogger,
) -> Result<()> {
    let reading = fetch_reading(client, adapter, city, logger).await?;
    let (category, color) = categorize(reading.aqi)?;
    logger.log_reading(
        &reading.city,
        reading.aqi,
        category.label(),
        reading.dominant_pollutant.as_ref().map(|p| p.code.as_str()),
    );

    match format {
        OutputFormat::Json => print_json(&ReadingOutput {
            reading: &reading,
            category,
            color,
        })?,
        OutputFormat::Table => print_reading(&reading),
    }

    Ok(())
}

/// Print a reading as a labeled block
pub fn print_reading(reading: &Reading) {
    let category = aqi_lib::Category::from_aqi(reading.aqi);
    println!("{}", "Live Reading".bold());
    println!("{}", "=".repeat(50));
    println!("City:                {}", reading.city.cyan());
    println!("AQI:                 {}", format_aqi(reading.aqi).bold());
    println!("Category:            {}", color_category(category));
    println!(
        "Temperature:         {}",
        format_optional(reading.temperature, "°C")
    );
    match &reading.dominant_pollutant {
        Some(p) => println!(
            "Dominant pollutant:  {} ({})",
            p.code,
            format_optional(p.value, "")
        ),
        None => println!("Dominant pollutant:  -"),
    }
    if let Some(at) = reading.observed_at {
        println!("Observed at:         {}", at.format("%Y-%m-%d %H:%M %:z"));
    }
}

/// Outcome of a raw feed request
#[derive(Debug)]
pub enum FeedCheck {
    /// Provider answered with status `ok`
    Working(serde_json::Value),
    /// Provider answered with an error status
    ApiError(String),
    /// Response body was not JSON
    Undecodable(String),
    /// Request failed or returned a non-success HTTP status
    Unreachable(String),
}

/// Request the raw feed for `city` and classify the answer
pub async fn check_feed(client: &FeedClient, city: &str) -> FeedCheck {
    match client.fetch_feed(city).await {
        Ok(payload) => {
            let status = payload.get("status").and_then(|s| s.as_str());
            if status == Some(STATUS_OK) {
                FeedCheck::Working(payload)
            } else {
                let message = payload
                    .get("message")
                    .or_else(|| payload.get("data"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown error");
                FeedCheck::ApiError(message.to_string())
            }
        }
        Err(e @ FetchError::Decode(_)) => FeedCheck::Undecodable(e.to_string()),
        Err(e) => FeedCheck::Unreachable(e.to_string()),
    }
}

/// Check connectivity to the feed API and dump the raw payload
pub async fn probe(client: &FeedClient, city: &str, format: OutputFormat) -> Result<()> {
    let working = match check_feed(client, city).await {
        FeedCheck::Working(payload) => {
            if let OutputFormat::Table = format {
                print_success(&format!("API is working for {}. Response:", city));
            }
            print_json(&payload)?;
            true
        }
        FeedCheck::ApiError(message) => {
            print_error(&format!("API returned an error for {}: {}", city, message));
            false
        }
        FeedCheck::Undecodable(e) => {
            print_error(&format!("Error decoding JSON for {}: {}", city, e));
            false
        }
        FeedCheck::Unreachable(e) => {
            print_error(&format!("Error connecting to API for {}: {}", city, e));
            false
        }
    };

    if let OutputFormat::Table = format {
        if working {
            print_info("The feed API appears to be working.");
        } else {
            print_info("There might be an issue with the feed API or your request.");
        }
    }
    Ok(())
}
