//! Model training and prediction CLI commands

use aqi_lib::estimator::{sweep, SweepRange};
use aqi_lib::pipeline::estimate;
use aqi_lib::{FeatureName, FeatureVector, ModelState, PipelineMetrics, StructuredLogger, TrainedModel};
use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::{train_model, warn_untrained, TrainingArgs};
use crate::config::Config;
use crate::output::{
    color_category, color_r_squared, format_aqi, format_metric, print_json, OutputFormat,
};

/// Feature selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FeatureArg {
    Temperature,
    TrafficLevel,
    IndustrialActivity,
}

impl From<FeatureArg> for FeatureName {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::Temperature => FeatureName::Temperature,
            FeatureArg::TrafficLevel => FeatureName::TrafficLevel,
            FeatureArg::IndustrialActivity => FeatureName::IndustrialActivity,
        }
    }
}

/// Row for coefficients table
#[derive(Tabled)]
struct CoefficientRow {
    #[tabled(rename = "Term")]
    term: String,
    #[tabled(rename = "Coefficient")]
    coefficient: String,
}

/// Row for sweep table
#[derive(Tabled)]
struct SweepRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Predicted AQI")]
    predicted: String,
    #[tabled(rename = "Category")]
    category: String,
}

/// Print a trained model and its evaluation
pub fn print_trained(trained: &TrainedModel) {
    let model = &trained.model;
    println!("{}", "Model".bold());
    println!("{}", "=".repeat(50));
    println!(
        "Version:             {}",
        aqi_lib::Predictor::model_version(model).cyan()
    );
    println!(
        "Samples:             {} train / {} held out",
        trained.train_samples, trained.held_out_samples
    );
    println!();

    let mut rows = vec![CoefficientRow {
        term: "intercept".to_string(),
        coefficient: format!("{:.4}", model.intercept()),
    }];
    rows.extend(
        model
            .feature_names()
            .iter()
            .map(|f| CoefficientRow {
                term: f.to_string(),
                coefficient: format!("{:.4}", model.coefficient(*f)),
            }),
    );
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
    println!();

    println!("{}", "Evaluation".bold());
    println!("{}", "-".repeat(50));
    println!(
        "Mean squared error:  {}",
        format_metric(trained.evaluation.mean_squared_error)
    );
    println!(
        "RMSE:                {}",
        format_metric(trained.evaluation.rmse())
    );
    println!(
        "R²:                  {}",
        color_r_squared(trained.evaluation.r_squared)
    );
}

/// Train a model and show its coefficients and evaluation
pub fn train(
    args: &TrainingArgs,
    config: &Config,
    format: OutputFormat,
    logger: &StructuredLogger,
) -> Result<()> {
    let state = train_model(args, config, logger)?;

    match format {
        OutputFormat::Json => print_json(&state)?,
        OutputFormat::Table => match &state {
            ModelState::Trained(trained) => print_trained(trained),
            ModelState::Untrained { .. } => warn_untrained(&state),
        },
    }

    Ok(())
}

#[derive(Serialize)]
struct PredictionOutput {
    model_version: String,
    #[serde(flatten)]
    estimate: aqi_lib::pipeline::Estimate,
}

/// Train a model and predict the index for one feature vector
pub fn predict(
    features: FeatureVector,
    args: &TrainingArgs,
    config: &Config,
    format: OutputFormat,
    logger: &StructuredLogger,
) -> Result<()> {
    let state = train_model(args, config, logger)?;
    let Some(model) = state.model() else {
        warn_untrained(&state);
        return Ok(());
    };

    let outcome = estimate(model, features);
    match format {
        OutputFormat::Json => print_json(&PredictionOutput {
            model_version: aqi_lib::Predictor::model_version(model).to_string(),
            estimate: outcome,
        })?,
        OutputFormat::Table => {
            println!("{}", "Prediction".bold());
            println!("{}", "=".repeat(50));
            println!("Temperature:         {:.1}°C", features.temperature);
            println!("Traffic level:       {:.1}", features.traffic_level);
            println!("Industrial activity: {:.1}", features.industrial_activity);
            println!(
                "Predicted AQI:       {}",
                format_aqi(outcome.predicted_aqi).bold()
            );
            println!("Category:            {}", color_category(outcome.category));
        }
    }

    Ok(())
}

/// Train a model and predict across a range of one feature
pub fn sweep_feature(
    base: FeatureVector,
    range: SweepRange,
    args: &TrainingArgs,
    config: &Config,
    format: OutputFormat,
    logger: &StructuredLogger,
) -> Result<()> {
    let state = train_model(args, config, logger)?;
    let Some(model) = state.model() else {
        warn_untrained(&state);
        return Ok(());
    };

    let points = sweep(model, &base, &range)?;
    PipelineMetrics::new().inc_predictions(points.len() as u64);

    match format {
        OutputFormat::Json => print_json(&points)?,
        OutputFormat::Table => {
            println!(
                "{} {} from {} to {} (step {})",
                "Sweep".bold(),
                range.feature.to_string().cyan(),
                range.start,
                range.end,
                range.step
            );
            let rows: Vec<SweepRow> = points
                .iter()
                .map(|p| SweepRow {
                    value: format!("{:.2}", p.value),
                    predicted: format_aqi(p.predicted_aqi),
                    category: color_category(p.category).to_string(),
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
