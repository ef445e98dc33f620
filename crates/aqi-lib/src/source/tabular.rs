//! CSV-backed sample loading
//!
//! Two tables are read and concatenated. Only the three feature columns and
//! the target column are kept; a row missing any of them is dropped.

use super::FeatureSource;
use crate::error::{PipelineError, Result};
use crate::models::{FeatureName, FeatureVector, LabeledSample};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column mapping and CSV dialect for tabular sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularOptions {
    pub delimiter: u8,
    pub temperature_column: String,
    pub traffic_column: String,
    pub industrial_column: String,
    pub target_column: String,
}

impl Default for TabularOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            temperature_column: FeatureName::Temperature.as_str().to_string(),
            traffic_column: FeatureName::TrafficLevel.as_str().to_string(),
            industrial_column: FeatureName::IndustrialActivity.as_str().to_string(),
            target_column: "aqi".to_string(),
        }
    }
}

impl TabularOptions {
    pub fn with_target(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Selected columns: temperature, traffic, industrial, target
    fn columns(&self) -> [&str; 4] {
        [
            self.temperature_column.as_str(),
            self.traffic_column.as_str(),
            self.industrial_column.as_str(),
            self.target_column.as_str(),
        ]
    }
}

/// Two-table CSV sample source
#[derive(Debug, Clone)]
pub struct TabularSource {
    pub paths: [PathBuf; 2],
    pub options: TabularOptions,
}

impl TabularSource {
    pub fn new(path_a: impl Into<PathBuf>, path_b: impl Into<PathBuf>) -> Self {
        Self {
            paths: [path_a.into(), path_b.into()],
            options: TabularOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TabularOptions) -> Self {
        self.options = options;
        self
    }
}

impl FeatureSource for TabularSource {
    fn samples(&self) -> Result<Vec<LabeledSample>> {
        load_with(&self.paths[0], &self.paths[1], &self.options)
    }

    fn describe(&self) -> String {
        format!(
            "csv({}, {})",
            self.paths[0].display(),
            self.paths[1].display()
        )
    }
}

/// Load and concatenate two tables using the default column names
pub fn load(path_a: &Path, path_b: &Path) -> Result<Vec<LabeledSample>> {
    load_with(path_a, path_b, &TabularOptions::default())
}

pub fn load_with(
    path_a: &Path,
    path_b: &Path,
    options: &TabularOptions,
) -> Result<Vec<LabeledSample>> {
    let mut samples = read_table(path_a, options)?;
    samples.extend(read_table(path_b, options)?);
    Ok(samples)
}

fn read_table(path: &Path, options: &TabularOptions) -> Result<Vec<LabeledSample>> {
    if !path.exists() {
        return Err(PipelineError::DataUnavailable {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        });
    }

    let file = File::open(path).map_err(|e| PipelineError::DataUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(file);

    let headers = rdr
        .headers()
        .map_err(|e| PipelineError::DataUnavailable {
            path: path.to_path_buf(),
            reason: format!("failed to read header: {}", e),
        })?
        .clone();

    let mut indices = [0usize; 4];
    for (slot, column) in indices.iter_mut().zip(options.columns()) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| PipelineError::SchemaMismatch {
                path: path.to_path_buf(),
                column: column.to_string(),
            })?;
    }

    let mut samples = Vec::new();
    let mut dropped = 0usize;

    for (row, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(path = %path.display(), row = row, error = %e, "Skipping malformed row");
                dropped += 1;
                continue;
            }
        };

        let mut values = [0.0f64; 4];
        let complete = indices
            .iter()
            .zip(values.iter_mut())
            .all(|(&idx, value)| match parse_cell(record.get(idx)) {
                Some(v) => {
                    *value = v;
                    true
                }
                None => false,
            });

        if !complete {
            dropped += 1;
            continue;
        }

        let [temperature, traffic_level, industrial_activity, target] = values;
        samples.push(LabeledSample::new(
            FeatureVector::new(temperature, traffic_level, industrial_activity),
            target,
        ));
    }

    info!(
        path = %path.display(),
        rows = samples.len(),
        dropped = dropped,
        "Loaded tabular samples"
    );
    Ok(samples)
}

/// A cell is missing when absent, blank, unparsable or non-finite
fn parse_cell(cell: Option<&str>) -> Option<f64> {
    let trimmed = cell?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let dir = TempDir::new().unwrap();
        let present = write_csv(
            &dir,
            "a.csv",
            "temperature,traffic_level,industrial_activity,aqi\n30,5,5,120\n",
        );
        let missing = dir.path().join("nope.csv");

        let err = load(&present, &missing).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
        let err = load(&missing, &present).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
    }

    #[test]
    fn test_concatenates_and_drops_missing() {
        let dir = TempDir::new().unwrap();
        let a = write_csv(
            &dir,
            "a.csv",
            "city,temperature,traffic_level,industrial_activity,aqi\n\
             Delhi,30,5,5,120\n\
             Delhi,31,,5,130\n\
             Delhi,32,6,4,NaN\n",
        );
        let b = write_csv(
            &dir,
            "b.csv",
            "aqi,industrial_activity,traffic_level,temperature,extra\n\
             80,2,3,25,x\n\
             90,3,3,abc,y\n\
             95,3,4,26,\n",
        );

        let samples = load(&a, &b).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(
            samples[0],
            LabeledSample::new(FeatureVector::new(30.0, 5.0, 5.0), 120.0)
        );
        assert_eq!(
            samples[1],
            LabeledSample::new(FeatureVector::new(25.0, 3.0, 2.0), 80.0)
        );
        assert_eq!(samples[2].features.temperature, 26.0);
    }

    #[test]
    fn test_absent_column_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let a = write_csv(&dir, "a.csv", "temperature,traffic_level,aqi\n30,5,120\n");
        let b = write_csv(
            &dir,
            "b.csv",
            "temperature,traffic_level,industrial_activity,aqi\n30,5,5,120\n",
        );

        match load(&a, &b).unwrap_err() {
            PipelineError::SchemaMismatch { column, .. } => {
                assert_eq!(column, "industrial_activity")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_custom_target_and_delimiter() {
        let dir = TempDir::new().unwrap();
        let content = "temperature;traffic_level;industrial_activity;pm25\n28;4;6;55.5\n";
        let a = write_csv(&dir, "a.csv", content);
        let b = write_csv(&dir, "b.csv", content);

        let options = TabularOptions::default()
            .with_target("pm25")
            .with_delimiter(b';');
        let samples = TabularSource::new(&a, &b)
            .with_options(options)
            .samples()
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].target, 55.5);
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(Some(" 4.5 ")), Some(4.5));
        assert_eq!(parse_cell(Some("")), None);
        assert_eq!(parse_cell(Some("inf")), None);
        assert_eq!(parse_cell(None), None);
    }
}
