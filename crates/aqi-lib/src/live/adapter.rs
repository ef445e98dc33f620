use crate::error::{PipelineError, Result};
use crate::models::{FeatureVector, Pollutant, Reading};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Status value the provider uses for a successful lookup
pub const STATUS_OK: &str = "ok";

/// Pollutant codes checked, in order, when picking the dominant pollutant
pub const POLLUTANT_PRIORITY: [&str; 6] = ["pm25", "pm10", "o3", "no2", "co", "so2"];

/// Layout of the provider's local observation time
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-pollutant key holding the temperature
const TEMPERATURE_KEY: &str = "t";

/// Values used for features a live reading does not carry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveDefaults {
    pub temperature: f64,
    pub traffic_level: f64,
    pub industrial_activity: f64,
}

impl Default for LiveDefaults {
    fn default() -> Self {
        Self {
            temperature: 30.0,
            traffic_level: 5.0,
            industrial_activity: 5.0,
        }
    }
}

/// Which features of an adapted vector came from [`LiveDefaults`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultedFields {
    pub temperature: bool,
    pub traffic_level: bool,
    pub industrial_activity: bool,
}

/// Normalizes provider payloads into readings and feature vectors
#[derive(Debug, Clone, Default)]
pub struct LiveReadingAdapter {
    defaults: LiveDefaults,
}

impl LiveReadingAdapter {
    pub fn new(defaults: LiveDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &LiveDefaults {
        &self.defaults
    }

    /// Extract a reading from a feed payload.
    ///
    /// `requested_city` names the reading when the payload carries no city name.
    pub fn adapt(&self, requested_city: &str, payload: &Value) -> Result<Reading> {
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| PipelineError::MalformedPayload("missing `status` field".to_string()))?;

        if status != STATUS_OK {
            return Err(PipelineError::ProviderError {
                message: provider_message(payload),
            });
        }

        let data = payload
            .get("data")
            .filter(|d| d.is_object())
            .ok_or_else(|| PipelineError::MalformedPayload("missing `data` object".to_string()))?;

        let aqi = data
            .get("aqi")
            .ok_or_else(|| PipelineError::MalformedPayload("missing `aqi` field".to_string()))
            .and_then(|v| {
                as_number(v).ok_or_else(|| {
                    PipelineError::MalformedPayload(format!("non-numeric `aqi` value {}", v))
                })
            })?;

        let iaqi = data.get("iaqi").and_then(Value::as_object);
        let reading_of = |code: &str| -> Option<f64> {
            iaqi.and_then(|m| m.get(code))
                .and_then(|entry| entry.get("v"))
                .and_then(as_number)
        };

        let temperature = reading_of(TEMPERATURE_KEY);

        let dominant_pollutant = POLLUTANT_PRIORITY
            .iter()
            .copied()
            .find(|code| iaqi.map(|m| m.contains_key(*code)).unwrap_or(false))
            .map(|code| Pollutant {
                code: code.to_uppercase(),
                value: reading_of(code),
            })
            .or_else(|| {
                data.get("dominentpol")
                    .and_then(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| Pollutant {
                        code: name.trim().to_uppercase(),
                        value: reading_of(name.trim().to_lowercase().as_str()),
                    })
            });

        let city = data
            .get("city")
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(requested_city)
            .to_string();

        let observed_at = data.get("time").and_then(observation_time);

        debug!(
            city = %city,
            aqi = aqi,
            temperature = ?temperature,
            pollutant = ?dominant_pollutant.as_ref().map(|p| p.code.as_str()),
            "Adapted provider payload"
        );

        Ok(Reading {
            city,
            aqi,
            temperature,
            dominant_pollutant,
            observed_at,
        })
    }

    /// Feature vector for a reading, filling gaps from the live defaults
    pub fn to_features(&self, reading: &Reading) -> (FeatureVector, DefaultedFields) {
        let temperature = reading.temperature.filter(|t| t.is_finite());
        let features = FeatureVector::new(
            temperature.unwrap_or(self.defaults.temperature),
            self.defaults.traffic_level,
            self.defaults.industrial_activity,
        );
        let defaulted = DefaultedFields {
            temperature: temperature.is_none(),
            traffic_level: true,
            industrial_activity: true,
        };
        (features, defaulted)
    }
}

/// Error text from a failed payload: `message`, else `data` when it is a string
fn provider_message(payload: &Value) -> String {
    payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("data").and_then(Value::as_str))
        .unwrap_or("unknown provider error")
        .to_string()
}

/// Observation time from `time.iso`, else from the local `time.s` and `time.tz`.
///
/// A local time without an offset is taken as UTC.
fn observation_time(time: &Value) -> Option<DateTime<FixedOffset>> {
    if let Some(iso) = time.get("iso").and_then(Value::as_str) {
        if let Ok(at) = DateTime::parse_from_rfc3339(iso) {
            return Some(at);
        }
    }

    let local = time.get("s").and_then(Value::as_str)?.trim();
    let local = NaiveDateTime::parse_from_str(local, LOCAL_TIME_FORMAT).ok()?;
    let offset = match time.get("tz").and_then(Value::as_str) {
        Some(tz) => tz.trim().parse::<FixedOffset>().ok()?,
        None => FixedOffset::east_opt(0)?,
    };
    offset.from_local_datetime(&local).single()
}

/// A JSON number, or a string holding one
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
