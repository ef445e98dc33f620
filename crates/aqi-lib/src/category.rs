//! AQI severity bands
//!
//! Upper edges are inclusive: 50 is Good, 51 is Satisfactory.
//! Negative values fall into the first band. NaN has no band.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

/// Band table: inclusive upper edge, category, display color
const BANDS: [(f64, Category, &str); 6] = [
    (50.0, Category::Good, "#00B050"),
    (100.0, Category::Satisfactory, "#92D050"),
    (200.0, Category::Moderate, "#FFFF00"),
    (300.0, Category::Poor, "#FF9900"),
    (400.0, Category::VeryPoor, "#FF0000"),
    (f64::INFINITY, Category::Severe, "#C00000"),
];

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Good,
        Category::Satisfactory,
        Category::Moderate,
        Category::Poor,
        Category::VeryPoor,
        Category::Severe,
    ];

    /// Band for an index, `None` for NaN
    pub fn from_aqi(aqi: f64) -> Option<Self> {
        if aqi.is_nan() {
            return None;
        }
        BANDS
            .iter()
            .find(|(upper, _, _)| aqi <= *upper)
            .map(|(_, category, _)| *category)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Satisfactory => "Satisfactory",
            Category::Moderate => "Moderate",
            Category::Poor => "Poor",
            Category::VeryPoor => "Very Poor",
            Category::Severe => "Severe",
        }
    }

    /// Hex display color
    pub fn color(&self) -> &'static str {
        BANDS[*self as usize].2
    }

    /// Index range covered by this band as (exclusive lower, inclusive upper)
    pub fn bounds(&self) -> (f64, f64) {
        let idx = *self as usize;
        let lower = if idx == 0 {
            f64::NEG_INFINITY
        } else {
            BANDS[idx - 1].0
        };
        (lower, BANDS[idx].0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map an index to its band and display color
pub fn categorize(aqi: f64) -> Result<(Category, &'static str)> {
    let category = Category::from_aqi(aqi)
        .ok_or_else(|| PipelineError::InvalidInput("AQI is not a number".to_string()))?;
    Ok((category, category.color()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_boundaries() {
        assert_eq!(categorize(50.0).unwrap().0, Category::Good);
        assert_eq!(categorize(51.0).unwrap().0, Category::Satisfactory);
        assert_eq!(categorize(100.0).unwrap().0, Category::Satisfactory);
        assert_eq!(categorize(200.0).unwrap().0, Category::Moderate);
        assert_eq!(categorize(300.0).unwrap().0, Category::Poor);
        assert_eq!(categorize(400.0).unwrap().0, Category::VeryPoor);
        assert_eq!(categorize(401.0).unwrap().0, Category::Severe);
    }

    #[test]
    fn test_fractional_values_above_edge() {
        assert_eq!(categorize(50.5).unwrap().0, Category::Satisfactory);
        assert_eq!(categorize(400.01).unwrap().0, Category::Severe);
    }

    #[test]
    fn test_negative_is_good() {
        assert_eq!(categorize(-12.0).unwrap().0, Category::Good);
        assert_eq!(categorize(f64::NEG_INFINITY).unwrap().0, Category::Good);
    }

    #[test]
    fn test_nan_rejected() {
        assert!(matches!(
            categorize(f64::NAN),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_colors_and_bounds() {
        assert_eq!(categorize(10.0).unwrap().1, "#00B050");
        assert_eq!(categorize(1000.0).unwrap().1, "#C00000");
        assert_eq!(Category::Moderate.bounds(), (100.0, 200.0));
        assert_eq!(Category::Good.bounds().0, f64::NEG_INFINITY);
        assert_eq!(Category::VeryPoor.to_string(), "Very Poor");
    }
}
