//! Fit failure accounting
//!
//! Kept in its own test binary so no other test touches the process-wide
//! counters while these run.

use aqi_lib::source::{SyntheticSource, TabularSource};
use aqi_lib::{ErrorKind, ModelState, PipelineMetrics, SplitConfig};

fn untrained_code(state: &ModelState) -> ErrorKind {
    match state {
        ModelState::Untrained { reason } => reason.code,
        ModelState::Trained(_) => panic!("expected untrained state"),
    }
}

#[test]
fn test_only_failed_fits_are_counted() {
    let metrics = PipelineMetrics::new();
    let split = SplitConfig::default();

    let before = metrics.fit_failures_total();
    let missing = TabularSource::new("/nonexistent/a.csv", "/nonexistent/b.csv");
    let state = ModelState::from_source(&missing, &split);
    assert_eq!(untrained_code(&state), ErrorKind::DataUnavailable);
    assert_eq!(metrics.fit_failures_total(), before, "no fit was attempted");

    let bad_split = SplitConfig {
        test_fraction: 1.5,
        ..split
    };
    let state = ModelState::from_source(&SyntheticSource::new(1, 50), &bad_split);
    assert_eq!(untrained_code(&state), ErrorKind::InvalidInput);
    assert_eq!(metrics.fit_failures_total(), before);

    let state = ModelState::from_source(&SyntheticSource::new(1, 1), &split);
    assert_eq!(untrained_code(&state), ErrorKind::InsufficientData);
    assert_eq!(metrics.fit_failures_total(), before + 1);

    let fits = metrics.fits_total();
    let state = ModelState::from_source(&SyntheticSource::new(1, 100), &split);
    assert!(state.model().is_some());
    assert_eq!(metrics.fits_total(), fits + 1);
    assert_eq!(metrics.fit_failures_total(), before + 1);
}
