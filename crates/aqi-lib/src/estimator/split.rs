//! Seeded train / held-out split

use crate::error::{PipelineError, Result};
use crate::models::LabeledSample;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Default share of samples held out for evaluation
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Shuffle with `seed` and split off `test_fraction` of the samples.
///
/// The held-out part is rounded to the nearest sample count. Returns
/// `(train, held_out)`.
pub fn train_test_split(
    samples: &[LabeledSample],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<LabeledSample>, Vec<LabeledSample>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidInput(format!(
            "test fraction {} must be within (0, 1)",
            test_fraction
        )));
    }

    let mut shuffled = samples.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let test_len = (samples.len() as f64 * test_fraction).round() as usize;
    let held_out = shuffled.split_off(samples.len() - test_len);
    Ok((shuffled, held_out))
}
