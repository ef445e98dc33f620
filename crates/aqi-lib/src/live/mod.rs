//! Live reading normalization
//!
//! Turns a provider feed payload into a [`Reading`](crate::models::Reading)
//! and a reading into the feature shape the estimator expects.

mod adapter;

pub use adapter::{
    DefaultedFields, LiveDefaults, LiveReadingAdapter, POLLUTANT_PRIORITY, STATUS_OK,
};
