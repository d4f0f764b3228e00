// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod duration;
pub mod samples;
pub mod unit;

pub use duration::{Duration, Seconds, seconds};
pub use samples::{
    SampleOverflow, Samples, is_valid_sample_rate, samples_to_seconds, seconds_to_samples,
};
pub use unit::{Dimension, FrequencyUnit, Quantity, TimeUnit, Unit, UnknownUnit};
