// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::duration::{Duration, Seconds, seconds};

/// Number of samples at a given sampling rate.
pub type Samples = i64;

/// A time that does not fit on the sample grid.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("{seconds} s is out of the sample range at {sample_rate} Hz")]
pub struct SampleOverflow {
    pub seconds: f64,
    pub sample_rate: f64,
}

/// Whether the rate can be used to quantize a timeline.
pub fn is_valid_sample_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0 && !rate.is_subnormal()
}

/// Convert a duration to the nearest whole number of samples.
///
/// Halfway cases round away from zero. Times whose sample count is not representable
/// as [`Samples`] are rejected.
pub fn seconds_to_samples(
    duration: Duration<Seconds>,
    sample_rate: f64,
) -> Result<Samples, SampleOverflow> {
    let samples = (duration.value() * sample_rate).round();
    // `Samples::MAX as f64` rounds up to 2^63, which is already out of range
    if samples.is_finite() && samples >= Samples::MIN as f64 && samples < Samples::MAX as f64 {
        Ok(samples as Samples)
    } else {
        Err(SampleOverflow {
            seconds: duration.value(),
            sample_rate,
        })
    }
}

pub fn samples_to_seconds(samples: Samples, sample_rate: f64) -> Duration<Seconds> {
    seconds(samples as f64 / sample_rate)
}
