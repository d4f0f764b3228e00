// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use psdl_dsl::{PulseDescription, SequenceDescription};
use psdl_units::{Duration, Seconds, is_valid_sample_rate};

use crate::error::{Error, Result};
use crate::settings::ParserSettings;

/// Slack for comparing times that went through unit conversion.
const TIME_TOLERANCE: f64 = 1e-15;

fn exceeds(time: Duration<Seconds>, limit: Duration<Seconds>) -> bool {
    time.value() > limit.value() + TIME_TOLERANCE
}

/// Check the structural invariants of a parsed sequence.
///
/// * The sequence has a name, a non-negative duration and a positive sample rate.
/// * Every pulse starts at a non-negative time on a supported channel, and top-level
///   pulses end within the sequence.
/// * Loops repeat at least once, and blocks have non-negative, ordered start and end times.
pub fn validate_sequence(description: &SequenceDescription, settings: &ParserSettings) -> Result<()> {
    if description.name.trim().is_empty() {
        return Err(Error::validation("sequence", "name must not be empty"));
    }
    let entity = || format!("sequence '{}'", description.name);
    if description.total_duration.is_negative() {
        return Err(Error::validation(
            entity(),
            format!("negative total duration {}", description.total_duration),
        ));
    }
    if !is_valid_sample_rate(description.sample_rate) {
        return Err(Error::validation(
            entity(),
            format!("sample rate must be positive, got {} Hz", description.sample_rate),
        ));
    }

    for pulse in &description.pulses {
        validate_pulse(pulse, settings)?;
        if exceeds(pulse.end(), description.total_duration) {
            return Err(Error::validation(
                format!("pulse '{}'", pulse.name),
                format!(
                    "ends at {} after the end of the sequence at {}",
                    pulse.end(),
                    description.total_duration
                ),
            ));
        }
    }

    for (index, lp) in description.loops.iter().enumerate() {
        let entity = format!("loop #{}", index + 1);
        if lp.iterations == 0 {
            return Err(Error::validation(entity, "iteration count must be positive"));
        }
        validate_block_timing(&entity, lp.start_time, lp.end_time)?;
        for pulse in &lp.pulses {
            validate_pulse(pulse, settings)?;
        }
    }

    for cond in &description.conditionals {
        let entity = format!("conditional '{}'", cond.condition);
        validate_block_timing(&entity, cond.start_time, cond.end_time)?;
        for pulse in cond.true_pulses.iter().chain(&cond.false_pulses) {
            validate_pulse(pulse, settings)?;
        }
    }
    Ok(())
}

fn validate_pulse(pulse: &PulseDescription, settings: &ParserSettings) -> Result<()> {
    let entity = || format!("pulse '{}'", pulse.name);
    if pulse.timing.is_negative() {
        return Err(Error::validation(
            entity(),
            format!("negative start time {}", pulse.timing),
        ));
    }
    if !settings.is_supported_channel(pulse.channel) {
        return Err(Error::validation(
            entity(),
            format!(
                "channel {} is outside the supported channels {}..={}",
                pulse.channel,
                settings.supported_channels.start(),
                settings.supported_channels.end()
            ),
        ));
    }
    Ok(())
}

fn validate_block_timing(entity: &str, start: Duration<Seconds>, end: Duration<Seconds>) -> Result<()> {
    if start.is_negative() {
        return Err(Error::validation(entity, format!("negative start time {start}")));
    }
    if end < start {
        return Err(Error::validation(
            entity,
            format!("end time {end} before start time {start}"),
        ));
    }
    Ok(())
}
