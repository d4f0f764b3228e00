// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use psdl_dsl::{PulseDescription, SequenceDescription, VariableDescription, VariableValues};
use psdl_log::{diagnostic, warn};
use psdl_units::{
    SampleOverflow, Samples, is_valid_sample_rate, samples_to_seconds, seconds_to_samples,
};
use serde::Serialize;

use crate::bind::{bind_pulse, check_bindings};
use crate::error::{Error, Result};
use crate::overlap::check_overlaps;
use crate::settings::BuilderSettings;
use crate::timing_adjustment::adjust_timing;

/// A pulse placed on the sample grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledPulse {
    pub start_sample: Samples,
    pub duration_samples: Samples,
    /// The pulse with bound fields and adjusted timing.
    pub pulse: PulseDescription,
}

impl ScheduledPulse {
    /// First sample after the pulse, `None` if it is past the representable range.
    pub fn end_sample(&self) -> Option<Samples> {
        self.start_sample.checked_add(self.duration_samples)
    }
}

/// The timeline of a single scan point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcreteSequence {
    pub scan_index: usize,
    /// Value of the scanned variable, `None` when nothing is scanned.
    pub variable_value: Option<f64>,
    /// Length of the sequence in samples.
    pub length: Samples,
    /// Pulses ordered by start sample.
    pub pulses: Vec<ScheduledPulse>,
}

impl ConcreteSequence {
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }
}

/// Lazily builds one [`ConcreteSequence`] per scan point.
pub struct ScanSequences<'a> {
    description: &'a SequenceDescription,
    settings: BuilderSettings,
    length: Samples,
    values: Option<VariableValues>,
    /// Set once the single point of an unscanned description was produced.
    exhausted: bool,
}

impl ScanSequences<'_> {
    fn build_point(&self, scan_index: usize, value: Option<f64>) -> Result<ConcreteSequence> {
        let description = self.description;
        let sample_rate = description.sample_rate;
        let bind = |pulse: &PulseDescription| match value {
            Some(value) => bind_pulse(pulse, value),
            None => pulse.clone(),
        };

        let mut pulses: Vec<PulseDescription> = description.pulses.iter().map(&bind).collect();
        adjust_timing(&description.pulses, &mut pulses);

        let mut scheduled = pulses
            .into_iter()
            .map(|pulse| schedule(pulse, sample_rate, scan_index))
            .collect::<Result<Vec<_>>>()?;
        if self.settings.unroll_loops {
            for lp in &description.loops {
                let period = lp.period();
                for iteration in 0..lp.iterations {
                    let offset = period * f64::from(iteration);
                    for pulse in &lp.pulses {
                        let mut pulse = bind(pulse);
                        pulse.timing += offset;
                        scheduled.push(schedule(pulse, sample_rate, scan_index)?);
                    }
                }
            }
        }
        check_overlaps(&scheduled, scan_index)?;
        scheduled.sort_by_key(|p| (p.start_sample, p.pulse.channel));

        let length = self.length;
        for (pulse, end) in scheduled
            .iter()
            .filter_map(|p| p.end_sample().map(|end| (p, end)))
            .filter(|&(_, end)| end > length)
        {
            warn!(
                "Pulse '{}' ends at {} after the end of the sequence at {} (scan index {})",
                pulse.pulse.name,
                samples_to_seconds(end, sample_rate),
                samples_to_seconds(length, sample_rate),
                scan_index
            );
        }
        diagnostic!(
            "Scan point {}: value {:?}, {} pulses, {} samples",
            scan_index,
            value,
            scheduled.len(),
            length
        );
        Ok(ConcreteSequence {
            scan_index,
            variable_value: value,
            length,
            pulses: scheduled,
        })
    }
}

fn schedule(pulse: PulseDescription, sample_rate: f64, scan_index: usize) -> Result<ScheduledPulse> {
    if pulse.timing.is_negative() {
        return Err(Error::NegativeStart {
            scan_index,
            pulse: pulse.name,
            start: pulse.timing.value(),
        });
    }
    if pulse.duration.is_negative() {
        return Err(Error::NegativeDuration {
            scan_index,
            pulse: pulse.name,
            duration: pulse.duration.value(),
        });
    }
    let out_of_range = |source: SampleOverflow| Error::PulseOutOfRange {
        scan_index,
        pulse: pulse.name.clone(),
        source,
    };
    let start_sample = seconds_to_samples(pulse.timing, sample_rate).map_err(&out_of_range)?;
    let duration_samples = seconds_to_samples(pulse.duration, sample_rate).map_err(&out_of_range)?;
    if start_sample.checked_add(duration_samples).is_none() {
        return Err(out_of_range(SampleOverflow {
            seconds: pulse.end().value(),
            sample_rate,
        }));
    }
    Ok(ScheduledPulse {
        start_sample,
        duration_samples,
        pulse,
    })
}

impl Iterator for ScanSequences<'_> {
    type Item = Result<ConcreteSequence>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.values {
            Some(values) => {
                let scan_index = values.current_index();
                let value = values.next()?;
                Some(self.build_point(scan_index, Some(value)))
            }
            None if self.exhausted => None,
            None => {
                self.exhausted = true;
                Some(self.build_point(0, None))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.values {
            Some(values) => values.len(),
            None => usize::from(!self.exhausted),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScanSequences<'_> {}

/// Prepare the lazy expansion of `description` into one sequence per scan point.
///
/// The description is checked up front: it needs a usable sample rate and a length that fits
/// on the sample grid, and must have at most one variable with bindings that fit it.
pub fn scan_sequences<'a>(
    description: &'a SequenceDescription,
    settings: &BuilderSettings,
) -> Result<ScanSequences<'a>> {
    if !is_valid_sample_rate(description.sample_rate) {
        return Err(Error::InvalidSampleRate(description.sample_rate));
    }
    if description.variables.len() > 1 {
        return Err(Error::MultipleVariables {
            names: description.variables.keys().cloned().collect(),
        });
    }
    let variable = description.variables.values().next();
    check_bindings(description, variable)?;
    let length = seconds_to_samples(description.total_duration, description.sample_rate)
        .map_err(Error::SequenceOutOfRange)?;
    Ok(ScanSequences {
        description,
        settings: settings.clone(),
        length,
        values: variable.map(VariableDescription::values),
        exhausted: false,
    })
}

/// Build the sequences of all scan points, stopping at the first error.
pub fn build_scan_sequences(description: &SequenceDescription) -> Result<Vec<ConcreteSequence>> {
    scan_sequences(description, &BuilderSettings::default())?.collect()
}
