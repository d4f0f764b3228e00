// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use psdl_units::{Duration, Seconds, seconds};
use serde::{Deserialize, Serialize};

use crate::types::{BoundField, Channel, PulseParameters, PulseShape, VariableBinding};
use crate::variable::VariableDescription;

/// Default sample rate of a sequence without an explicit `sample_rate` header (1 GS/s).
pub const DEFAULT_SAMPLE_RATE: f64 = 1e9;

/// One instruction on one output channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseDescription {
    pub name: String,
    pub pulse_type: String,
    pub channel: Channel,
    pub shape: PulseShape,
    pub duration: Duration<Seconds>,
    pub amplitude: f64,
    /// Absolute start time as written in the text.
    pub timing: Duration<Seconds>,
    pub parameters: PulseParameters,
    /// The start time of a fixed pulse is never moved when building scan sequences.
    pub fixed_timing: bool,
    pub bindings: Vec<VariableBinding>,
}

impl PulseDescription {
    pub fn end(&self) -> Duration<Seconds> {
        self.timing + self.duration
    }

    pub fn binding(&self, field: &BoundField) -> Option<&VariableBinding> {
        self.bindings.iter().find(|b| &b.field == field)
    }

    pub fn is_bound(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Amplitude the pulse is played with, taking the `amplitude=` override into account.
    pub fn effective_amplitude(&self) -> f64 {
        self.parameters.amplitude.unwrap_or(self.amplitude)
    }
}

fn total_duration(pulses: &[PulseDescription]) -> Duration<Seconds> {
    pulses.iter().map(|p| p.duration).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopDescription {
    pub iterations: u32,
    pub start_time: Duration<Seconds>,
    /// Sum of the durations of the contained pulses.
    pub end_time: Duration<Seconds>,
    pub pulses: Vec<PulseDescription>,
}

impl LoopDescription {
    pub fn new(iterations: u32, pulses: Vec<PulseDescription>) -> Self {
        Self {
            iterations,
            start_time: seconds(0.0),
            end_time: total_duration(&pulses),
            pulses,
        }
    }

    /// Length of one iteration.
    pub fn period(&self) -> Duration<Seconds> {
        self.end_time - self.start_time
    }
}

/// Branching block. The condition is an opaque marker evaluated by the hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalDescription {
    pub condition: String,
    pub true_pulses: Vec<PulseDescription>,
    pub false_pulses: Vec<PulseDescription>,
    pub start_time: Duration<Seconds>,
    /// Length of the longer branch.
    pub end_time: Duration<Seconds>,
}

impl ConditionalDescription {
    pub fn new(
        condition: impl Into<String>,
        true_pulses: Vec<PulseDescription>,
        false_pulses: Vec<PulseDescription>,
    ) -> Self {
        let end_time = total_duration(&true_pulses).max(total_duration(&false_pulses));
        Self {
            condition: condition.into(),
            true_pulses,
            false_pulses,
            start_time: seconds(0.0),
            end_time,
        }
    }
}

/// A parsed, unexpanded pulse sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDescription {
    pub name: String,
    pub experiment_type: String,
    pub total_duration: Duration<Seconds>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Number of averages; not a timeline loop.
    pub repeat_count: u32,
    /// Pulses in textual order.
    pub pulses: Vec<PulseDescription>,
    pub loops: Vec<LoopDescription>,
    pub conditionals: Vec<ConditionalDescription>,
    pub variables: IndexMap<String, VariableDescription>,
}

impl Default for SequenceDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            experiment_type: String::new(),
            total_duration: seconds(0.0),
            sample_rate: DEFAULT_SAMPLE_RATE,
            repeat_count: 1,
            pulses: Vec::new(),
            loops: Vec::new(),
            conditionals: Vec::new(),
            variables: IndexMap::new(),
        }
    }
}

impl SequenceDescription {
    /// The scanned variable, if exactly one is declared.
    pub fn scan_variable(&self) -> Option<&VariableDescription> {
        if self.variables.len() == 1 {
            self.variables.values().next()
        } else {
            None
        }
    }

    /// All pulses of the description, including loop bodies and both branches of conditionals.
    pub fn all_pulses(&self) -> impl Iterator<Item = &PulseDescription> {
        self.pulses
            .iter()
            .chain(self.loops.iter().flat_map(|l| l.pulses.iter()))
            .chain(self.conditionals.iter().flat_map(|c| {
                c.true_pulses.iter().chain(c.false_pulses.iter())
            }))
    }

    /// Latest end time among all pulses, zero if there are none.
    pub fn latest_pulse_end(&self) -> Duration<Seconds> {
        self.all_pulses()
            .map(PulseDescription::end)
            .fold(seconds(0.0), Duration::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::PulseDescriptionBuilder;

    fn pulse(timing: f64, duration: f64) -> PulseDescription {
        PulseDescriptionBuilder::new("wait", Channel(1), seconds(timing), seconds(duration)).build()
    }

    #[test]
    fn test_loop_end_time_is_sum_of_durations() {
        let lp = LoopDescription::new(3, vec![pulse(0.0, 1e-7), pulse(1e-7, 2e-7)]);
        assert_eq!(lp.start_time, seconds(0.0));
        assert!((lp.end_time.value() - 3e-7).abs() < 1e-18);
        assert_eq!(lp.period(), lp.end_time);
    }

    #[test]
    fn test_conditional_end_time_is_longest_branch() {
        let cond = ConditionalDescription::new(
            "photon_detected",
            vec![pulse(0.0, 1e-7)],
            vec![pulse(0.0, 1e-7), pulse(1e-7, 1e-7)],
        );
        assert_eq!(cond.end_time, seconds(2e-7));

        let empty = ConditionalDescription::new("x", vec![], vec![]);
        assert_eq!(empty.end_time, seconds(0.0));
    }

    #[test]
    fn test_latest_pulse_end() {
        let mut description = SequenceDescription::default();
        assert_eq!(description.latest_pulse_end(), seconds(0.0));
        description.pulses.push(pulse(0.0, 1e-7));
        description
            .loops
            .push(LoopDescription::new(2, vec![pulse(5e-7, 1e-7)]));
        assert_eq!(description.latest_pulse_end(), seconds(5e-7) + seconds(1e-7));
    }
}
