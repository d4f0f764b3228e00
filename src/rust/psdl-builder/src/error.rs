// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use psdl_dsl::types::{BoundField, Channel};
use psdl_units::{SampleOverflow, Samples};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("At most one variable can be scanned, found {}", listing(.names))]
    MultipleVariables { names: Vec<String> },
    #[error("Pulse '{pulse}' is bound to undeclared variable '{variable}'")]
    UnknownVariable { pulse: String, variable: String },
    #[error("Variable '{variable}' cannot drive the {field} of pulse '{pulse}'")]
    IncompatibleBinding {
        pulse: String,
        field: BoundField,
        variable: String,
    },
    #[error("The timing of fixed pulse '{pulse}' cannot be bound to a variable")]
    FixedTimingBound { pulse: String },
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
    #[error(
        "Timing conflict at scan index {scan_index} on channel {channel}: \
         pulse '{first}' (ends at sample {first_end}) overlaps pulse '{second}' (starts at sample {second_start})"
    )]
    TimingConflict {
        scan_index: usize,
        channel: Channel,
        first: String,
        second: String,
        first_end: Samples,
        second_start: Samples,
    },
    #[error("Pulse '{pulse}' starts before the sequence at scan index {scan_index} (at {start} s)")]
    NegativeStart {
        scan_index: usize,
        pulse: String,
        start: f64,
    },
    #[error("Pulse '{pulse}' has a negative duration at scan index {scan_index} ({duration} s)")]
    NegativeDuration {
        scan_index: usize,
        pulse: String,
        duration: f64,
    },
    #[error("Pulse '{pulse}' does not fit on the sample grid at scan index {scan_index}")]
    PulseOutOfRange {
        scan_index: usize,
        pulse: String,
        #[source]
        source: SampleOverflow,
    },
    #[error("The sequence duration does not fit on the sample grid")]
    SequenceOutOfRange(#[source] SampleOverflow),
}

fn listing(names: &[String]) -> String {
    format!("{} ({})", names.len(), names.join(", "))
}
