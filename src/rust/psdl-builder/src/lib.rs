// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Expansion of a [`SequenceDescription`](psdl_dsl::SequenceDescription) into concrete,
//! sample-quantized timelines, one per value of its scanned variable.

mod bind;
pub mod error;
mod overlap;
mod scan;
pub mod settings;
mod timing_adjustment;

pub use error::{Error, Result};
pub use scan::{
    ConcreteSequence, ScanSequences, ScheduledPulse, build_scan_sequences, scan_sequences,
};
pub use settings::BuilderSettings;
