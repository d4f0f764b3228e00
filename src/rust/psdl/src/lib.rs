// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Pulse Sequence Description Language.
//!
//! Text is parsed into a [`SequenceDescription`], which is then expanded into one
//! [`ConcreteSequence`] per point of its scanned variable:
//!
//! ```
//! let description = psdl::parse_text(
//!     "sequence: name=demo, duration=1us
//!      variable tau, start=100ns, stop=300ns, steps=3
//!      mw pulse on channel 1 at 0ns, square, tau, 1.0
//!      readout pulse on channel 2 at 500ns, square, 200ns, 1.0 [fixed]",
//! )?;
//! let sequences = psdl::build_scan_sequences(&description)?;
//! assert_eq!(sequences.len(), 3);
//! assert_eq!(sequences[2].pulses[0].duration_samples, 300);
//! # Ok::<(), psdl::Error>(())
//! ```

pub mod error;

use std::path::Path;

pub use error::{Error, Result, create_error_message};
pub use psdl_builder::{BuilderSettings, ConcreteSequence, ScanSequences, ScheduledPulse};
pub use psdl_dsl::types::{Channel, PulseShape};
pub use psdl_dsl::{
    ConditionalDescription, LoopDescription, PulseDescription, SequenceDescription,
    VariableDescription,
};
pub use psdl_log::init_logging;
pub use psdl_parser::presets::{
    ParameterKind, ParameterSchema, ParameterValue, Preset, PresetBody,
};
pub use psdl_parser::{Parser, ParserSettings, PresetLibrary, PresetRegistry};
pub use psdl_units::{Duration, Samples, Seconds, seconds};

/// Parse PSDL text with the built-in presets.
pub fn parse_text(text: &str) -> Result<SequenceDescription> {
    Ok(psdl_parser::parse_text(text)?)
}

/// Read and parse a PSDL file with the built-in presets.
pub fn parse_file(path: impl AsRef<Path>) -> Result<SequenceDescription> {
    Ok(psdl_parser::parse_file(path)?)
}

/// Check the structural invariants of a parsed sequence against default parser settings.
pub fn validate_sequence(description: &SequenceDescription) -> Result<()> {
    Ok(psdl_parser::validate_sequence(
        description,
        &ParserSettings::default(),
    )?)
}

/// Expand a description into one concrete sequence per scan point.
pub fn build_scan_sequences(description: &SequenceDescription) -> Result<Vec<ConcreteSequence>> {
    Ok(psdl_builder::build_scan_sequences(description)?)
}

/// Lazy variant of [`build_scan_sequences`].
pub fn scan_sequences<'a>(
    description: &'a SequenceDescription,
    settings: &BuilderSettings,
) -> Result<ScanSequences<'a>> {
    Ok(psdl_builder::scan_sequences(description, settings)?)
}
