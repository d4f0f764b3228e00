// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Parser for PSDL, a line oriented, declarative language describing pulse sequences.
//!
//! ```text
//! sequence: name=ramsey, duration=5us, sample_rate=1GHz
//! variable tau, start=100ns, stop=1000ns, steps=10
//! laser pulse on channel 2 at 0ns, square, 1us, 1.0
//! pi/2 pulse on channel 1 at 1.5us, gaussian, 50ns, 1.0
//! pi/2 pulse on channel 1 at 2us, gaussian, 50ns, 1.0, phase=90deg
//! readout pulse on channel 2 at 4us, square, 1us, 1.0 [fixed]
//! ```

mod blocks;
pub mod error;
pub mod expressions;
mod header;
mod line;
mod parser;
pub mod presets;
mod pulse_line;
pub mod settings;
mod validation;
mod variable;

use std::path::Path;

use psdl_dsl::SequenceDescription;

pub use error::{Error, Result};
pub use parser::Parser;
pub use presets::{PresetLibrary, PresetRegistry};
pub use settings::ParserSettings;
pub use validation::validate_sequence;

/// Parse PSDL text with the built-in presets and default settings.
pub fn parse_text(text: &str) -> Result<SequenceDescription> {
    let library = PresetLibrary::builtin();
    let settings = ParserSettings::default();
    Parser::new(&library, &settings).parse_text(text)
}

/// Read and parse a PSDL file with the built-in presets and default settings.
pub fn parse_file(path: impl AsRef<Path>) -> Result<SequenceDescription> {
    let library = PresetLibrary::builtin();
    let settings = ParserSettings::default();
    Parser::new(&library, &settings).parse_file(path)
}
