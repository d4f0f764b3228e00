// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::path::Path;

use psdl_dsl::{ConditionalDescription, LoopDescription, PulseDescription, SequenceDescription};
use psdl_log::{info, warn};

use crate::blocks::{BlockHeader, collect_block};
use crate::error::{Error, Result};
use crate::header::parse_header;
use crate::line::{LineKind, SourceLine, significant_lines};
use crate::presets::PresetRegistry;
use crate::pulse_line::PulseLineParser;
use crate::settings::ParserSettings;
use crate::variable::parse_variable;

/// Parses PSDL text into a [`SequenceDescription`].
///
/// Malformed pulse lines are logged and skipped. Every other problem aborts the parse.
pub struct Parser<'a> {
    registry: &'a dyn PresetRegistry,
    settings: &'a ParserSettings,
}

#[derive(Default)]
struct ParseState {
    description: SequenceDescription,
    /// Pulses seen so far per name stem, for `pi_2_1`, `pi_2_2`, ...
    name_counters: HashMap<String, usize>,
    duration_declared: bool,
}

impl ParseState {
    fn name_pulse(&mut self, mut pulse: PulseDescription) -> PulseDescription {
        let counter = self.name_counters.entry(pulse.name.clone()).or_default();
        *counter += 1;
        pulse.name = format!("{}_{counter}", pulse.name);
        pulse
    }
}

impl<'a> Parser<'a> {
    pub fn new(registry: &'a dyn PresetRegistry, settings: &'a ParserSettings) -> Self {
        Self { registry, settings }
    }

    pub fn parse_text(&self, text: &str) -> Result<SequenceDescription> {
        let mut state = ParseState::default();
        state.description.sample_rate = self.settings.default_sample_rate;
        self.parse_into(&mut state, text, 0)?;

        let description = &mut state.description;
        if description.variables.len() > 1 {
            let names: Vec<&str> = description.variables.keys().map(String::as_str).collect();
            return Err(Error::parse(
                None,
                format!(
                    "{} scan variables declared ({}), at most one is supported; \
                     scan several variables with an external multi-dimensional scan iterator",
                    names.len(),
                    names.join(", ")
                ),
            ));
        }
        if !state.duration_declared {
            description.total_duration = description.latest_pulse_end();
        }
        info!(
            "Parsed sequence '{}': {} pulses, {} loops, {} conditionals, {} variables",
            description.name,
            description.pulses.len(),
            description.loops.len(),
            description.conditionals.len(),
            description.variables.len()
        );
        Ok(state.description)
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<SequenceDescription> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_text(&text)
    }

    fn parse_into(&self, state: &mut ParseState, text: &str, depth: usize) -> Result<()> {
        let lines = significant_lines(text);
        let mut index = 0;
        while index < lines.len() {
            let line = lines[index];
            let mut consumed = 1;
            match LineKind::classify(line.text) {
                LineKind::Header(body) => {
                    let fields = parse_header(body, line.number, &mut state.description)
                        .map_err(|e| Error::parse(Some(line.number), format!("{e:#}")))?;
                    state.duration_declared |= fields.duration;
                }
                LineKind::Variable(body) => {
                    let variable = parse_variable(body)
                        .map_err(|e| Error::parse(Some(line.number), format!("{e:#}")))?;
                    if state.description.variables.contains_key(&variable.name) {
                        return Err(Error::parse(
                            Some(line.number),
                            format!("variable '{}' is declared twice", variable.name),
                        ));
                    }
                    state
                        .description
                        .variables
                        .insert(variable.name.clone(), variable);
                }
                LineKind::Loop(_) | LineKind::Conditional(_) => {
                    let (block, block_lines) = collect_block(&lines[index..])?;
                    consumed = block_lines;
                    let body = self.parse_pulses(state, &block.body);
                    match block.header {
                        BlockHeader::Loop { iterations } => {
                            state
                                .description
                                .loops
                                .push(LoopDescription::new(iterations, body));
                        }
                        BlockHeader::Conditional { condition } => {
                            let else_body = self.parse_pulses(state, &block.else_body);
                            state.description.conditionals.push(
                                ConditionalDescription::new(condition, body, else_body),
                            );
                        }
                    }
                }
                LineKind::Preset(body) => self.load_preset(state, body, line.number, depth)?,
                // A stray `else` or `end` is a malformed pulse like any other unknown line
                LineKind::Else | LineKind::End | LineKind::Pulse(_) => {
                    if let Some(pulse) = self.parse_pulse(state, &line) {
                        state.description.pulses.push(pulse);
                    }
                }
            }
            index += consumed;
        }
        Ok(())
    }

    fn parse_pulse(&self, state: &mut ParseState, line: &SourceLine<'_>) -> Option<PulseDescription> {
        let parsed = PulseLineParser::new(&state.description.variables).parse(line.text);
        match parsed {
            Ok(pulse) => Some(state.name_pulse(pulse)),
            Err(e) => {
                warn!("Skipping malformed pulse at line {}: {:#}", line.number, e);
                None
            }
        }
    }

    fn parse_pulses(&self, state: &mut ParseState, lines: &[SourceLine<'_>]) -> Vec<PulseDescription> {
        lines
            .iter()
            .filter_map(|line| self.parse_pulse(state, line))
            .collect()
    }

    /// Splice the preset named on a `load preset: <name>[, key=value]*` line.
    fn load_preset(
        &self,
        state: &mut ParseState,
        body: &str,
        line: usize,
        depth: usize,
    ) -> Result<()> {
        let mut items = body.split(',').map(str::trim);
        let name = items.next().unwrap_or_default();
        if name.is_empty() {
            return Err(Error::parse(Some(line), "missing preset name"));
        }
        let Some(preset) = self.registry.get(name) else {
            warn!("Unknown preset '{}' at line {}, nothing loaded", name, line);
            return Ok(());
        };
        if depth >= self.settings.max_preset_depth {
            return Err(Error::parse(
                Some(line),
                format!(
                    "preset '{name}' exceeds the maximum preset nesting depth of {}",
                    self.settings.max_preset_depth
                ),
            ));
        }
        let overrides = items
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.split_once('=')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .ok_or_else(|| Error::parameter(name, format!("expected key=value, found '{item}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        let variables: Vec<&str> = state.description.variables.keys().map(String::as_str).collect();
        let text = preset.render(&overrides, &variables)?;
        self.parse_into(state, &text, depth + 1).map_err(|e| match e {
            Error::Parse { line: inner, message } => Error::parse(
                Some(line),
                match inner {
                    Some(inner) => format!("in preset '{name}' at line {inner}: {message}"),
                    None => format!("in preset '{name}': {message}"),
                },
            ),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{ParameterSchema, ParameterValue, Preset, PresetBody, PresetLibrary};
    use psdl_dsl::types::{BoundField, Channel};
    use psdl_units::seconds;

    fn parse(text: &str) -> Result<SequenceDescription> {
        let library = PresetLibrary::builtin();
        let settings = ParserSettings::default();
        Parser::new(&library, &settings).parse_text(text)
    }

    #[test]
    fn test_comment_only_input() {
        let description = parse("# nothing here\n\n   # still nothing\n").unwrap();
        assert!(description.pulses.is_empty());
        assert!(description.loops.is_empty());
        assert!(description.conditionals.is_empty());
        assert!(description.variables.is_empty());
        assert_eq!(description.total_duration, seconds(0.0));
        assert_eq!(description.sample_rate, 1e9);
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let description = parse(
            "sequence: name=test, duration=1us
             laser pulse on channel 2 at 0ns, square, 100ns, 1.0
             this line is garbage
             mw pulse on channel 1 at 200ns, gaussian, 50ns, 0.5",
        )
        .unwrap();
        assert_eq!(description.pulses.len(), 2);
        assert_eq!(description.pulses[0].name, "laser_1");
        assert_eq!(description.pulses[1].name, "mw_1");
    }

    #[test]
    fn test_pulse_names_count_per_type() {
        let description = parse(
            "pi/2 pulse on channel 1 at 0ns, gaussian, 50ns, 1.0
             pi pulse on channel 1 at 100ns, gaussian, 100ns, 1.0
             pi/2 pulse on channel 1 at 300ns, gaussian, 50ns, 1.0",
        )
        .unwrap();
        let names: Vec<&str> = description.pulses.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pi_2_1", "pi_1", "pi_2_2"]);
    }

    #[test]
    fn test_zero_and_one_variable() {
        assert!(parse("sequence: name=x").unwrap().variables.is_empty());
        let description = parse("variable tau, start=100ns, stop=500ns, steps=5").unwrap();
        assert_eq!(description.variables.len(), 1);
        assert_eq!(description.scan_variable().unwrap().name, "tau");
    }

    #[test]
    fn test_two_variables_fail() {
        let err = parse(
            "variable tau, start=100ns, stop=500ns, steps=5
             variable amp, start=0, stop=1, steps=3",
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::Parse { line: None, .. }));
        assert!(message.contains("tau"));
        assert!(message.contains("amp"));
        assert!(message.contains("multi-dimensional"));
    }

    #[test]
    fn test_duplicate_variable() {
        let err = parse(
            "variable tau, start=100ns, stop=500ns, steps=5
             variable tau, start=1ns, stop=5ns, steps=5",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse { line: Some(2), .. }));
    }

    #[test]
    fn test_variable_errors_carry_line() {
        let err = parse("\n\nvariable tau, start=1ns, stop=1V, steps=5").unwrap_err();
        assert!(matches!(err, Error::Parse { line: Some(3), .. }));
    }

    #[test]
    fn test_header_errors_are_fatal() {
        assert!(parse("sequence: repeat=0").is_err());
        assert!(parse("sequence: repeat_count=abc").is_err());
    }

    #[test]
    fn test_loops_and_conditionals() {
        let description = parse(
            "sequence: name=blocks, duration=10us
             loop: 3
               mw pulse on channel 1 at 0ns, square, 100ns, 1.0
               broken
               mw pulse on channel 1 at 100ns, square, 200ns, 1.0
             end
             if photon_detected
               laser pulse on channel 2 at 0ns, square, 1us, 1.0
             else
               laser pulse on channel 2 at 0ns, square, 500ns, 1.0
               laser pulse on channel 2 at 500ns, square, 1us, 1.0
             end
             readout pulse on channel 2 at 5us, square, 1us, 1.0",
        )
        .unwrap();
        assert_eq!(description.loops.len(), 1);
        let lp = &description.loops[0];
        assert_eq!(lp.iterations, 3);
        assert_eq!(lp.pulses.len(), 2);
        assert!((lp.end_time.value() - 300e-9).abs() < 1e-18);

        let cond = &description.conditionals[0];
        assert_eq!(cond.condition, "photon_detected");
        assert_eq!(cond.true_pulses.len(), 1);
        assert_eq!(cond.false_pulses.len(), 2);
        assert!((cond.end_time.value() - 1.5e-6).abs() < 1e-18);

        assert_eq!(description.pulses.len(), 1);
        assert_eq!(description.pulses[0].name, "readout_1");
        // counters are shared across blocks
        assert_eq!(cond.false_pulses[1].name, "laser_3");
    }

    #[test]
    fn test_block_errors() {
        let err = parse("loop: 2\n  mw pulse on channel 1 at 0ns, square, 10ns, 1.0").unwrap_err();
        assert!(matches!(err, Error::Parse { line: Some(1), .. }));
        assert!(parse("loop: 2\nloop: 3\nend\nend").is_err());
    }

    #[test]
    fn test_stray_lines_are_skipped() {
        let description = parse(
            "sequence: name=x, duration=2us
             loop: 2
             mw pulse on channel 1 at 0ns, square, 10ns, 1.0
             sequence: name=y
             load preset: rabi
             end
             readout pulse on channel 2 at 1us, square, 100ns, 1.0",
        )
        .unwrap();
        assert_eq!(description.name, "x");
        assert_eq!(description.loops[0].pulses.len(), 1);
        assert_eq!(description.pulses.len(), 1);

        let description = parse(
            "laser pulse on channel 2 at 0ns, square, 100ns, 1.0
             end
             else
             mw pulse on channel 1 at 200ns, gaussian, 50ns, 0.5",
        )
        .unwrap();
        assert_eq!(description.pulses.len(), 2);
    }

    #[test]
    fn test_derived_total_duration() {
        let description = parse(
            "a pulse on channel 1 at 0ns, square, 100ns, 1.0
             b pulse on channel 1 at 400ns, square, 100ns, 1.0",
        )
        .unwrap();
        assert!((description.total_duration.value() - 500e-9).abs() < 1e-18);
    }

    #[test]
    fn test_bound_pulse_requires_declared_variable() {
        let description = parse(
            "mw pulse on channel 1 at 0ns, square, tau, 1.0
             variable tau, start=100ns, stop=500ns, steps=5
             mw pulse on channel 1 at 0ns, square, tau, 1.0",
        )
        .unwrap();
        // the first line refers to tau before its declaration
        assert_eq!(description.pulses.len(), 1);
        assert!(description.pulses[0].binding(&BoundField::Duration).is_some());
    }

    #[test]
    fn test_builtin_preset() {
        let description = parse(
            "sequence: name=ramsey_scan
             load preset: ramsey, tau=1us, mw_channel=3",
        )
        .unwrap();
        assert_eq!(description.pulses.len(), 4);
        assert_eq!(description.pulses[1].name, "pi_2_1");
        assert_eq!(description.pulses[1].channel, Channel(3));
        assert!(description.pulses[3].fixed_timing);
    }

    #[test]
    fn test_preset_bound_to_variable() {
        let description = parse(
            "variable length, start=20ns, stop=200ns, steps=10
             load preset: rabi, pulse_length=length",
        )
        .unwrap();
        let mw = &description.pulses[1];
        assert_eq!(mw.name, "mw_1");
        assert_eq!(mw.duration, seconds(20e-9));
        assert!(mw.binding(&BoundField::Duration).is_some());
    }

    #[test]
    fn test_preset_errors() {
        // unknown presets are skipped
        assert!(parse("load preset: does_not_exist").unwrap().pulses.is_empty());
        assert!(matches!(
            parse("load preset: rabi, colour=red"),
            Err(Error::Parameter { .. })
        ));
        assert!(matches!(
            parse("load preset: rabi, pulse_length"),
            Err(Error::Parameter { .. })
        ));
    }

    #[test]
    fn test_preset_nesting_is_bounded() {
        let mut library = PresetLibrary::new();
        library.insert(Preset::new(
            "recursive",
            vec![ParameterSchema::new("channel", ParameterValue::Integer(1))],
            PresetBody::Template("load preset: recursive".to_string()),
        ));
        let settings = ParserSettings::default();
        let err = Parser::new(&library, &settings)
            .parse_text("load preset: recursive")
            .unwrap_err();
        assert!(matches!(err, Error::Parse { line: Some(1), .. }));
        assert!(err.to_string().contains("nesting depth"));
    }

    #[test]
    fn test_default_sample_rate_from_settings() {
        let library = PresetLibrary::new();
        let settings = ParserSettings {
            default_sample_rate: 2.4e9,
            ..Default::default()
        };
        let parser = Parser::new(&library, &settings);
        assert_eq!(parser.parse_text("").unwrap().sample_rate, 2.4e9);
        assert_eq!(
            parser.parse_text("sequence: sample_rate=1GHz").unwrap().sample_rate,
            1e9
        );
    }

    #[test]
    fn test_missing_file() {
        let library = PresetLibrary::new();
        let settings = ParserSettings::default();
        let err = Parser::new(&library, &settings)
            .parse_file("/nonexistent/sequence.psdl")
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
