// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Pulse line grammar:
//!
//! `<type> pulse on channel <N> at <time>, <shape>, <duration>, <amplitude>[, key=value]* [fixed]`
//!
//! Any of `<time>`, `<duration>`, `<amplitude>` and the values of `key=value` fields
//! may name a previously declared variable instead of a literal.

use std::sync::LazyLock;

use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use psdl_dsl::builders::PulseDescriptionBuilder;
use psdl_dsl::types::{
    BoundField, Channel, ExtraValue, ParameterKey, PulseParameters, PulseShape, VariableBinding,
};
use psdl_dsl::{PulseDescription, VariableDescription};
use psdl_units::{Duration, Seconds, seconds};
use regex::Regex;

use crate::expressions::{
    is_identifier, parse_amplitude, parse_frequency, parse_number, parse_phase, parse_timing,
};

static FIXED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*fixed\s*\]").expect("valid fixed marker regex"));
static TARGET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s+pulse\s+on\s+channel\s+(\d+)\s+at\s+(\S+)$")
        .expect("valid pulse target regex")
});

/// Remove every `[fixed]` marker, returning the remaining text and whether one was present.
fn strip_fixed(text: &str) -> (String, bool) {
    let fixed = FIXED_REGEX.is_match(text);
    (FIXED_REGEX.replace_all(text, "").into_owned(), fixed)
}

pub(crate) struct PulseLineParser<'a> {
    variables: &'a IndexMap<String, VariableDescription>,
}

impl<'a> PulseLineParser<'a> {
    pub fn new(variables: &'a IndexMap<String, VariableDescription>) -> Self {
        Self { variables }
    }

    /// Parse a pulse line. The pulse is named after its type, without a counter.
    pub fn parse(&self, text: &str) -> anyhow::Result<PulseDescription> {
        let (text, fixed) = strip_fixed(text);
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        if fields.len() < 4 {
            bail!(
                "expected at least 4 comma separated fields, found {}",
                fields.len()
            );
        }
        let mut bindings = Vec::new();

        let captures = TARGET_REGEX.captures(fields[0]).ok_or_else(|| {
            anyhow!(
                "expected '<type> pulse on channel <N> at <time>', found '{}'",
                fields[0]
            )
        })?;
        let pulse_type = captures[1].trim();
        let channel: u16 = captures[2]
            .parse()
            .map_err(|_| anyhow!("invalid channel '{}'", &captures[2]))?;
        let timing = match self.bind(&captures[3], BoundField::Timing, &mut bindings)? {
            Some(_) if fixed => bail!("the timing of a fixed pulse cannot be bound to a variable"),
            Some(value) => seconds(value),
            None => parse_timing(&captures[3])?,
        };

        let shape: PulseShape = fields[1]
            .parse()
            .map_err(|e| anyhow!("invalid shape '{}': {e}", fields[1]))?;

        let duration: Duration<Seconds> =
            match self.bind(fields[2], BoundField::Duration, &mut bindings)? {
                Some(value) => seconds(value),
                None => parse_timing(fields[2])?,
            };
        if duration.is_negative() {
            bail!("negative duration '{}'", fields[2]);
        }

        let amplitude = match self.bind(fields[3], BoundField::Amplitude, &mut bindings)? {
            Some(value) => value,
            None => parse_amplitude(fields[3])?,
        };

        let mut parameters = PulseParameters::default();
        for item in &fields[4..] {
            self.parse_parameter(item, &mut parameters, &mut bindings)?;
        }

        let mut builder = PulseDescriptionBuilder::new(pulse_type, Channel(channel), timing, duration)
            .shape(shape)
            .amplitude(amplitude)
            .parameters(parameters);
        if fixed {
            builder = builder.fixed();
        }
        for binding in bindings {
            builder = builder.bind(binding.field, binding.variable);
        }
        Ok(builder.build())
    }

    fn parse_parameter(
        &self,
        item: &str,
        parameters: &mut PulseParameters,
        bindings: &mut Vec<VariableBinding>,
    ) -> anyhow::Result<()> {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, found '{item}'"))?;
        let (key, value) = (ParameterKey::from_name(key.trim()), value.trim());
        let bound = self.bind(value, BoundField::Parameter(key.clone()), bindings)?;
        match key {
            ParameterKey::Amplitude => {
                parameters.amplitude = Some(match bound {
                    Some(v) => v,
                    None => parse_amplitude(value)?,
                });
            }
            ParameterKey::Phase => {
                parameters.phase_degrees = Some(match bound {
                    Some(v) => v,
                    None => parse_phase(value)?,
                });
            }
            ParameterKey::Frequency => {
                parameters.frequency_hz = Some(match bound {
                    Some(v) => v,
                    None => parse_frequency(value)?,
                });
            }
            ParameterKey::Extra(name) => {
                let value = match bound.or_else(|| parse_number(value)) {
                    Some(v) => ExtraValue::Number(v),
                    None => ExtraValue::Text(value.to_string()),
                };
                parameters.extra.insert(name, value);
            }
        }
        Ok(())
    }

    /// Bind `field` if `text` names a declared variable, returning the nominal value.
    fn bind(
        &self,
        text: &str,
        field: BoundField,
        bindings: &mut Vec<VariableBinding>,
    ) -> anyhow::Result<Option<f64>> {
        if !is_identifier(text) {
            return Ok(None);
        }
        let Some(variable) = self.variables.get(text) else {
            return Ok(None);
        };
        if !field.accepts(variable.dimension) {
            bail!(
                "variable '{}' of dimension {} cannot drive the {field}",
                variable.name,
                variable.dimension
            );
        }
        bindings.push(VariableBinding::new(&variable.name, field));
        Ok(Some(variable.start_value))
    }
}
