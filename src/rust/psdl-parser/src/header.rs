// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use anyhow::{anyhow, bail};
use psdl_dsl::SequenceDescription;
use psdl_log::warn;
use psdl_units::{Dimension, is_valid_sample_rate};

use crate::expressions::{parse_timing, parse_value_with_unit};

/// Header keys that were present on a `sequence:` line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderFields {
    pub duration: bool,
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Apply the comma separated `key=value` pairs of a header line.
pub(crate) fn parse_header(
    body: &str,
    line: usize,
    description: &mut SequenceDescription,
) -> anyhow::Result<HeaderFields> {
    let mut fields = HeaderFields::default();
    for item in body.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, found '{item}'"))?;
        let (key, value) = (key.trim(), unquote(value.trim()));
        match key {
            "name" => description.name = value.to_string(),
            "type" => description.experiment_type = value.to_string(),
            "duration" => {
                description.total_duration = parse_timing(value)?;
                fields.duration = true;
            }
            "sample_rate" => description.sample_rate = parse_sample_rate(value)?,
            "repeat" | "repeat_count" => description.repeat_count = parse_repeat_count(value)?,
            _ => warn!("Ignoring unknown header key '{}' at line {}", key, line),
        }
    }
    Ok(fields)
}

fn parse_sample_rate(value: &str) -> anyhow::Result<f64> {
    let quantity = parse_value_with_unit(value)?;
    if !matches!(
        quantity.dimension(),
        Dimension::Frequency | Dimension::Dimensionless
    ) {
        bail!("sample rate '{value}' is not a frequency");
    }
    if !is_valid_sample_rate(quantity.value) {
        bail!("sample rate must be positive, got '{value}'");
    }
    Ok(quantity.value)
}

fn parse_repeat_count(value: &str) -> anyhow::Result<u32> {
    match value.parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => bail!("repeat count must be an integer >= 1, got '{value}'"),
    }
}
