// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use anyhow::{anyhow, bail};
use psdl_dsl::VariableDescription;

use crate::expressions::{is_identifier, parse_value_with_unit};

fn field<'a>(text: &'a str, key: &str) -> anyhow::Result<&'a str> {
    let (found, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected {key}=<value>, found '{text}'"))?;
    if found.trim() != key {
        bail!("expected '{key}', found '{}'", found.trim());
    }
    Ok(value.trim())
}

/// Parse `<name>, start=<v>, stop=<v>, steps=<int>`, the part of a variable line after the keyword.
pub(crate) fn parse_variable(body: &str) -> anyhow::Result<VariableDescription> {
    let fields: Vec<&str> = body.split(',').map(str::trim).collect();
    let [name, start, stop, steps] = fields.as_slice() else {
        bail!(
            "expected 'variable <name>, start=<v>, stop=<v>, steps=<n>', found {} fields",
            fields.len()
        );
    };
    if !is_identifier(name) {
        bail!("invalid variable name '{name}'");
    }
    let start = parse_value_with_unit(field(start, "start")?)?;
    let stop = parse_value_with_unit(field(stop, "stop")?)?;
    if start.unit != stop.unit {
        bail!(
            "start ({}) and stop ({}) of variable '{name}' have different units",
            start.unit,
            stop.unit
        );
    }
    let steps_text = field(steps, "steps")?;
    let steps = match steps_text.parse::<u32>() {
        Ok(steps) if steps >= 1 => steps,
        _ => bail!("steps of variable '{name}' must be an integer >= 1, got '{steps_text}'"),
    };
    Ok(VariableDescription::new(
        *name,
        start.value,
        stop.value,
        steps,
        start.dimension(),
    ))
}
