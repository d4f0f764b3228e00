// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use psdl_dsl::types::{BoundField, ExtraValue, ParameterKey};
use psdl_dsl::{PulseDescription, SequenceDescription, VariableDescription};
use psdl_units::seconds;

use crate::error::{Error, Result};

/// Check that every binding refers to the scanned variable and fits the bound field.
pub(crate) fn check_bindings(
    description: &SequenceDescription,
    variable: Option<&VariableDescription>,
) -> Result<()> {
    for pulse in description.all_pulses() {
        for binding in &pulse.bindings {
            let variable = variable
                .filter(|v| v.name == binding.variable)
                .ok_or_else(|| Error::UnknownVariable {
                    pulse: pulse.name.clone(),
                    variable: binding.variable.clone(),
                })?;
            if binding.field == BoundField::Timing && pulse.fixed_timing {
                return Err(Error::FixedTimingBound {
                    pulse: pulse.name.clone(),
                });
            }
            if !binding.field.accepts(variable.dimension) {
                return Err(Error::IncompatibleBinding {
                    pulse: pulse.name.clone(),
                    field: binding.field.clone(),
                    variable: variable.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Copy of `pulse` with every bound field set to `value`, in the field's base unit.
pub(crate) fn bind_pulse(pulse: &PulseDescription, value: f64) -> PulseDescription {
    let mut bound = pulse.clone();
    for binding in &pulse.bindings {
        match &binding.field {
            BoundField::Timing => bound.timing = seconds(value),
            BoundField::Duration => bound.duration = seconds(value),
            BoundField::Amplitude => bound.amplitude = value,
            BoundField::Parameter(ParameterKey::Amplitude) => {
                bound.parameters.amplitude = Some(value)
            }
            BoundField::Parameter(ParameterKey::Phase) => {
                bound.parameters.phase_degrees = Some(value)
            }
            BoundField::Parameter(ParameterKey::Frequency) => {
                bound.parameters.frequency_hz = Some(value)
            }
            BoundField::Parameter(ParameterKey::Extra(name)) => {
                bound
                    .parameters
                    .extra
                    .insert(name.clone(), ExtraValue::Number(value));
            }
        }
    }
    bound
}
