// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use psdl_units::Dimension;
use serde::{Deserialize, Serialize};

/// Key of a `key=value` pulse parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKey {
    Amplitude,
    Phase,
    Frequency,
    Extra(String),
}

impl ParameterKey {
    pub fn from_name(name: &str) -> Self {
        match name {
            "amplitude" => ParameterKey::Amplitude,
            "phase" => ParameterKey::Phase,
            "frequency" => ParameterKey::Frequency,
            other => ParameterKey::Extra(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ParameterKey::Amplitude => "amplitude",
            ParameterKey::Phase => "phase",
            ParameterKey::Frequency => "frequency",
            ParameterKey::Extra(name) => name,
        }
    }
}

/// Pulse field whose value is taken from the scanned variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundField {
    Timing,
    Duration,
    Amplitude,
    Parameter(ParameterKey),
}

impl BoundField {
    /// Whether a variable of the given dimension can drive this field.
    pub fn accepts(&self, dimension: Dimension) -> bool {
        match self {
            BoundField::Timing | BoundField::Duration => dimension == Dimension::Time,
            BoundField::Amplitude | BoundField::Parameter(ParameterKey::Amplitude) => {
                matches!(dimension, Dimension::Voltage | Dimension::Dimensionless)
            }
            // Phases are written in degrees
            BoundField::Parameter(ParameterKey::Phase) => dimension == Dimension::Dimensionless,
            BoundField::Parameter(ParameterKey::Frequency) => {
                dimension == Dimension::Frequency
            }
            BoundField::Parameter(ParameterKey::Extra(_)) => true,
        }
    }
}

impl fmt::Display for BoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundField::Timing => f.write_str("timing"),
            BoundField::Duration => f.write_str("duration"),
            BoundField::Amplitude => f.write_str("amplitude"),
            BoundField::Parameter(key) => write!(f, "parameter '{}'", key.name()),
        }
    }
}

/// Marks a pulse field as driven by a scan variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableBinding {
    pub variable: String,
    pub field: BoundField,
}

impl VariableBinding {
    pub fn new(variable: impl Into<String>, field: BoundField) -> Self {
        Self {
            variable: variable.into(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_dimensions() {
        assert!(BoundField::Duration.accepts(Dimension::Time));
        assert!(!BoundField::Duration.accepts(Dimension::Frequency));
        assert!(BoundField::Amplitude.accepts(Dimension::Voltage));
        assert!(BoundField::Amplitude.accepts(Dimension::Dimensionless));
        assert!(!BoundField::Parameter(ParameterKey::Phase).accepts(Dimension::Time));
        assert!(BoundField::Parameter(ParameterKey::Frequency).accepts(Dimension::Frequency));
        assert!(
            BoundField::Parameter(ParameterKey::Extra("detuning".to_string()))
                .accepts(Dimension::Frequency)
        );
    }

    #[test]
    fn test_parameter_key_names() {
        assert_eq!(ParameterKey::from_name("phase"), ParameterKey::Phase);
        assert_eq!(
            ParameterKey::from_name("detuning"),
            ParameterKey::Extra("detuning".to_string())
        );
        assert_eq!(
            BoundField::Parameter(ParameterKey::from_name("detuning")).to_string(),
            "parameter 'detuning'"
        );
    }
}
