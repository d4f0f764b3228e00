// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of a free-form pulse parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraValue::Number(v) => write!(f, "{v}"),
            ExtraValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for ExtraValue {
    fn from(value: f64) -> Self {
        ExtraValue::Number(value)
    }
}

/// Optional per-pulse overrides given as `key=value` fields on a pulse line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PulseParameters {
    /// Overrides the positional amplitude of the pulse.
    pub amplitude: Option<f64>,
    pub phase_degrees: Option<f64>,
    pub frequency_hz: Option<f64>,
    /// Keys with no dedicated field, in textual order.
    pub extra: IndexMap<String, ExtraValue>,
}

impl PulseParameters {
    pub fn is_empty(&self) -> bool {
        self.amplitude.is_none()
            && self.phase_degrees.is_none()
            && self.frequency_hz.is_none()
            && self.extra.is_empty()
    }
}
