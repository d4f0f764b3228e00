// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Envelope of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseShape {
    Gaussian,
    Square,
    Sech,
    Sine,
    Lorentzian,
    Triangle,
}

impl PulseShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            PulseShape::Gaussian => "gaussian",
            PulseShape::Square => "square",
            PulseShape::Sech => "sech",
            PulseShape::Sine => "sine",
            PulseShape::Lorentzian => "lorentzian",
            PulseShape::Triangle => "triangle",
        }
    }
}

impl FromStr for PulseShape {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gaussian" => Ok(PulseShape::Gaussian),
            "square" => Ok(PulseShape::Square),
            "sech" => Ok(PulseShape::Sech),
            "sine" => Ok(PulseShape::Sine),
            "lorentzian" => Ok(PulseShape::Lorentzian),
            "triangle" => Ok(PulseShape::Triangle),
            _ => Err("expected one of gaussian, square, sech, sine, lorentzian, triangle"),
        }
    }
}

impl fmt::Display for PulseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
