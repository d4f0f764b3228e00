// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit suffix of a timing expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Multiplier converting a value in this unit to seconds.
    pub const fn multiplier(self) -> f64 {
        match self {
            TimeUnit::Nanoseconds => 1e-9,
            TimeUnit::Microseconds => 1e-6,
            TimeUnit::Milliseconds => 1e-3,
            TimeUnit::Seconds => 1.0,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = UnknownUnit;

    /// Parse a unit suffix. Matching is case-insensitive and `μs` is an alias of `us`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ns" => Ok(TimeUnit::Nanoseconds),
            "us" | "μs" | "µs" => Ok(TimeUnit::Microseconds),
            "ms" => Ok(TimeUnit::Milliseconds),
            "s" => Ok(TimeUnit::Seconds),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

/// Unit suffix of a frequency expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyUnit {
    Hertz,
    Kilohertz,
    Megahertz,
    Gigahertz,
}

impl FrequencyUnit {
    /// Multiplier converting a value in this unit to Hz.
    pub const fn multiplier(self) -> f64 {
        match self {
            FrequencyUnit::Hertz => 1.0,
            FrequencyUnit::Kilohertz => 1e3,
            FrequencyUnit::Megahertz => 1e6,
            FrequencyUnit::Gigahertz => 1e9,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            FrequencyUnit::Hertz => "Hz",
            FrequencyUnit::Kilohertz => "kHz",
            FrequencyUnit::Megahertz => "MHz",
            FrequencyUnit::Gigahertz => "GHz",
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hz" => Ok(FrequencyUnit::Hertz),
            "khz" => Ok(FrequencyUnit::Kilohertz),
            "mhz" => Ok(FrequencyUnit::Megahertz),
            "ghz" => Ok(FrequencyUnit::Gigahertz),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown unit '{0}'")]
pub struct UnknownUnit(pub String);

/// The physical quantity a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Time,
    Frequency,
    Voltage,
    Dimensionless,
}

impl Dimension {
    /// Symbol of the base unit values of this dimension are stored in.
    pub const fn base_symbol(self) -> &'static str {
        match self {
            Dimension::Time => "s",
            Dimension::Frequency => "Hz",
            Dimension::Voltage => "V",
            Dimension::Dimensionless => "",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Time => "time",
            Dimension::Frequency => "frequency",
            Dimension::Voltage => "voltage",
            Dimension::Dimensionless => "dimensionless",
        };
        f.write_str(name)
    }
}

/// Unit a value was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Time(TimeUnit),
    Frequency(FrequencyUnit),
    Volts,
    None,
}

impl Unit {
    pub const fn dimension(self) -> Dimension {
        match self {
            Unit::Time(_) => Dimension::Time,
            Unit::Frequency(_) => Dimension::Frequency,
            Unit::Volts => Dimension::Voltage,
            Unit::None => Dimension::Dimensionless,
        }
    }

    /// Multiplier converting a value in this unit to its base unit.
    pub const fn multiplier(self) -> f64 {
        match self {
            Unit::Time(unit) => unit.multiplier(),
            Unit::Frequency(unit) => unit.multiplier(),
            Unit::Volts | Unit::None => 1.0,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Time(unit) => unit.symbol(),
            Unit::Frequency(unit) => unit.symbol(),
            Unit::Volts => "V",
            Unit::None => "",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A numeric value converted to the base unit of its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Value in the base unit (s, Hz, V or unitless).
    pub value: f64,
    /// Unit the value was written in.
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity {
            value: value * unit.multiplier(),
            unit,
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }
}
