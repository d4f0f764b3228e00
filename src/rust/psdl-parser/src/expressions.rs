// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Grammars of the scalar expressions used throughout PSDL.
//!
//! Values are returned in base units: seconds, Hz, volts or unitless.

use std::sync::LazyLock;

use anyhow::{Context, anyhow, bail};
use psdl_units::{Duration, FrequencyUnit, Quantity, Seconds, TimeUnit, Unit, seconds};
use regex::Regex;

const NUMBER: &str = r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?";

fn suffixed(units: &str) -> Regex {
    let pattern = format!(r"(?i)^({NUMBER})\s*({units})$");
    Regex::new(&pattern).expect("valid expression regex")
}

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{NUMBER}$")).expect("valid number regex"));
static TIMING_REGEX: LazyLock<Regex> = LazyLock::new(|| suffixed("ns|us|μs|µs|ms|s"));
static VOLTAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| suffixed("v"));
static FREQUENCY_REGEX: LazyLock<Regex> = LazyLock::new(|| suffixed("hz|khz|mhz|ghz"));
static PHASE_REGEX: LazyLock<Regex> = LazyLock::new(|| suffixed("deg|rad"));
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Parse a plain decimal or scientific number.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if !NUMBER_REGEX.is_match(text) {
        return None;
    }
    text.parse().ok()
}

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER_REGEX.is_match(text.trim())
}

fn split_suffixed<'t>(regex: &Regex, text: &'t str) -> Option<(f64, &'t str)> {
    let captures = regex.captures(text.trim())?;
    let value = captures.get(1)?.as_str().parse().ok()?;
    Some((value, captures.get(2)?.as_str()))
}

/// Parse `<float><unit>` with a time unit (`ns`, `us`/`μs`, `ms`, `s`) into seconds.
pub fn parse_timing(text: &str) -> anyhow::Result<Duration<Seconds>> {
    let (value, unit) = split_suffixed(&TIMING_REGEX, text)
        .ok_or_else(|| anyhow!("invalid timing expression '{}'", text.trim()))?;
    let unit: TimeUnit = unit.parse()?;
    Ok(seconds(value * unit.multiplier()))
}

/// Parse a value that may carry a time, voltage or frequency unit.
///
/// Alternatives are tried in that order, a bare number is dimensionless.
pub fn parse_value_with_unit(text: &str) -> anyhow::Result<Quantity> {
    if let Some((value, unit)) = split_suffixed(&TIMING_REGEX, text) {
        return Ok(Quantity::new(value, Unit::Time(unit.parse()?)));
    }
    if let Some((value, _)) = split_suffixed(&VOLTAGE_REGEX, text) {
        return Ok(Quantity::new(value, Unit::Volts));
    }
    if let Some((value, unit)) = split_suffixed(&FREQUENCY_REGEX, text) {
        let unit: FrequencyUnit = unit.parse()?;
        return Ok(Quantity::new(value, Unit::Frequency(unit)));
    }
    parse_number(text)
        .map(|value| Quantity::new(value, Unit::None))
        .ok_or_else(|| anyhow!("invalid value '{}'", text.trim()))
}

/// Parse a frequency with unit suffix into Hz.
pub fn parse_frequency(text: &str) -> anyhow::Result<f64> {
    let (value, unit) = split_suffixed(&FREQUENCY_REGEX, text)
        .ok_or_else(|| anyhow!("invalid frequency '{}'", text.trim()))?;
    let unit: FrequencyUnit = unit.parse()?;
    Ok(value * unit.multiplier())
}

/// Parse a phase into degrees. `rad` values are converted, bare numbers are degrees.
pub fn parse_phase(text: &str) -> anyhow::Result<f64> {
    if let Some((value, unit)) = split_suffixed(&PHASE_REGEX, text) {
        return Ok(if unit.eq_ignore_ascii_case("rad") {
            value.to_degrees()
        } else {
            value
        });
    }
    parse_number(text).with_context(|| format!("invalid phase '{}'", text.trim()))
}

/// Parse an amplitude, either bare or in volts.
pub fn parse_amplitude(text: &str) -> anyhow::Result<f64> {
    let quantity = parse_value_with_unit(text)?;
    match quantity.unit {
        Unit::None | Unit::Volts => Ok(quantity.value),
        unit => bail!("amplitude '{}' has unit {unit}", text.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use psdl_units::Dimension;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-12 * a.abs().max(b.abs()), "{a} != {b}");
    }

    #[test]
    fn test_timing_units() {
        assert_close(parse_timing("100ns").unwrap().value(), 1e-7);
        assert_close(parse_timing("0.1us").unwrap().value(), 1e-7);
        assert_close(parse_timing("0.1μs").unwrap().value(), 1e-7);
        assert_close(parse_timing("2.5 MS").unwrap().value(), 2.5e-3);
        assert_close(parse_timing("1e-6s").unwrap().value(), 1e-6);
        assert_eq!(parse_timing("0ns").unwrap(), seconds(0.0));
    }

    #[test]
    fn test_100ns_equals_0_1us() {
        let a = parse_timing("100ns").unwrap().value();
        let b = parse_timing("0.1us").unwrap().value();
        assert!((a - b).abs() < 1e-20);
    }

    #[test]
    fn test_timing_requires_unit() {
        assert!(parse_timing("100").is_err());
        assert!(parse_timing("100 min").is_err());
        assert!(parse_timing("ns").is_err());
        assert!(parse_timing("tau").is_err());
    }

    #[test]
    fn test_value_with_unit() {
        let q = parse_value_with_unit("100ns").unwrap();
        assert_eq!(q.dimension(), Dimension::Time);
        assert_close(q.value, 1e-7);

        let q = parse_value_with_unit("0.5V").unwrap();
        assert_eq!(q.dimension(), Dimension::Voltage);
        assert_eq!(q.value, 0.5);

        let q = parse_value_with_unit("2.5GHz").unwrap();
        assert_eq!(q.dimension(), Dimension::Frequency);
        assert_eq!(q.value, 2.5e9);

        // `ms` is milliseconds, `MHz` is megahertz
        assert_eq!(
            parse_value_with_unit("1MHz").unwrap().dimension(),
            Dimension::Frequency
        );
        assert_eq!(
            parse_value_with_unit("1ms").unwrap().dimension(),
            Dimension::Time
        );

        let q = parse_value_with_unit("-3.5").unwrap();
        assert_eq!(q.dimension(), Dimension::Dimensionless);
        assert_eq!(q.value, -3.5);

        assert!(parse_value_with_unit("abc").is_err());
        assert!(parse_value_with_unit("inf").is_err());
    }

    #[test]
    fn test_phase() {
        assert_eq!(parse_phase("90deg").unwrap(), 90.0);
        assert_close(parse_phase("3.141592653589793rad").unwrap(), 180.0);
        assert_eq!(parse_phase("45").unwrap(), 45.0);
        assert!(parse_phase("quarter").is_err());
    }

    #[test]
    fn test_frequency_and_amplitude() {
        assert_eq!(parse_frequency("10MHz").unwrap(), 10e6);
        assert!(parse_frequency("10").is_err());
        assert_eq!(parse_amplitude("0.8").unwrap(), 0.8);
        assert_eq!(parse_amplitude("0.8V").unwrap(), 0.8);
        assert!(parse_amplitude("0.8ns").is_err());
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("tau"));
        assert!(is_identifier("_t2"));
        assert!(!is_identifier("2t"));
        assert!(!is_identifier("100ns "));
    }

    proptest! {
        #[test]
        fn test_nanoseconds_and_microseconds_agree(ns in 0u32..10_000_000) {
            let from_ns = parse_timing(&format!("{ns}ns")).unwrap().value();
            let from_us = parse_timing(&format!("{}us", f64::from(ns) / 1000.0)).unwrap().value();
            prop_assert!((from_ns - from_us).abs() <= 1e-12 * from_ns.max(1e-12));
        }
    }
}
