// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;

use anyhow::anyhow;
use psdl_units::{Duration, Seconds, seconds};

use super::{ParameterSchema, ParameterValue, Preset, PresetArguments, PresetBody};

const MW_CHANNEL: i64 = 1;
const LASER_CHANNEL: i64 = 2;
const INIT_LENGTH: Duration<Seconds> = seconds(1e-6);
const READOUT_LENGTH: Duration<Seconds> = seconds(1e-6);
const INIT_GAP: Duration<Seconds> = seconds(500e-9);

const RABI: &str = "\
laser pulse on channel {laser_channel} at 0ns, square, 1us, 1.0
mw pulse on channel {mw_channel} at 1.5us, square, {pulse_length}, {amplitude}
readout pulse on channel {laser_channel} at 3us, square, 1us, 1.0 [fixed]
";

fn time(t: Duration<Seconds>) -> String {
    format!("{:e}s", t.value())
}

fn channel(arguments: &PresetArguments, name: &str) -> anyhow::Result<u16> {
    let value = arguments.integer(name)?;
    u16::try_from(value).map_err(|_| anyhow!("'{name}' must be a channel id, got {value}"))
}

fn channel_parameters() -> [ParameterSchema; 2] {
    [
        ParameterSchema::new("mw_channel", ParameterValue::Integer(MW_CHANNEL)),
        ParameterSchema::new("laser_channel", ParameterValue::Integer(LASER_CHANNEL)),
    ]
}

struct Timeline {
    text: String,
    mw: u16,
    laser: u16,
}

impl Timeline {
    /// Starts with the optical initialization pulse.
    fn new(arguments: &PresetArguments) -> anyhow::Result<Self> {
        let mut timeline = Self {
            text: String::new(),
            mw: channel(arguments, "mw_channel")?,
            laser: channel(arguments, "laser_channel")?,
        };
        timeline.laser_pulse("laser", seconds(0.0), INIT_LENGTH, "")?;
        Ok(timeline)
    }

    fn mw_pulse(
        &mut self,
        pulse_type: &str,
        at: Duration<Seconds>,
        length: Duration<Seconds>,
        shape: &str,
    ) -> anyhow::Result<()> {
        writeln!(
            self.text,
            "{pulse_type} pulse on channel {} at {}, {shape}, {}, 1.0",
            self.mw,
            time(at),
            time(length)
        )?;
        Ok(())
    }

    fn laser_pulse(
        &mut self,
        pulse_type: &str,
        at: Duration<Seconds>,
        length: Duration<Seconds>,
        marker: &str,
    ) -> anyhow::Result<()> {
        writeln!(
            self.text,
            "{pulse_type} pulse on channel {} at {}, square, {}, 1.0{marker}",
            self.laser,
            time(at),
            time(length)
        )?;
        Ok(())
    }
}

fn ramsey(arguments: &PresetArguments) -> anyhow::Result<String> {
    let tau = arguments.time("tau")?;
    let pi_half = arguments.time("pi_half")?;
    let shape = arguments.text("shape")?;

    let mut timeline = Timeline::new(arguments)?;
    let first = INIT_LENGTH + INIT_GAP;
    let second = first + pi_half + tau;
    timeline.mw_pulse("pi/2", first, pi_half, shape)?;
    timeline.mw_pulse("pi/2", second, pi_half, shape)?;
    timeline.laser_pulse("readout", second + pi_half + INIT_GAP, READOUT_LENGTH, " [fixed]")?;
    Ok(timeline.text)
}

fn hahn_echo(arguments: &PresetArguments) -> anyhow::Result<String> {
    let tau = arguments.time("tau")?;
    let pi = arguments.time("pi")?;
    let pi_half = pi / 2.0;

    let mut timeline = Timeline::new(arguments)?;
    let first = INIT_LENGTH + INIT_GAP;
    let echo = first + pi_half + tau;
    let last = echo + pi + tau;
    timeline.mw_pulse("pi/2", first, pi_half, "gaussian")?;
    timeline.mw_pulse("pi", echo, pi, "gaussian")?;
    timeline.mw_pulse("pi/2", last, pi_half, "gaussian")?;
    timeline.laser_pulse("readout", last + pi_half + INIT_GAP, READOUT_LENGTH, " [fixed]")?;
    Ok(timeline.text)
}

pub(super) fn presets() -> Vec<Preset> {
    let shapes = ["gaussian", "square", "sech"].map(|s| ParameterValue::Text(s.to_string()));
    vec![
        Preset::new(
            "rabi",
            [
                ParameterSchema::new("pulse_length", ParameterValue::Time(seconds(100e-9))),
                ParameterSchema::new("amplitude", ParameterValue::Float(1.0)),
            ]
            .into_iter()
            .chain(channel_parameters())
            .collect(),
            PresetBody::Template(RABI.to_string()),
        ),
        Preset::new(
            "ramsey",
            [
                ParameterSchema::new("tau", ParameterValue::Time(seconds(500e-9))),
                ParameterSchema::new("pi_half", ParameterValue::Time(seconds(50e-9))),
                ParameterSchema::new("shape", ParameterValue::Text("gaussian".to_string()))
                    .with_allowed(shapes),
            ]
            .into_iter()
            .chain(channel_parameters())
            .collect(),
            PresetBody::Generator(ramsey),
        ),
        Preset::new(
            "hahn_echo",
            [
                ParameterSchema::new("tau", ParameterValue::Time(seconds(1e-6))),
                ParameterSchema::new("pi", ParameterValue::Time(seconds(100e-9))),
            ]
            .into_iter()
            .chain(channel_parameters())
            .collect(),
            PresetBody::Generator(hahn_echo),
        ),
    ]
}
