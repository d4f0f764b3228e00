// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::ops::RangeInclusive;

use psdl_dsl::description::DEFAULT_SAMPLE_RATE;
use psdl_dsl::types::Channel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Hardware channel ids pulses may be played on.
    pub supported_channels: RangeInclusive<u16>,
    /// How deep `load preset:` lines may nest inside preset text.
    pub max_preset_depth: usize,
    /// Sample rate in Hz used when the header does not give one.
    pub default_sample_rate: f64,
}

impl ParserSettings {
    pub fn is_supported_channel(&self, channel: Channel) -> bool {
        self.supported_channels.contains(&channel.0)
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            supported_channels: 0..=23,
            max_preset_depth: 4,
            default_sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}
