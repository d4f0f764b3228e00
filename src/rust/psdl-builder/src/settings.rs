// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderSettings {
    /// Place every loop iteration on the timeline. Off by default, loops are then
    /// left to the hardware sequencer.
    pub unroll_loops: bool,
}
