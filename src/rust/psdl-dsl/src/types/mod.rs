// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

mod binding;
mod channel;
mod parameters;
mod pulse_shape;

pub use binding::*;
pub use channel::Channel;
pub use parameters::*;
pub use pulse_shape::*;
