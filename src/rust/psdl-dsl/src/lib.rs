// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod builders;
pub mod description;
pub mod types;
pub mod variable;

pub use description::{
    ConditionalDescription, LoopDescription, PulseDescription, SequenceDescription,
};
pub use variable::{VariableDescription, VariableValues};
