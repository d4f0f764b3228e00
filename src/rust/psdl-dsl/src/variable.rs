// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use psdl_units::Dimension;
use serde::{Deserialize, Serialize};

/// A single scanned axis.
///
/// Values are stored in the base unit of the variable's dimension
/// (seconds, Hz, volts or unitless).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescription {
    pub name: String,
    pub start_value: f64,
    pub stop_value: f64,
    pub steps: u32,
    pub dimension: Dimension,
}

impl VariableDescription {
    pub fn new(
        name: impl Into<String>,
        start_value: f64,
        stop_value: f64,
        steps: u32,
        dimension: Dimension,
    ) -> Self {
        Self {
            name: name.into(),
            start_value,
            stop_value,
            steps,
            dimension,
        }
    }

    /// Symbol of the base unit the values are expressed in.
    pub fn unit(&self) -> &'static str {
        self.dimension.base_symbol()
    }

    pub fn len(&self) -> usize {
        self.steps as usize
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Value of the scan point at `index`, linearly spaced over `[start, stop]`.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        linspace_at(self.start_value, self.stop_value, self.steps, index)
    }

    /// Lazy iterator over the scan values.
    pub fn values(&self) -> VariableValues {
        VariableValues {
            start_value: self.start_value,
            stop_value: self.stop_value,
            steps: self.steps,
            current_index: 0,
        }
    }
}

fn linspace_at(start: f64, stop: f64, steps: u32, index: usize) -> Option<f64> {
    let steps = steps as usize;
    if index >= steps {
        return None;
    }
    if steps == 1 {
        return Some(start);
    }
    if index == steps - 1 {
        return Some(stop);
    }
    Some(start + (stop - start) * index as f64 / (steps - 1) as f64)
}

/// Restartable iterator over the values of a [`VariableDescription`].
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValues {
    start_value: f64,
    stop_value: f64,
    steps: u32,
    current_index: usize,
}

impl VariableValues {
    /// Index of the value returned by the next call to `next()`.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
    }
}

impl Iterator for VariableValues {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let value = linspace_at(
            self.start_value,
            self.stop_value,
            self.steps,
            self.current_index,
        )?;
        self.current_index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps as usize).saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for VariableValues {}
