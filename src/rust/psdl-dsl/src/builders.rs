// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use psdl_units::{Duration, Seconds};

use crate::description::PulseDescription;
use crate::types::{BoundField, Channel, PulseParameters, PulseShape, VariableBinding};

/// Identifier-safe stem of a pulse name: every non-alphanumeric character becomes `_`.
///
/// `pi/2` becomes `pi_2`.
pub fn pulse_name_stem(pulse_type: &str) -> String {
    pulse_type
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

pub struct PulseDescriptionBuilder {
    inner: PulseDescription,
}

impl PulseDescriptionBuilder {
    pub fn new(
        pulse_type: impl Into<String>,
        channel: Channel,
        timing: Duration<Seconds>,
        duration: Duration<Seconds>,
    ) -> Self {
        let pulse_type = pulse_type.into();
        Self {
            inner: PulseDescription {
                name: pulse_name_stem(&pulse_type),
                pulse_type,
                channel,
                shape: PulseShape::Square,
                duration,
                amplitude: 1.0,
                timing,
                parameters: PulseParameters::default(),
                fixed_timing: false,
                bindings: Vec::new(),
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    pub fn shape(mut self, shape: PulseShape) -> Self {
        self.inner.shape = shape;
        self
    }

    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.inner.amplitude = amplitude;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.inner.fixed_timing = true;
        self
    }

    pub fn parameters(mut self, parameters: PulseParameters) -> Self {
        self.inner.parameters = parameters;
        self
    }

    pub fn bind(mut self, field: BoundField, variable: impl Into<String>) -> Self {
        self.inner.bindings.push(VariableBinding::new(variable, field));
        self
    }

    pub fn build(self) -> PulseDescription {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psdl_units::seconds;

    #[test]
    fn test_name_stem() {
        assert_eq!(pulse_name_stem("pi/2"), "pi_2");
        assert_eq!(pulse_name_stem("laser"), "laser");
        assert_eq!(pulse_name_stem("x-y 8"), "x_y_8");
    }

    #[test]
    fn test_builder_defaults() {
        let pulse = PulseDescriptionBuilder::new("pi/2", Channel(1), seconds(0.0), seconds(5e-8))
            .build();
        assert_eq!(pulse.name, "pi_2");
        assert_eq!(pulse.shape, PulseShape::Square);
        assert_eq!(pulse.amplitude, 1.0);
        assert!(!pulse.fixed_timing);
        assert!(!pulse.is_bound());

        let pulse = PulseDescriptionBuilder::new("pi", Channel(1), seconds(0.0), seconds(5e-8))
            .name("pi_1")
            .shape(PulseShape::Gaussian)
            .fixed()
            .bind(BoundField::Duration, "tau")
            .build();
        assert_eq!(pulse.name, "pi_1");
        assert!(pulse.fixed_timing);
        assert_eq!(
            pulse.binding(&BoundField::Duration).map(|b| b.variable.as_str()),
            Some("tau")
        );
    }
}
