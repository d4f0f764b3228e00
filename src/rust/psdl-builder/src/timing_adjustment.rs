// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use psdl_dsl::PulseDescription;
use psdl_dsl::types::BoundField;
use psdl_units::{Duration, Seconds, seconds};

/// Shift pulses to absorb the duration changes introduced by binding a scan value.
///
/// `bound[i]` is `originals[i]` with its bound fields already set. Pulses are visited in
/// order of their original start time and the change of duration of each visited pulse
/// accumulates into a shift applied to every later pulse:
///
/// * Fixed pulses never move, but the shift keeps accumulating past them, including their
///   own duration change.
/// * A pulse with bound timing starts at the bound value and the shift of later pulses
///   becomes the displacement of its end.
/// * Pulses with the same original start time are not shifted by each other.
pub(crate) fn adjust_timing(originals: &[PulseDescription], bound: &mut [PulseDescription]) {
    debug_assert_eq!(originals.len(), bound.len());
    let mut order: Vec<usize> = (0..originals.len()).collect();
    order.sort_by_key(|&i| originals[i].timing);

    let mut shift: Duration<Seconds> = seconds(0.0);
    for group in order.chunk_by(|&a, &b| originals[a].timing == originals[b].timing) {
        let group_shift = shift;
        for &i in group {
            let (original, pulse) = (&originals[i], &mut bound[i]);
            let duration_delta = pulse.duration - original.duration;
            if original.binding(&BoundField::Timing).is_some() {
                shift = (pulse.timing - original.timing) + duration_delta;
                continue;
            }
            if !original.fixed_timing {
                pulse.timing = original.timing + group_shift;
            }
            shift += duration_delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::bind_pulse;
    use psdl_dsl::builders::PulseDescriptionBuilder;
    use psdl_dsl::types::Channel;

    const NS: f64 = 1e-9;

    fn pulse(name: &str, timing_ns: f64, duration_ns: f64) -> PulseDescriptionBuilder {
        PulseDescriptionBuilder::new(name, Channel(1), seconds(timing_ns * NS), seconds(duration_ns * NS))
            .name(name)
    }

    fn adjusted(originals: &[PulseDescription], value: f64) -> Vec<f64> {
        let mut bound: Vec<_> = originals.iter().map(|p| bind_pulse(p, value)).collect();
        adjust_timing(originals, &mut bound);
        bound.iter().map(|p| (p.timing.value() / NS).round()).collect()
    }

    #[test]
    fn test_cascading_shift_around_fixed_pulse() {
        // A grows from 100 ns to 250 ns: B and D follow, the fixed C stays put
        let originals = vec![
            pulse("A", 0.0, 100.0).bind(BoundField::Duration, "tau").build(),
            pulse("B", 400.0, 100.0).build(),
            pulse("C", 600.0, 100.0).fixed().build(),
            pulse("D", 900.0, 100.0).build(),
        ];
        assert_eq!(adjusted(&originals, 250.0 * NS), vec![0.0, 550.0, 600.0, 1050.0]);
        assert_eq!(adjusted(&originals, 100.0 * NS), vec![0.0, 400.0, 600.0, 900.0]);
    }

    #[test]
    fn test_fixed_pulse_with_bound_duration_shifts_later_pulses() {
        let originals = vec![
            pulse("A", 0.0, 100.0).fixed().bind(BoundField::Duration, "tau").build(),
            pulse("B", 200.0, 100.0).build(),
        ];
        assert_eq!(adjusted(&originals, 150.0 * NS), vec![0.0, 250.0]);
    }

    #[test]
    fn test_textual_order_does_not_matter() {
        let originals = vec![
            pulse("D", 900.0, 100.0).build(),
            pulse("A", 0.0, 100.0).bind(BoundField::Duration, "tau").build(),
            pulse("B", 400.0, 100.0).build(),
        ];
        assert_eq!(adjusted(&originals, 200.0 * NS), vec![1000.0, 0.0, 500.0]);
    }

    #[test]
    fn test_simultaneous_pulses_do_not_shift_each_other() {
        let originals = vec![
            pulse("A", 0.0, 100.0).bind(BoundField::Duration, "tau").build(),
            pulse("B", 0.0, 100.0).build(),
            pulse("C", 300.0, 100.0).build(),
        ];
        assert_eq!(adjusted(&originals, 200.0 * NS), vec![0.0, 0.0, 400.0]);
    }

    #[test]
    fn test_bound_timing_drags_later_pulses() {
        let originals = vec![
            pulse("A", 0.0, 100.0).build(),
            pulse("B", 200.0, 100.0).bind(BoundField::Timing, "tau").build(),
            pulse("C", 400.0, 100.0).build(),
            pulse("D", 500.0, 100.0).fixed().build(),
        ];
        assert_eq!(adjusted(&originals, 250.0 * NS), vec![0.0, 250.0, 450.0, 500.0]);
    }

    #[test]
    fn test_shrinking_pulse_pulls_later_pulses_in() {
        let originals = vec![
            pulse("A", 0.0, 300.0).bind(BoundField::Duration, "tau").build(),
            pulse("B", 300.0, 100.0).build(),
        ];
        assert_eq!(adjusted(&originals, 100.0 * NS), vec![0.0, 100.0]);
    }
}
