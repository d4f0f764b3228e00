// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Range;

use psdl_dsl::types::Channel;
use psdl_units::Samples;

use crate::error::{Error, Result};
use crate::scan::ScheduledPulse;

#[derive(Clone, Eq, PartialEq, Hash, Default, Debug)]
pub(crate) struct OrderedRange<Num: Ord>(pub Range<Num>);

impl<Num: Ord> OrderedRange<Num> {
    pub fn overlaps_range(&self, other: &Self) -> bool {
        self.0.start < other.0.end && self.0.end > other.0.start
    }
}

impl<Num: Ord> Ord for OrderedRange<Num> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.start.cmp(&other.0.start) {
            Ordering::Equal => self.0.end.cmp(&other.0.end),
            ordering => ordering,
        }
    }
}

impl<Num: Ord> PartialOrd for OrderedRange<Num> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fail if two pulses on the same channel occupy a common sample.
///
/// Pulses without samples occupy nothing and never conflict.
pub(crate) fn check_overlaps(pulses: &[ScheduledPulse], scan_index: usize) -> Result<()> {
    let mut channels: BTreeMap<Channel, Vec<(OrderedRange<Samples>, &str)>> = BTreeMap::new();
    for scheduled in pulses.iter().filter(|p| p.duration_samples > 0) {
        // Scheduling rejects pulses ending past the representable range
        let end = scheduled.end_sample().unwrap_or(Samples::MAX);
        channels
            .entry(scheduled.pulse.channel)
            .or_default()
            .push((OrderedRange(scheduled.start_sample..end), &scheduled.pulse.name));
    }
    for (channel, mut ranges) in channels {
        ranges.sort();
        // The range reaching furthest so far is the only candidate for a conflict
        let mut furthest: Option<&(OrderedRange<Samples>, &str)> = None;
        for current in &ranges {
            if let Some(previous) = furthest.filter(|f| f.0.overlaps_range(&current.0)) {
                return Err(Error::TimingConflict {
                    scan_index,
                    channel,
                    first: previous.1.to_string(),
                    second: current.1.to_string(),
                    first_end: previous.0.0.end,
                    second_start: current.0.0.start,
                });
            }
            if furthest.is_none_or(|f| current.0.0.end > f.0.0.end) {
                furthest = Some(current);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use psdl_dsl::builders::PulseDescriptionBuilder;
    use psdl_units::seconds;

    fn scheduled(name: &str, channel: u16, start: Samples, length: Samples) -> ScheduledPulse {
        ScheduledPulse {
            start_sample: start,
            duration_samples: length,
            pulse: PulseDescriptionBuilder::new(name, Channel(channel), seconds(0.0), seconds(0.0))
                .name(name)
                .build(),
        }
    }

    #[test]
    fn test_ordered_range() {
        let a = OrderedRange(0..10);
        assert!(a.overlaps_range(&OrderedRange(9..20)));
        assert!(!a.overlaps_range(&OrderedRange(10..20)));
        assert!(OrderedRange(0..10) < OrderedRange(0..11));
        assert!(OrderedRange(1..2) > OrderedRange(0..11));
    }

    #[test]
    fn test_touching_pulses_do_not_conflict() {
        let pulses = vec![
            scheduled("a", 1, 0, 100),
            scheduled("b", 1, 100, 100),
            scheduled("c", 2, 50, 100),
        ];
        check_overlaps(&pulses, 0).unwrap();
    }

    #[test]
    fn test_conflict_names_both_pulses() {
        let pulses = vec![
            scheduled("long", 1, 0, 500),
            scheduled("short", 1, 100, 50),
            scheduled("late", 1, 400, 200),
        ];
        let err = check_overlaps(&pulses, 3).unwrap_err();
        match err {
            Error::TimingConflict {
                scan_index,
                channel,
                first,
                second,
                ..
            } => {
                assert_eq!(scan_index, 3);
                assert_eq!(channel, Channel(1));
                assert_eq!(first, "long");
                assert_eq!(second, "short");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_conflict_with_non_adjacent_pulse() {
        let pulses = vec![
            scheduled("long", 1, 0, 500),
            scheduled("inner", 1, 10, 0),
            scheduled("late", 1, 400, 200),
        ];
        let err = check_overlaps(&pulses, 0).unwrap_err();
        assert!(err.to_string().contains("'late'"));
    }
}
