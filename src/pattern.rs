//! Blink pattern scheduler.
//!
//! A pattern is a colon-delimited string of durations in dispatcher ticks
//! (`"500:500:500"`). Every POST on the blink-action resource re-reads the
//! pattern resource — the string is never cached — and schedules one LED
//! toggle per segment at the running prefix sum of the parsed durations.
//!
//! Parsing is tolerant: a malformed or empty segment counts as duration 0
//! and still occupies a toggle slot, matching the `atoi` behaviour the
//! server-side tooling grew up against. Re-invocation does not cancel
//! pending toggles; overlapping patterns interleave.

use log::{info, warn};

use crate::dispatch::TimerQueue;
use crate::endpoint::Endpoint;
use crate::store::ResourceHandle;

/// The one thing a toggle needs from its context.
pub trait Blink {
    fn toggle_blink(&mut self);
}

/// Parse a pattern into per-segment durations. An empty pattern yields no
/// segments; an unparseable segment yields 0 and a warning.
pub fn parse_durations(pattern: &str) -> Vec<u64> {
    if pattern.is_empty() {
        return Vec::new();
    }
    pattern
        .split(':')
        .map(|segment| match segment.trim().parse::<u64>() {
            Ok(d) => d,
            Err(_) => {
                warn!("blink: malformed pattern segment {segment:?}, using 0");
                0
            }
        })
        .collect()
}

/// Schedule one toggle per segment, each at the cumulative offset of the
/// durations up to and including its own. Returns the number of toggles
/// scheduled.
pub fn schedule_toggles<C: Blink>(timers: &mut TimerQueue<C>, pattern: &str) -> usize {
    let durations = parse_durations(pattern);
    let mut offset: u64 = 0;
    for d in &durations {
        offset = offset.saturating_add(*d);
        timers.post(offset, |ctx, _| ctx.toggle_blink());
    }
    durations.len()
}

/// Build the POST handler for the blink-action resource.
pub fn blink_post_handler(
    pattern_res: ResourceHandle,
) -> impl FnMut(&mut Endpoint, &mut TimerQueue<Endpoint>, ResourceHandle, &[u8]) + Send {
    move |ep, timers, _handle, _payload| {
        let pattern = ep.store().value_string(pattern_res);
        info!("POST received, going to blink pattern: {pattern}");
        let scheduled = schedule_toggles(timers, &pattern);
        info!("blink: {scheduled} toggles scheduled");
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::EventQueue;

    #[derive(Default)]
    struct Probe {
        toggles: u32,
    }

    impl Blink for Probe {
        fn toggle_blink(&mut self) {
            self.toggles += 1;
        }
    }

    #[test]
    fn parse_plain_pattern() {
        assert_eq!(parse_durations("500:500:500"), vec![500, 500, 500]);
        assert_eq!(parse_durations("1"), vec![1]);
    }

    #[test]
    fn parse_empty_pattern_yields_no_segments() {
        assert_eq!(parse_durations(""), Vec::<u64>::new());
    }

    #[test]
    fn malformed_segments_parse_to_zero_but_keep_their_slot() {
        assert_eq!(parse_durations("abc"), vec![0]);
        assert_eq!(parse_durations("100:abc:200"), vec![100, 0, 200]);
        assert_eq!(parse_durations(":"), vec![0, 0]);
        assert_eq!(parse_durations("-5"), vec![0]);
    }

    #[test]
    fn whitespace_around_segments_is_tolerated() {
        assert_eq!(parse_durations(" 500 : 250 "), vec![500, 250]);
    }

    #[test]
    fn toggles_fire_at_prefix_sum_offsets() {
        let mut q: EventQueue<Probe> = EventQueue::new(4);
        let mut probe = Probe::default();
        q.post(0, |_, t| {
            assert_eq!(schedule_toggles(t, "500:500:500"), 3);
        });
        q.run_until(&mut probe, 499);
        assert_eq!(probe.toggles, 0);
        q.run_until(&mut probe, 500);
        assert_eq!(probe.toggles, 1);
        q.run_until(&mut probe, 999);
        assert_eq!(probe.toggles, 1);
        q.run_until(&mut probe, 1000);
        assert_eq!(probe.toggles, 2);
        q.run_until(&mut probe, 1500);
        assert_eq!(probe.toggles, 3);
        q.run_until(&mut probe, 10_000);
        assert_eq!(probe.toggles, 3);
    }

    #[test]
    fn malformed_segment_shifts_no_other_offset() {
        let mut q: EventQueue<Probe> = EventQueue::new(4);
        let mut probe = Probe::default();
        q.post(0, |_, t| {
            assert_eq!(schedule_toggles(t, "500:abc:500"), 3);
        });
        // "abc" → 0: its toggle lands together with the first segment's.
        q.run_until(&mut probe, 500);
        assert_eq!(probe.toggles, 2);
        q.run_until(&mut probe, 1000);
        assert_eq!(probe.toggles, 3);
    }

    #[test]
    fn empty_pattern_schedules_nothing() {
        let mut q: EventQueue<Probe> = EventQueue::new(4);
        let mut probe = Probe::default();
        q.post(0, |_, t| {
            assert_eq!(schedule_toggles(t, ""), 0);
        });
        q.run_until(&mut probe, 10_000);
        assert_eq!(probe.toggles, 0);
    }

    #[test]
    fn overlapping_invocations_interleave_without_cancellation() {
        let mut q: EventQueue<Probe> = EventQueue::new(4);
        let mut probe = Probe::default();
        q.post(0, |_, t| {
            assert_eq!(schedule_toggles(t, "100:100:100"), 3);
        });
        // Second invocation lands while the first is still replaying.
        q.post(150, |_, t| {
            assert_eq!(schedule_toggles(t, "100:100"), 2);
        });
        q.run_until(&mut probe, 10_000);
        // 3 + 2 — nothing cancelled.
        assert_eq!(probe.toggles, 5);
    }

    #[test]
    fn zero_duration_segments_all_fire_at_invocation_tick() {
        let mut q: EventQueue<Probe> = EventQueue::new(4);
        let mut probe = Probe::default();
        q.post(7, |_, t| {
            assert_eq!(schedule_toggles(t, "0:0:0"), 3);
        });
        q.run_until(&mut probe, 7);
        assert_eq!(probe.toggles, 3);
    }
}
