//! Loop / boomerang state machine tests

use super::*;
use crate::state::{Direction, PlaybackState, Rate};

const EPS: f64 = 1e-9;

/// Deterministic xorshift sequence for property sweeps
struct Sweep(u64);

impl Sweep {
    fn next_unit(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_unit()
    }
}

fn looping(position: f64, rate: f64, start: f64, end: f64, boomerang: bool) -> PlaybackState {
    let mut state = PlaybackState::new(Rate::from_signed(rate, Direction::Forward), start, end);
    state.position = position;
    state.boomerang = boomerang;
    state
}

fn free(position: f64, rate: f64) -> PlaybackState {
    let mut state = looping(position, rate, 0.0, 0.0, false);
    state.loop_enabled = false;
    state
}

// =============================================================
// wrap()
// =============================================================

#[test]
fn test_wrap_reference_values() {
    assert_eq!(wrap(9.5, 10.0), 9.5);
    assert_eq!(wrap(10.0, 10.0), 0.0);
    assert_eq!(wrap(-0.5, 10.0), 9.5);
    assert_eq!(wrap(25.0, 10.0), 5.0);
    assert_eq!(wrap(-20.0, 10.0), 0.0);
}

#[test]
fn test_wrap_non_finite_resolves_to_zero() {
    assert_eq!(wrap(f64::NAN, 10.0), 0.0);
    assert_eq!(wrap(f64::INFINITY, 10.0), 0.0);
    assert_eq!(wrap(f64::NEG_INFINITY, 10.0), 0.0);
}

#[test]
fn test_wrap_tiny_negative_stays_below_len() {
    let w = wrap(-1e-300, 10.0);
    assert!((0.0..10.0).contains(&w));
}

// =============================================================
// Loop disabled
// =============================================================

#[test]
fn test_unbounded_always_resolves_into_buffer() {
    let mut sweep = Sweep(0x9e37_79b9_7f4a_7c15);
    for len in [1usize, 7, 100, 8192] {
        let advancer = PositionAdvancer::new(len, 1.0);
        let mut state = free(0.0, 1.0);
        for _ in 0..2_000 {
            let rate = sweep.range(-3.0 * len as f64, 3.0 * len as f64);
            state.rate = Rate::from_signed(rate, Direction::Forward);
            assert!(advancer.advance(&mut state).is_none());
            assert!(
                state.position >= 0.0 && state.position < len as f64,
                "len={len} position={}",
                state.position
            );
        }
    }
}

#[test]
fn test_unbounded_wraps_across_both_edges() {
    let advancer = PositionAdvancer::new(10, 1.0);
    let mut state = free(9.5, 1.0);
    advancer.advance(&mut state);
    assert!((state.position - 0.5).abs() < EPS);

    let mut state = free(0.25, -0.75);
    advancer.advance(&mut state);
    assert!((state.position - 9.5).abs() < EPS);
}

#[test]
fn test_zero_rate_freezes_cursor() {
    let advancer = PositionAdvancer::new(100, 1.0);
    let mut state = looping(42.0, 0.0, 0.0, 99.0, true);
    for _ in 0..10 {
        assert!(advancer.advance(&mut state).is_none());
    }
    assert_eq!(state.position, 42.0);
}

// =============================================================
// Contiguous loop region
// =============================================================

#[test]
fn test_forward_exit_pins_to_loop_start() {
    let advancer = PositionAdvancer::new(200, 1.0);
    let mut state = looping(99.9, 1.0, 0.0, 100.0, false);

    let crossing = advancer.advance(&mut state).unwrap();

    assert_eq!(state.position, 0.0);
    assert_eq!(crossing.event, CrossEvent::CrossUpper);
    assert_eq!(crossing.action, CrossAction::Wrap { target: 0.0 });
    assert_eq!(state.rate.direction, Direction::Forward);
}

#[test]
fn test_forward_exit_reflects_with_boomerang() {
    let advancer = PositionAdvancer::new(200, 1.0);
    let mut state = looping(99.9, 1.0, 0.0, 100.0, true);

    let crossing = advancer.advance(&mut state).unwrap();

    assert!((state.position - 99.1).abs() < EPS, "position={}", state.position);
    assert_eq!(state.rate.direction, Direction::Reverse);
    match crossing.action {
        CrossAction::Reflect {
            overshoot,
            reversed,
        } => {
            assert!((overshoot - 0.9).abs() < EPS);
            assert!(reversed);
        }
        other => panic!("expected reflection, got {other:?}"),
    }

    // Next step runs backwards and stays inside the loop
    let before = state.position;
    assert!(advancer.advance(&mut state).is_none());
    assert!(state.position < before);
    assert!(state.position >= 0.0 && state.position < 100.0);
}

#[test]
fn test_reverse_exit_jumps_to_loop_end() {
    let advancer = PositionAdvancer::new(200, 1.0);
    let mut state = looping(10.5, -1.0, 10.0, 120.0, false);

    let crossing = advancer.advance(&mut state).unwrap();

    assert_eq!(state.position, 120.0);
    assert_eq!(crossing.event, CrossEvent::CrossLower);
    assert_eq!(state.rate.direction, Direction::Reverse);
}

#[test]
fn test_reverse_exit_reflects_with_boomerang() {
    let advancer = PositionAdvancer::new(200, 1.0);
    let mut state = looping(10.5, -1.0, 10.0, 120.0, true);

    advancer.advance(&mut state).unwrap();

    assert!((state.position - 10.5).abs() < EPS);
    assert_eq!(state.rate.direction, Direction::Forward);
}

#[test]
fn test_reverse_reflect_at_buffer_start() {
    // Loop starting at byte 0: overshoot below zero comes back positive
    let advancer = PositionAdvancer::new(50, 1.0);
    let mut state = looping(0.2, -0.5, 0.0, 40.0, true);

    advancer.advance(&mut state).unwrap();

    assert!((state.position - 0.3).abs() < EPS);
    assert_eq!(state.rate.direction, Direction::Forward);
}

#[test]
fn test_position_outside_loop_runs_toward_it() {
    // Forward below the loop: no crossing until the cursor enters
    let advancer = PositionAdvancer::new(200, 1.0);
    let mut state = looping(5.0, 2.0, 50.0, 100.0, false);
    assert!(advancer.advance(&mut state).is_none());
    assert_eq!(state.position, 7.0);
}

#[test]
fn test_contiguous_reflection_is_mirror_symmetric() {
    // Forward play over [s, e] must mirror reverse play over [N-e, N-s]
    let len = 1_000.0;
    let advancer = PositionAdvancer::new(len as usize, 1.0);
    let mut sweep = Sweep(0x2545_f491_4f6c_dd1d);

    for _ in 0..200 {
        let s = sweep.range(50.0, 400.0);
        let e = sweep.range(600.0, 950.0);
        let rate = sweep.range(0.5, 40.0);
        let p = sweep.range(s, e);

        let mut a = looping(p, rate, s, e, true);
        let mut b = looping(len - p, -rate, len - e, len - s, true);

        for _ in 0..500 {
            advancer.advance(&mut a);
            advancer.advance(&mut b);
            assert!(
                (a.position - (len - b.position)).abs() < 1e-6,
                "a={} mirrored b={}",
                a.position,
                len - b.position
            );
            assert_eq!(a.rate.direction, b.rate.direction.flipped());
        }
    }
}

#[test]
fn test_boomerang_ping_pongs_inside_contiguous_loop() {
    let advancer = PositionAdvancer::new(500, 1.0);
    let mut state = looping(100.0, 3.7, 100.0, 300.0, true);
    let region = LoopRegion::classify(&state, 500.0);
    let (mut upper, mut lower) = (0, 0);

    for _ in 0..5_000 {
        if let Some(c) = advancer.advance(&mut state) {
            match c.event {
                CrossEvent::CrossUpper => upper += 1,
                CrossEvent::CrossLower => lower += 1,
            }
        }
        assert!(region.contains(state.position), "escaped: {}", state.position);
    }
    assert!(upper > 10 && lower > 10);
    assert!((upper as i32 - lower as i32).abs() <= 1);
}

/// Inside `[start, end]` (or its wrapped complement) up to rounding
fn in_loop(pos: f64, start: f64, end: f64) -> bool {
    const TOL: f64 = 1e-9;
    if start < end {
        pos >= start - TOL && pos <= end + TOL
    } else {
        pos >= start - TOL || pos <= end + TOL
    }
}

#[test]
fn test_step_longer_than_loop_folds_back_inside() {
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(99.9, 250.0, 0.0, 100.0, true);

    // 249.9 past the end: down to 0, up to 100, down again to 50.1
    let crossing = advancer.advance(&mut state).unwrap();
    assert_eq!(crossing.event, CrossEvent::CrossUpper);
    assert!((state.position - 50.1).abs() < EPS, "position={}", state.position);
    assert_eq!(state.rate.direction, Direction::Reverse);

    // 199.9 below the start: two mirrors, still heading down
    let crossing = advancer.advance(&mut state).unwrap();
    assert_eq!(crossing.event, CrossEvent::CrossLower);
    assert!((state.position - 0.1).abs() < EPS, "position={}", state.position);
    assert_eq!(state.rate.direction, Direction::Reverse);
    match crossing.action {
        CrossAction::Reflect { reversed, .. } => assert!(!reversed),
        other => panic!("expected reflection, got {other:?}"),
    }

    for _ in 0..1_000 {
        advancer.advance(&mut state);
        assert!(in_loop(state.position, 0.0, 100.0), "escaped: {}", state.position);
    }
}

#[test]
fn test_fast_boomerang_stays_in_short_loops() {
    let len = 10_000.0;
    let advancer = PositionAdvancer::new(len as usize, 1.0);
    let mut sweep = Sweep(0x0123_4567_89ab_cdef);

    for _ in 0..200 {
        let start = sweep.range(0.0, len - 1.0);
        let end = sweep.range(0.0, len - 1.0);
        if (start - end).abs() < 1e-6 {
            continue;
        }
        let rate = sweep.range(-5_000.0, 5_000.0);
        let mut state = looping(start, rate, start, end, true);

        for _ in 0..200 {
            advancer.advance(&mut state);
            assert!(
                in_loop(state.position, start, end),
                "loop [{start}, {end}] rate {rate}: escaped to {}",
                state.position
            );
            assert!(state.position >= 0.0 && state.position < len);
        }
    }
}

// =============================================================
// Degenerate and out-of-range bounds
// =============================================================

#[test]
fn test_degenerate_loop_pins() {
    let advancer = PositionAdvancer::new(100, 1.0);
    for (start_pos, rate) in [(0.0, 1.0), (50.0, -3.0), (99.0, 12.5), (10.0, 0.0)] {
        let mut state = looping(start_pos, rate, 50.0, 50.0, true);
        advancer.advance(&mut state);
        assert_eq!(state.position, 50.0);
        advancer.advance(&mut state);
        assert_eq!(state.position, 50.0);
    }
}

#[test]
fn test_out_of_range_bounds_pin_instead_of_failing() {
    let advancer = PositionAdvancer::new(100, 1.0);

    let mut state = looping(10.0, 1.0, 20.0, 5_000.0, false);
    advancer.advance(&mut state);
    assert_eq!(state.position, 20.0);

    let mut state = looping(10.0, 1.0, -30.0, 40.0, false);
    advancer.advance(&mut state);
    assert_eq!(state.position, 70.0);
    assert!(state.position < 100.0);

    let mut state = looping(10.0, 1.0, f64::NAN, 40.0, false);
    advancer.advance(&mut state);
    assert_eq!(state.position, 0.0);
}

// =============================================================
// Wrapped loop region: [start, N) ∪ [0, end]
// =============================================================

#[test]
fn test_wrapped_region_passes_buffer_edge() {
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(990.0, 20.0, 800.0, 200.0, false);

    assert!(advancer.advance(&mut state).is_none());
    assert!((state.position - 10.0).abs() < EPS);
}

#[test]
fn test_wrapped_forward_gap_pins_to_start() {
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(195.0, 10.0, 800.0, 200.0, false);

    let crossing = advancer.advance(&mut state).unwrap();

    assert_eq!(state.position, 800.0);
    assert_eq!(crossing.event, CrossEvent::CrossUpper);
}

#[test]
fn test_wrapped_forward_gap_reflects() {
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(195.0, 10.0, 800.0, 200.0, true);

    advancer.advance(&mut state).unwrap();

    assert!((state.position - 195.0).abs() < EPS);
    assert_eq!(state.rate.direction, Direction::Reverse);
}

#[test]
fn test_wrapped_reverse_inside_region_keeps_playing() {
    let advancer = PositionAdvancer::new(1_000, 1.0);

    // Below loop_end: still active, no boundary crossed
    let mut state = looping(100.0, -10.0, 800.0, 200.0, false);
    assert!(advancer.advance(&mut state).is_none());
    assert!((state.position - 90.0).abs() < EPS);

    // Above loop_start: still active
    let mut state = looping(900.0, -10.0, 800.0, 200.0, true);
    assert!(advancer.advance(&mut state).is_none());
    assert!((state.position - 890.0).abs() < EPS);
    assert_eq!(state.rate.direction, Direction::Reverse);

    // Reverse across byte 0 into the upper half of the region
    let mut state = looping(5.0, -10.0, 800.0, 200.0, true);
    assert!(advancer.advance(&mut state).is_none());
    assert!((state.position - 995.0).abs() < EPS);
}

#[test]
fn test_wrapped_reverse_gap_jumps_to_end() {
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(805.0, -10.0, 800.0, 200.0, false);

    let crossing = advancer.advance(&mut state).unwrap();

    assert_eq!(state.position, 200.0);
    assert_eq!(crossing.event, CrossEvent::CrossLower);
    assert_eq!(crossing.action, CrossAction::Wrap { target: 200.0 });
}

#[test]
fn test_wrapped_reverse_gap_reflects() {
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(805.0, -10.0, 800.0, 200.0, true);

    advancer.advance(&mut state).unwrap();

    assert!((state.position - 805.0).abs() < EPS);
    assert_eq!(state.rate.direction, Direction::Forward);
}

#[test]
fn test_wrapped_reflection_across_buffer_edge() {
    // End near byte 0: reflected position lands in the upper half
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(3.0, 10.0, 800.0, 5.0, true);

    advancer.advance(&mut state).unwrap();

    assert!((state.position - 997.0).abs() < EPS);
    assert_eq!(state.rate.direction, Direction::Reverse);
}

#[test]
fn test_wrapped_boundaries_are_mirror_images() {
    // Reflection distance from the crossed bound equals the overshoot on
    // both sides of the wrapped region
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut sweep = Sweep(0xdead_beef_cafe_f00d);

    for _ in 0..500 {
        let start = sweep.range(600.0, 900.0);
        let end = sweep.range(100.0, 400.0);
        let step = sweep.range(0.1, 50.0);

        let over_end = sweep.range(0.0, step);
        let mut up = looping(end - (step - over_end), step, start, end, true);
        let c_up = advancer.advance(&mut up);

        let over_start = sweep.range(0.0, step);
        let mut down = looping(start + (step - over_start), -step, start, end, true);
        let c_down = advancer.advance(&mut down);

        if over_end > 1e-9 {
            assert_eq!(c_up.map(|c| c.event), Some(CrossEvent::CrossUpper));
            assert!(((end - up.position) - over_end).abs() < 1e-6);
        }
        if over_start > 1e-9 {
            assert_eq!(c_down.map(|c| c.event), Some(CrossEvent::CrossLower));
            assert!(((down.position - start) - over_start).abs() < 1e-6);
        }
    }
}

#[test]
fn test_wrapped_step_longer_than_loop_folds_back_inside() {
    // Active region [950, 1000) ∪ [0, 30]: 80 bytes long
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(20.0, 130.0, 950.0, 30.0, true);

    // 120 past the end: back 80 to 950, forward 40 to 990
    advancer.advance(&mut state).unwrap();
    assert!((state.position - 990.0).abs() < 1e-6, "position={}", state.position);
    assert_eq!(state.rate.direction, Direction::Forward);

    for _ in 0..1_000 {
        advancer.advance(&mut state);
        assert!(in_loop(state.position, 950.0, 30.0), "escaped: {}", state.position);
    }
}

#[test]
fn test_boomerang_ping_pongs_inside_wrapped_loop() {
    let advancer = PositionAdvancer::new(1_000, 1.0);
    let mut state = looping(850.0, 7.3, 700.0, 150.0, true);
    let region = LoopRegion::classify(&state, 1_000.0);
    let mut flips = 0;

    for _ in 0..10_000 {
        let before = state.rate.direction;
        advancer.advance(&mut state);
        if state.rate.direction != before {
            flips += 1;
        }
        assert!(region.contains(state.position), "escaped: {}", state.position);
        assert!(state.position >= 0.0 && state.position < 1_000.0);
    }
    assert!(flips > 20);
}

#[test]
fn test_bytes_per_unit_scales_delta() {
    let advancer = PositionAdvancer::new(10_000, 8.0);
    let mut state = free(100.0, -2.5);
    advancer.advance(&mut state);
    assert!((state.position - 80.0).abs() < EPS);
}
