//! Position advancer: the loop / boomerang state machine
//!
//! Each output sample the cursor moves by one rate step, then any boundary
//! crossing is resolved:
//!
//! ```text
//!                 CrossUpper / Wrap(loop_start)
//!            ┌─────────────────────────────────┐
//!            ▼                                 │
//!       ┌─────────┐  CrossUpper / Reflect  ┌─────────┐
//!       │ Forward │ ─────────────────────► │ Reverse │
//!       │ rate>0  │ ◄───────────────────── │ rate<0  │
//!       └─────────┘  CrossLower / Reflect  └─────────┘
//!            │                                 ▲
//!            └─────────────────────────────────┘
//!                 CrossLower / Wrap(loop_end)
//! ```
//!
//! `Reflect` preserves the overshoot and flips the rate sign; `Wrap` jumps to
//! the opposite bound and keeps the direction. A step longer than the loop
//! bounces between both bounds until the overshoot is spent, so the cursor
//! always comes to rest inside. There is no terminal state.

use crate::state::PlaybackState;

/// Map any real value into `[0, len)` with modular wrap
///
/// Non-finite input resolves to `0.0`.
#[inline]
pub fn wrap(pos: f64, len: f64) -> f64 {
    if !pos.is_finite() || len <= 0.0 {
        return 0.0;
    }
    if pos < 0.0 {
        let mut r = pos % len;
        if r < 0.0 {
            r += len;
        }
        // -tiny + len rounds up to len
        if r >= len { 0.0 } else { r }
    } else if pos >= len {
        pos % len
    } else {
        pos
    }
}

/// Which loop bound was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossEvent {
    /// Moving forward past `loop_end`
    CrossUpper,
    /// Moving backward past `loop_start`
    CrossLower,
}

/// How a crossing was resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossAction {
    /// Jumped to the opposite bound, direction unchanged
    Wrap { target: f64 },
    /// Mirrored back inside, once per loop length of `overshoot`
    ///
    /// `reversed` is set when the direction ended up flipped.
    Reflect { overshoot: f64, reversed: bool },
}

/// One resolved loop boundary crossing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub event: CrossEvent,
    pub action: CrossAction,
}

/// Shape of the active loop region for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopRegion {
    /// Looping off: whole buffer, modular wrap
    Unbounded,
    /// `start == end` or a bound outside `[0, len)`: cursor frozen here
    Pinned(f64),
    /// `start < end`: the interval `[start, end]`
    Contiguous { start: f64, end: f64 },
    /// `start > end`: `[start, len) ∪ [0, end]`
    Wrapped { start: f64, end: f64 },
}

impl LoopRegion {
    pub fn classify(state: &PlaybackState, len: f64) -> Self {
        if !state.loop_enabled {
            return LoopRegion::Unbounded;
        }
        let (start, end) = (state.loop_start, state.loop_end);
        let in_range = |v: f64| v.is_finite() && v >= 0.0 && v < len;
        if start == end || !in_range(start) || !in_range(end) {
            return LoopRegion::Pinned(wrap(start, len));
        }
        if start < end {
            LoopRegion::Contiguous { start, end }
        } else {
            LoopRegion::Wrapped { start, end }
        }
    }

    /// Whether a resolved position lies inside the active region
    #[cfg(test)]
    pub(crate) fn contains(&self, pos: f64) -> bool {
        match *self {
            LoopRegion::Unbounded => true,
            LoopRegion::Pinned(p) => pos == p,
            LoopRegion::Contiguous { start, end } => pos >= start && pos <= end,
            LoopRegion::Wrapped { start, end } => pos >= start || pos <= end,
        }
    }
}

/// Advances a [`PlaybackState`] over a buffer of fixed length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionAdvancer {
    len: f64,
    bytes_per_unit: f64,
}

impl PositionAdvancer {
    /// `bytes_per_unit` converts a rate magnitude of 1 to bytes per sample
    pub fn new(len: usize, bytes_per_unit: f64) -> Self {
        Self {
            len: len as f64,
            bytes_per_unit,
        }
    }

    pub fn len(&self) -> f64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0.0
    }

    pub fn bytes_per_unit(&self) -> f64 {
        self.bytes_per_unit
    }

    /// Bytes the cursor moves on the next step
    #[inline]
    pub fn delta(&self, state: &PlaybackState) -> f64 {
        state.rate.to_delta(self.bytes_per_unit)
    }

    /// Move one step and resolve loop bounds
    ///
    /// After return `state.position` lies in `[0, len)`, and inside the loop
    /// region whenever a crossing was resolved. A reflection may flip
    /// `state.rate`.
    #[inline]
    pub fn advance(&self, state: &mut PlaybackState) -> Option<Crossing> {
        if self.is_empty() {
            state.position = 0.0;
            return None;
        }
        let delta = self.delta(state);
        let from = state.position;
        state.position += delta;
        let crossing = self.resolve(state, from, delta);
        state.position = wrap(state.position, self.len);
        crossing
    }

    fn resolve(&self, state: &mut PlaybackState, from: f64, delta: f64) -> Option<Crossing> {
        let forward = delta > 0.0;
        match LoopRegion::classify(state, self.len) {
            LoopRegion::Unbounded => {
                state.position = wrap(state.position, self.len);
                None
            }
            LoopRegion::Pinned(pin) => {
                state.position = pin;
                None
            }
            LoopRegion::Contiguous { start, end } => {
                let span = end - start;
                if forward && state.position > end {
                    let overshoot = state.position - end;
                    Some(Self::exit(state, CrossEvent::CrossUpper, overshoot, start, end, span))
                } else if !forward && state.position < start {
                    let overshoot = start - state.position;
                    Some(Self::exit(state, CrossEvent::CrossLower, overshoot, start, end, span))
                } else {
                    None
                }
            }
            LoopRegion::Wrapped { start, end } => {
                self.resolve_wrapped(state, from, delta, start, end)
            }
        }
    }

    /// Region `[start, len) ∪ [0, end]`, walked as `[0, span]` from `start`
    fn resolve_wrapped(
        &self,
        state: &mut PlaybackState,
        from: f64,
        delta: f64,
        start: f64,
        end: f64,
    ) -> Option<Crossing> {
        let span = self.len - start + end;
        let offset = wrap(from - start, self.len);

        if offset <= span {
            // Started inside: distance along the region decides the exit
            let to = offset + delta;
            return if to > span {
                Some(Self::exit(state, CrossEvent::CrossUpper, to - span, start, end, span))
            } else if to < 0.0 {
                Some(Self::exit(state, CrossEvent::CrossLower, -to, start, end, span))
            } else {
                state.position = wrap(start + to, self.len);
                None
            };
        }

        // Started in the gap (seek or fresh bounds): resolve against the
        // bound being approached
        state.position = wrap(state.position, self.len);
        let in_gap = state.position > end && state.position < start;
        if !in_gap {
            None
        } else if delta > 0.0 {
            let overshoot = state.position - end;
            Some(Self::exit(state, CrossEvent::CrossUpper, overshoot, start, end, span))
        } else {
            let overshoot = start - state.position;
            Some(Self::exit(state, CrossEvent::CrossLower, overshoot, start, end, span))
        }
    }

    /// Resolve a move `overshoot` bytes past the bound named by `event`
    ///
    /// Positions may come out below zero or past the buffer end for a
    /// wrapped region; `advance` wraps them afterwards.
    fn exit(
        state: &mut PlaybackState,
        event: CrossEvent,
        overshoot: f64,
        start: f64,
        end: f64,
        span: f64,
    ) -> Crossing {
        let action = if state.boomerang {
            let (inside, reversed) = fold(overshoot, span);
            state.position = match event {
                CrossEvent::CrossUpper => end - inside,
                CrossEvent::CrossLower => start + inside,
            };
            if reversed {
                state.rate.flip();
            }
            CrossAction::Reflect {
                overshoot,
                reversed,
            }
        } else {
            let target = match event {
                CrossEvent::CrossUpper => start,
                CrossEvent::CrossLower => end,
            };
            state.position = target;
            CrossAction::Wrap { target }
        };
        Crossing { event, action }
    }
}

/// Bounce `overshoot` bytes back and forth inside a region `span` long
///
/// Returns the resting distance from the crossed bound and whether an odd
/// number of mirrors happened (the direction ends reversed).
#[inline]
fn fold(overshoot: f64, span: f64) -> (f64, bool) {
    let cycle = 2.0 * span;
    let rem = overshoot % cycle;
    if rem <= span {
        (rem, true)
    } else {
        (cycle - rem, false)
    }
}

#[cfg(test)]
mod tests;
