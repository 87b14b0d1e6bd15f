//! Discrete control commands
//!
//! Each variant is one whole-field mutation of the session, applied between
//! audio blocks by [`Session::apply`](crate::Session::apply).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    TogglePause,
    ToggleMute,
    /// One ladder step toward larger signed rate
    IncreaseRate,
    /// One ladder step toward smaller signed rate
    DecreaseRate,
    ReverseDirection,
    /// Rate to `+baseline`
    ResetDefault,
    /// `|rate|`, baseline when zero
    ForcePositive,
    /// `-|rate|`, baseline when zero
    ForceNegative,
    /// Move the cursor by this many bytes
    SeekRelative(f64),
    /// Move the cursor to this byte
    SeekAbsolute(f64),
    ToggleLoop,
    ToggleBoomerang,
    /// Loop start to the cursor (only while looping is off)
    SetLoopStartHere,
    /// Loop end to the cursor (only while looping is off)
    SetLoopEndHere,
    /// Set both loop bounds in bytes
    SetLoop { start: f64, end: f64 },
    AdjustVolume(f64),
    /// Coarse rate increase
    JumpRateUp,
    /// Coarse rate decrease
    JumpRateDown,
    /// Seek by whole frames
    StepFrame(i32),
    SeekStart,
    SeekLastFrame,
    /// Cursor to 0, rate to `+baseline`, unpause
    Restart,
    /// Rate magnitude to zero without pausing
    Freeze,
}
