//! GPIO / peripheral pin assignments for the door sensor board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Door contact
// ---------------------------------------------------------------------------

/// Reed switch between this pin and GND; internal pull-up enabled.
/// HIGH = magnet away (door open), LOW = magnet present (door closed).
pub const DOOR_SENSOR_GPIO: i32 = 15;
