//! Edge detection over consecutive stable door states.

use super::door::DoorState;

/// A change between two stable states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    Closed,
}

impl Transition {
    /// State the door is in after this transition.
    pub const fn target(self) -> DoorState {
        match self {
            Self::Opened => DoorState::Open,
            Self::Closed => DoorState::Closed,
        }
    }
}

/// Pure comparison of two stable states.
pub fn detect(previous: DoorState, current: DoorState) -> Option<Transition> {
    match (previous, current) {
        (DoorState::Closed, DoorState::Open) => Some(Transition::Opened),
        (DoorState::Open, DoorState::Closed) => Some(Transition::Closed),
        _ => None,
    }
}

/// Remembers the last stable state so callers only feed the current one.
///
/// The very first update has no predecessor and never yields a transition.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    previous: Option<DoorState>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Start from a known state (used when the initial sample is taken).
    pub fn seeded(state: DoorState) -> Self {
        Self {
            previous: Some(state),
        }
    }

    pub fn update(&mut self, current: DoorState) -> Option<Transition> {
        let transition = self.previous.and_then(|prev| detect(prev, current));
        self.previous = Some(current);
        transition
    }
}
