//! Port Activation Walk
//!
//! The hardware only accepts transitions between adjacent radio states,
//! so any (current, target) request decomposes into an ordered list of
//! sub-transitions. The walk executes front to back and halts at the
//! first sub-transition the hardware rejects; the port then rests at the
//! last state it actually reached.

use crate::types::{Fault, RadioState};
use heapless::Vec;

/// Maximum number of sub-transitions between any two states
pub const MAX_PATH: usize = 3;

/// One hardware-backed sub-transition between adjacent radio states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State the port is in when the sub-transition starts
    pub from: RadioState,
    /// Adjacent state the sub-transition enters
    pub to: RadioState,
}

impl Transition {
    /// Check whether this sub-transition raises the activation level
    #[must_use]
    pub const fn is_escalation(self) -> bool {
        (self.from.level()) < (self.to.level())
    }

    /// Fault reported when the hardware rejects this sub-transition
    ///
    /// Entering Calibrated from below runs the initial calibrations;
    /// entering Primed from below runs the prime sequence. Both have
    /// dedicated fault codes so callers can tell which profile stage
    /// failed. Everything else surfaces as a device communication fault.
    #[must_use]
    pub const fn entry_fault(self) -> Fault {
        match (self.from, self.to) {
            (RadioState::Standby, RadioState::Calibrated) => Fault::Calibration,
            (RadioState::Calibrated, RadioState::Primed) => Fault::Prime,
            _ => Fault::Comm,
        }
    }
}

/// Decompose a state request into its ordered sub-transitions
///
/// Returns an empty path when `from == to`. De-escalation walks the same
/// sequence downward.
#[must_use]
pub fn transition_path(from: RadioState, to: RadioState) -> Vec<Transition, MAX_PATH> {
    let mut path = Vec::new();
    let mut current = from;

    while current != to {
        let next = if current < to {
            current.raised()
        } else {
            current.lowered()
        };

        // Adjacency of the state enum guarantees the walk terminates
        // within MAX_PATH steps.
        let Some(next) = next else { break };
        let _ = path.push(Transition {
            from: current,
            to: next,
        });
        current = next;
    }

    path
}
