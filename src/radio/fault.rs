//! Sticky Fault Latch
//!
//! The most recent hardware fault latches here until the caller clears
//! it. Operations consult the latch before touching hardware and fail
//! with the stored code while it is set, so a fault is never silently
//! papered over by a later call.

use crate::types::Fault;

/// Latched hardware fault state
#[derive(Debug, Default)]
pub struct FaultLatch {
    pending: Option<Fault>,
}

impl FaultLatch {
    /// Create a cleared latch
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Fail fast with the pending fault, if any
    pub const fn check(&self) -> Result<(), Fault> {
        match self.pending {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Record a fault if it belongs to the hardware class
    ///
    /// Parameter and ordering faults pass through without latching.
    pub fn latch(&mut self, fault: Fault) {
        if fault.is_hardware() {
            self.pending = Some(fault);
        }
    }

    /// Acknowledge and clear the pending fault
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Read the pending fault without clearing it
    #[must_use]
    pub const fn pending(&self) -> Option<Fault> {
        self.pending
    }
}
