//! IQ Stream Descriptors
//!
//! Per-port stream slot with exclusive buffer ownership. While a slot is
//! armed the sample buffer belongs to the DMA engine; the caller only
//! gets it back after the stream has stopped or completed.
//!
//! ```text
//!     IDLE ──arm()──> ACTIVE ──stop()/complete()──> PARKED ──reclaim()──> IDLE
//! ```

use crate::types::{Fault, IqSample};

/// Validate an arm request before any hardware is touched
///
/// `samples` must be non-zero and fit the DMA engine's addressable
/// capacity.
pub const fn validate_arm(samples: u32, capacity: u32) -> Result<(), Fault> {
    if samples == 0 {
        return Err(Fault::InvalidParameter);
    }
    if samples > capacity {
        return Err(Fault::ExceedsDmaBuffer);
    }
    Ok(())
}

/// A refused arm request
///
/// Carries the fault code together with the untouched sample buffer, so
/// a rejected caller keeps ownership of its memory.
#[derive(Debug)]
pub struct StreamRejected {
    /// Why the arm was refused
    pub fault: Fault,
    /// The sample buffer, returned to the caller
    pub buf: &'static mut [IqSample],
}

/// Per-port stream descriptor slot
///
/// At most one live descriptor exists per port. The buffer reference is
/// present from arm until reclaim; the active flag marks the DMA-owned
/// window.
#[derive(Debug, Default)]
pub struct StreamSlot {
    active: bool,
    cyclic: bool,
    samples: u32,
    buf: Option<&'static mut [IqSample]>,
}

impl StreamSlot {
    /// Create an idle slot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: false,
            cyclic: false,
            samples: 0,
            buf: None,
        }
    }

    /// Check whether a stream is currently armed
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Check whether the armed stream loops over its buffer
    #[must_use]
    pub const fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    /// Sample count of the current descriptor
    #[must_use]
    pub const fn samples(&self) -> u32 {
        self.samples
    }

    /// Install a new descriptor and transfer the buffer to the DMA engine
    ///
    /// While a stream is armed the request is refused and the buffer is
    /// handed straight back in `Err`. A parked buffer from an earlier,
    /// never-reclaimed stream is dropped.
    pub fn arm(
        &mut self,
        buf: &'static mut [IqSample],
        samples: u32,
        cyclic: bool,
    ) -> Result<(), &'static mut [IqSample]> {
        if self.active {
            return Err(buf);
        }
        self.buf = Some(buf);
        self.samples = samples;
        self.cyclic = cyclic;
        self.active = true;
        Ok(())
    }

    /// Foreground stop
    ///
    /// Returns `true` when a stream was actually armed, `false` for the
    /// harmless no-op case.
    pub fn stop(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }

    /// Completion-path deactivation
    ///
    /// Returns `false` for a stale interrupt on an already-idle slot, so
    /// the caller emits at most one done event per armed stream.
    pub fn complete(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        true
    }

    /// Return the parked buffer to the caller
    ///
    /// Fails with `PortDisabled` while the DMA engine still owns the
    /// buffer. Yields `None` when no buffer is parked.
    pub fn reclaim(&mut self) -> Result<Option<&'static mut [IqSample]>, Fault> {
        if self.active {
            return Err(Fault::PortDisabled);
        }
        Ok(self.buf.take())
    }
}
