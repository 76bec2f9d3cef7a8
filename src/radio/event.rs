//! Stream Events
//!
//! Typed notifications delivered to the single handler the application
//! registers at initialization. Start events fire synchronously from the
//! arming call; done events fire either from the stopping call or from
//! the DMA completion interrupt.

use crate::types::{Fault, Port};

/// Stream lifecycle event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// A stream was armed and the DMA engine is running
    Started {
        /// Port the stream belongs to
        port: Port,
    },
    /// A stream finished, by natural completion or explicit stop
    Done {
        /// Port the stream belonged to
        port: Port,
        /// `Ok` for a clean finish, the DMA fault otherwise
        result: Result<(), Fault>,
    },
}

impl StreamEvent {
    /// Port the event refers to
    #[must_use]
    pub const fn port(&self) -> Port {
        match self {
            Self::Started { port } | Self::Done { port, .. } => *port,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StreamEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Started { port } => defmt::write!(f, "StreamStart({})", port),
            Self::Done { port, result } => match result {
                Ok(()) => defmt::write!(f, "StreamDone({})", port),
                Err(fault) => defmt::write!(f, "StreamDone({}, {})", port, fault),
            },
        }
    }
}

/// Application callback for stream events
///
/// Done events for natural completions are delivered from interrupt
/// context; implementations must not block and must not issue bus
/// transactions.
pub trait EventHandler: Sync {
    /// Handle one event. Invoked at most once per discrete occurrence.
    fn on_event(&self, event: StreamEvent);
}

/// Funnel for stream events
///
/// The single point where completion-path and foreground outcomes become
/// handler invocations. Marshals already-known data only; performs no
/// hardware access of its own.
pub struct EventDispatcher<'d> {
    handler: &'d dyn EventHandler,
}

impl<'d> EventDispatcher<'d> {
    /// Bind the dispatcher to the registered handler
    #[must_use]
    pub const fn new(handler: &'d dyn EventHandler) -> Self {
        Self { handler }
    }

    /// Deliver one event to the handler
    pub fn dispatch(&self, event: StreamEvent) {
        log::trace!("event: {event:?}");
        self.handler.on_event(event);
    }
}
