//! Quad-Port RF Transceiver Interface Driver
//!
//! This library drives a four-port RF transceiver IC: two receivers and
//! two transmitters, each walking a hardware-enforced activation
//! sequence (Standby → Calibrated → Primed → Enabled) and each able to
//! stream IQ samples over a dedicated DMA channel. Stream completions
//! arrive asynchronously from interrupt context and surface as typed
//! events through a caller-registered handler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CONTROL SURFACE                          │
//! │        Console Protocol  │  Application Event Handler        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      DRIVER FACADE                           │
//! │   Activation Walk  │  Stream Engine  │  Event Dispatch       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     REGISTER LAYER                           │
//! │              RFIC command/status over SPI                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  BOARD SUPPORT (traits)                      │
//! │   SpiDevice  │  RadioPins  │  SampleDma  │  IRQ routing      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Type-driven design**: Custom types enforce invariants at compile time
//! - **Exclusive buffer ownership**: An armed stream's buffer is
//!   unreachable until its done event; no aliasing with the DMA engine
//! - **No unsafe anywhere**: Ownership transfer is expressed with moves,
//!   not pointers
//! - **Functional core, imperative shell**: Transition tables and slot
//!   logic are pure; hardware execution lives in the facade
//! - **Explicit error handling**: Every fallible operation returns a
//!   `Result` with exactly one fault code

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// System configuration and constants
pub mod config;

/// Peripheral Drivers
///
/// Register-level driver for the transceiver RFIC.
pub mod drivers;

/// Hardware Interface
///
/// Traits the board support layer implements.
pub mod hal;

/// Communication Protocols
///
/// Control console command parser and response formatter.
pub mod protocol;

/// Radio Port Control
///
/// State machines and business logic for port activation and streaming.
pub mod radio;

/// Shared types used across modules
pub mod types;

/// Transceiver Interface Driver
///
/// The driver facade and its interrupt-side completion handle.
pub mod xcvr;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::hal::{RadioPins, SampleDma, Transfer};
    pub use crate::radio::event::{EventHandler, StreamEvent};
    pub use crate::radio::stream::StreamRejected;
    pub use crate::types::*;
    pub use crate::xcvr::{SharedState, StreamIrq, Xcvr};

    // Error handling
    pub use core::result::Result;
}
