//! Hardware Interface
//!
//! Traits implemented by the board support layer. The driver is generic
//! over these seams: control GPIO, the per-port sample DMA engine, and
//! (through `embedded_hal::spi::SpiDevice`) the shared SPI bus. Mock
//! implementations drive the host-side tests.

use crate::types::Port;

/// Control GPIO lines for the transceiver
///
/// One enable line per port plus the shared active-low reset line.
/// Driving a transmit port's enable line high keys the power amplifier.
pub trait RadioPins {
    /// GPIO access error
    type Error: core::fmt::Debug;

    /// Drive a port's enable pin
    fn set_enable(&mut self, port: Port, high: bool) -> Result<(), Self::Error>;

    /// Drive the RESETN line
    fn set_reset(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// One programmed DMA transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Bus address of the first sample
    pub addr: usize,
    /// Number of IQ samples to move
    pub samples: u32,
    /// Loop over the buffer until disarmed
    pub cyclic: bool,
}

/// Per-port sample DMA engine
///
/// Arming starts the transfer and returns immediately; completion is
/// signalled exclusively through the completion interrupt, which the
/// board routes to [`StreamIrq::on_transfer_complete`].
///
/// [`StreamIrq::on_transfer_complete`]: crate::xcvr::StreamIrq::on_transfer_complete
pub trait SampleDma {
    /// DMA engine access error
    type Error: core::fmt::Debug;

    /// Largest sample count a single transfer on `port` can address
    fn capacity(&self, port: Port) -> u32;

    /// Whether a DMA channel is wired to `port` at all
    ///
    /// A board may only route sample channels to a subset of the ports;
    /// streaming on an unwired port is a capability mismatch.
    fn is_bound(&self, port: Port) -> bool;

    /// Program and start a transfer on `port`
    fn arm(&mut self, port: Port, transfer: Transfer) -> Result<(), Self::Error>;

    /// Halt any transfer in flight on `port`
    fn disarm(&mut self, port: Port) -> Result<(), Self::Error>;
}
