//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the transceiver
//! hardware. Pin mappings, bus frequencies, and engine limits are
//! centralized here.

/// SPI clock frequency for the transceiver control interface
pub const SPI_FREQUENCY_HZ: u32 = 20_000_000;

/// Largest sample count a single DMA transfer can address
///
/// The transfer-length register counts bytes in a 26-bit field; one IQ
/// sample occupies four bytes on the bus.
pub const DMA_MAX_SAMPLES: u32 = (1 << 26) / 4;

/// Radio profile image size in bytes
pub const PROFILE_SIZE: usize = 0x8_0000;

/// Profile blob transfer chunk size in bytes
pub const PROFILE_CHUNK: usize = 256;

/// Register polls before a state or calibration request is abandoned
pub const STATE_POLL_BUDGET: u32 = 1_000;

/// Maximum transmit attenuation in milli-dB (41.95 dB)
pub const TX_ATTEN_MAX_MDB: u16 = 41_950;

/// Reset pulse width in nanoseconds
pub const RESET_PULSE_NS: u32 = 200_000;

/// Settle time after reset deassertion in nanoseconds
pub const RESET_SETTLE_NS: u32 = 1_000_000;

/// Maximum console command length in bytes
pub const CONSOLE_CMD_LEN: usize = 64;

/// Maximum console response length in bytes
pub const CONSOLE_RESP_LEN: usize = 96;

/// Pin assignments for GPIO
pub mod pins {
    //! Control GPIO assignments matching the schematic

    /// Transceiver RESETN (active low)
    pub const RESETN: &str = "PD4";

    /// Rx1 enable
    pub const RX1_EN: &str = "PB0";

    /// Rx2 enable
    pub const RX2_EN: &str = "PB1";

    /// Tx1 enable
    pub const TX1_EN: &str = "PB2";

    /// Tx2 enable
    pub const TX2_EN: &str = "PB3";

    /// Transceiver interrupt request
    pub const IRQ: &str = "PC9";

    /// SPI chip select
    pub const SPI_CS: &str = "PA4";
}
