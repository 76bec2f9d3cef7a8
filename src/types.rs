//! Shared types used across the transceiver driver
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

/// Transceiver data port
///
/// The transceiver exposes four fixed data paths: two receivers and two
/// transmitters. Ports exist for the lifetime of the device and carry a
/// fixed direction capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    /// Receiver channel 1
    Rx1,
    /// Receiver channel 2
    Rx2,
    /// Transmitter channel 1
    Tx1,
    /// Transmitter channel 2
    Tx2,
}

impl Port {
    /// Number of ports on the device
    pub const COUNT: usize = 4;

    /// All ports in register order
    pub const ALL: [Self; Self::COUNT] = [Self::Rx1, Self::Rx2, Self::Tx1, Self::Tx2];

    /// Get the port's table/register index
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Rx1 => 0,
            Self::Rx2 => 1,
            Self::Tx1 => 2,
            Self::Tx2 => 3,
        }
    }

    /// Get the port's direction capability
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Rx1 | Self::Rx2 => Direction::Receive,
            Self::Tx1 | Self::Tx2 => Direction::Transmit,
        }
    }

    /// Check if this is a transmit port
    #[must_use]
    pub const fn is_tx(self) -> bool {
        matches!(self, Self::Tx1 | Self::Tx2)
    }

    /// Check if this is a receive port
    #[must_use]
    pub const fn is_rx(self) -> bool {
        matches!(self, Self::Rx1 | Self::Rx2)
    }

    /// Get the port name as used on the control console
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rx1 => "Rx1",
            Self::Rx2 => "Rx2",
            Self::Tx1 => "Tx1",
            Self::Tx2 => "Tx2",
        }
    }

    /// Parse a console port name ("Rx1", "Rx2", "Tx1", "Tx2")
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Rx1" => Some(Self::Rx1),
            "Rx2" => Some(Self::Rx2),
            "Tx1" => Some(Self::Tx1),
            "Tx2" => Some(Self::Tx2),
            _ => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Port {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

/// Data direction of a port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Antenna to memory
    Receive,
    /// Memory to antenna
    Transmit,
}

/// Radio activation state of a port
///
/// The hardware enforces an ordered activation sequence; a port only
/// moves between adjacent states. The discriminants give the total order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum RadioState {
    /// Powered but idle, no profile-dependent state
    #[default]
    Standby = 0,
    /// Initial calibrations complete
    Calibrated = 1,
    /// RF front end configured, ready to key
    Primed = 2,
    /// Actively radiating or receiving
    Enabled = 3,
}

impl RadioState {
    /// Get the activation level (0 = Standby .. 3 = Enabled)
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Decode an activation level
    #[must_use]
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Standby),
            1 => Some(Self::Calibrated),
            2 => Some(Self::Primed),
            3 => Some(Self::Enabled),
            _ => None,
        }
    }

    /// Next state up the activation sequence
    #[must_use]
    pub const fn raised(self) -> Option<Self> {
        match self {
            Self::Standby => Some(Self::Calibrated),
            Self::Calibrated => Some(Self::Primed),
            Self::Primed => Some(Self::Enabled),
            Self::Enabled => None,
        }
    }

    /// Next state down the activation sequence
    #[must_use]
    pub const fn lowered(self) -> Option<Self> {
        match self {
            Self::Standby => None,
            Self::Calibrated => Some(Self::Standby),
            Self::Primed => Some(Self::Calibrated),
            Self::Enabled => Some(Self::Primed),
        }
    }

    /// Get the state name as used on the control console
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standby => "Standby",
            Self::Calibrated => "Calibrated",
            Self::Primed => "Primed",
            Self::Enabled => "Enabled",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RadioState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

/// Driver fault code
///
/// Every fallible operation reports exactly one of these. The hardware
/// class ([`Fault::is_hardware`]) additionally latches in the sticky
/// fault register until explicitly cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The port cannot perform the requested operation
    InvalidPort,
    /// A parameter is out of range
    InvalidParameter,
    /// The operation violates the activation/streaming ordering
    InvalidRadioState,
    /// The port's stream still owns the requested resource
    PortDisabled,
    /// Requested transfer exceeds the DMA engine's addressable capacity
    ExceedsDmaBuffer,
    /// The device rejected or failed to acknowledge a command
    Comm,
    /// SPI bus transaction failed
    Spi,
    /// Control GPIO access failed
    Gpio,
    /// DMA engine reported an error
    Dma,
    /// Initial calibration sequence failed
    Calibration,
    /// Prime sequence failed
    Prime,
    /// The device does not support the requested feature
    NotSupported,
}

impl Fault {
    /// Check if this fault latches in the sticky fault register
    ///
    /// Parameter and ordering faults leave no residue; hardware faults
    /// poison the device handle until cleared.
    #[must_use]
    pub const fn is_hardware(self) -> bool {
        matches!(
            self,
            Self::Comm | Self::Spi | Self::Gpio | Self::Dma | Self::Calibration | Self::Prime
        )
    }

    /// Get the fault name as used on the control console
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidPort => "InvalidPort",
            Self::InvalidParameter => "InvalidParameter",
            Self::InvalidRadioState => "InvalidRadioState",
            Self::PortDisabled => "PortDisabled",
            Self::ExceedsDmaBuffer => "ExceedsDmaBuffer",
            Self::Comm => "CommError",
            Self::Spi => "SpiError",
            Self::Gpio => "GpioError",
            Self::Dma => "DmaError",
            Self::Calibration => "ProfileCalError",
            Self::Prime => "ProfilePrimeError",
            Self::NotSupported => "NotSupported",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Fault {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

/// One IQ sample pair as moved by the DMA engine
///
/// Matches the 32-bit wire layout of the sample stream: in-phase word
/// first, quadrature word second.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IqSample {
    /// In-phase component
    pub i: i16,
    /// Quadrature component
    pub q: i16,
}

impl IqSample {
    /// Size of one sample on the bus in bytes
    pub const BYTES: usize = 4;

    /// The zero sample
    pub const ZERO: Self = Self { i: 0, q: 0 };

    /// Create a sample from its components
    #[must_use]
    pub const fn new(i: i16, q: i16) -> Self {
        Self { i, q }
    }
}

/// Junction temperature reading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Temperature {
    /// Temperature in 0.1°C units
    raw_tenths: i16,
}

impl Temperature {
    /// Create from raw tenths of a degree
    #[must_use]
    pub const fn from_tenths(tenths: i16) -> Self {
        Self { raw_tenths: tenths }
    }

    /// Get whole degrees Celsius (truncated toward zero)
    #[must_use]
    pub const fn celsius(self) -> i16 {
        self.raw_tenths / 10
    }

    /// Get raw tenths of a degree Celsius
    #[must_use]
    pub const fn tenths(self) -> i16 {
        self.raw_tenths
    }

    /// Check if over a temperature limit
    #[must_use]
    pub const fn is_over(self, limit_celsius: i16) -> bool {
        self.celsius() > limit_celsius
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Temperature {
    fn format(&self, f: defmt::Formatter) {
        let whole = self.raw_tenths / 10;
        let frac = (self.raw_tenths % 10).unsigned_abs();
        defmt::write!(f, "{}.{}C", whole, frac);
    }
}

/// Silicon revision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiliconVersion {
    /// Major revision letter code (0xA, 0xB, ...)
    pub major: u8,
    /// Minor revision
    pub minor: u8,
}

/// Embedded controller firmware version
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FirmwareVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Maintenance version
    pub maint: u8,
    /// Release-candidate number
    pub rc: u8,
}

/// Device version information
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    /// Silicon revision
    pub silicon: SiliconVersion,
    /// Embedded controller firmware version
    pub firmware: FirmwareVersion,
}
