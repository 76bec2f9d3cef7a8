//! Transceiver RFIC Register Interface
//!
//! Blocking SPI command layer for the radio IC. Frames carry a 15-bit
//! register address with the read/write flag in the top bit; multi-byte
//! registers auto-increment. State and calibration requests complete
//! asynchronously inside the chip and are polled through per-port status
//! registers.
//!
//! This layer reports bus failures as [`Fault::Spi`] and chip-side
//! rejections as [`Fault::Comm`]; the caller maps chip rejections onto
//! the activation step that triggered them.

use embedded_hal::spi::{Operation, SpiDevice};

use crate::config;
use crate::types::{Fault, FirmwareVersion, Port, RadioState, SiliconVersion, Temperature, VersionInfo};

/// Register addresses
pub mod reg {
    /// Silicon revision, major nibble / minor nibble
    pub const SILICON_REV: u16 = 0x0000;
    /// Controller firmware version, four consecutive bytes
    pub const FW_VERSION: u16 = 0x0001;
    /// Junction temperature, signed tenths of a degree, two bytes LE
    pub const TEMP: u16 = 0x000C;
    /// Requested radio state, one register per port
    pub const STATE_REQUEST: u16 = 0x0020;
    /// State request status, one register per port
    pub const STATE_STATUS: u16 = 0x0024;
    /// Current radio state, one register per port
    pub const CHANNEL_STATE: u16 = 0x0028;
    /// Initial calibration request, one register per port
    pub const CAL_REQUEST: u16 = 0x0030;
    /// Calibration status, one register per port
    pub const CAL_STATUS: u16 = 0x0034;
    /// Internal loopback control, one bit per port
    pub const LOOPBACK_CTRL: u16 = 0x0040;
    /// Transmit power boost, one register per TX lane
    pub const TX_BOOST: u16 = 0x0044;
    /// Transmit attenuation in milli-dB, two bytes LE per TX lane
    pub const TX_ATTEN: u16 = 0x0048;
    /// SSI sample rate in Hz, four bytes LE per port
    pub const SAMPLE_RATE: u16 = 0x0050;
    /// Carrier frequency in Hz, eight bytes LE per port
    pub const CARRIER_FREQ: u16 = 0x0060;
    /// Profile loader control
    pub const PROFILE_CTRL: u16 = 0x0070;
    /// Profile loader status
    pub const PROFILE_STATUS: u16 = 0x0071;
    /// Profile data window, auto-increment
    pub const PROFILE_DATA: u16 = 0x0072;
}

/// Register bit definitions
pub mod bits {
    /// Request still in progress
    pub const STATUS_BUSY: u8 = 0x01;
    /// Request rejected by the chip
    pub const STATUS_ERROR: u8 = 0x02;
    /// Start a calibration or profile load
    pub const CTRL_START: u8 = 0x01;
    /// Commit a loaded profile image
    pub const CTRL_COMMIT: u8 = 0x02;
    /// Boost enabled
    pub const BOOST_EN: u8 = 0x01;
}

/// Write flag in the first frame byte
const WRITE_FLAG: u8 = 0x80;

/// Register-level driver for the transceiver RFIC
pub struct Rfic<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Rfic<SPI> {
    /// Wrap an owned SPI device
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Release the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Write a single register
    pub fn write_register(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        let frame = [WRITE_FLAG | addr_hi(addr), addr_lo(addr), value];
        self.spi.write(&frame).map_err(spi_fault)
    }

    /// Read a single register
    pub fn read_register(&mut self, addr: u16) -> Result<u8, Fault> {
        let mut value = [0u8];
        self.read_block(addr, &mut value)?;
        Ok(value[0])
    }

    /// Read consecutive registers into `buf`
    fn read_block(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Fault> {
        let header = [addr_hi(addr), addr_lo(addr)];
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(buf)])
            .map_err(spi_fault)
    }

    /// Write a block to an auto-increment window
    fn write_block(&mut self, addr: u16, data: &[u8]) -> Result<(), Fault> {
        let header = [WRITE_FLAG | addr_hi(addr), addr_lo(addr)];
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Write(data)])
            .map_err(spi_fault)
    }

    /// Hold the bus idle for `ns` nanoseconds
    pub(crate) fn settle(&mut self, ns: u32) -> Result<(), Fault> {
        self.spi
            .transaction(&mut [Operation::DelayNs(ns)])
            .map_err(spi_fault)
    }

    /// Poll a status register until the chip reports ready
    fn poll_ready(&mut self, status_addr: u16) -> Result<(), Fault> {
        for _ in 0..config::STATE_POLL_BUDGET {
            let status = self.read_register(status_addr)?;
            if status & bits::STATUS_BUSY == 0 {
                if status & bits::STATUS_ERROR != 0 {
                    return Err(Fault::Comm);
                }
                return Ok(());
            }
        }
        log::warn!("rfic: status poll budget exhausted at {status_addr:#06x}");
        Err(Fault::Comm)
    }

    /// Read the current radio state of a port
    pub fn channel_state(&mut self, port: Port) -> Result<RadioState, Fault> {
        let raw = self.read_register(reg::CHANNEL_STATE + port.index() as u16)?;
        RadioState::from_level(raw & 0x03).ok_or(Fault::Comm)
    }

    /// Request a radio state and wait for the chip to acknowledge
    ///
    /// The chip only accepts adjacent-state requests; the caller walks
    /// longer paths one request at a time.
    pub fn request_state(&mut self, port: Port, state: RadioState) -> Result<(), Fault> {
        log::trace!("rfic: {} request state {}", port.name(), state.name());
        self.write_register(reg::STATE_REQUEST + port.index() as u16, state.level())?;
        self.poll_ready(reg::STATE_STATUS + port.index() as u16)?;
        if self.channel_state(port)? != state {
            return Err(Fault::Comm);
        }
        Ok(())
    }

    /// Run the initial calibration sequence for a port
    pub fn run_init_cals(&mut self, port: Port) -> Result<(), Fault> {
        log::trace!("rfic: {} run init cals", port.name());
        self.write_register(reg::CAL_REQUEST + port.index() as u16, bits::CTRL_START)?;
        self.poll_ready(reg::CAL_STATUS + port.index() as u16)
    }

    /// Read the junction temperature
    pub fn temperature(&mut self) -> Result<Temperature, Fault> {
        let mut raw = [0u8; 2];
        self.read_block(reg::TEMP, &mut raw)?;
        Ok(Temperature::from_tenths(i16::from_le_bytes(raw)))
    }

    /// Read silicon and firmware version information
    pub fn version_info(&mut self) -> Result<VersionInfo, Fault> {
        let rev = self.read_register(reg::SILICON_REV)?;
        let mut fw = [0u8; 4];
        self.read_block(reg::FW_VERSION, &mut fw)?;
        Ok(VersionInfo {
            silicon: SiliconVersion {
                major: rev >> 4,
                minor: rev & 0x0F,
            },
            firmware: FirmwareVersion {
                major: fw[0],
                minor: fw[1],
                maint: fw[2],
                rc: fw[3],
            },
        })
    }

    /// Read a TX port's attenuation in milli-dB
    pub fn tx_attenuation(&mut self, port: Port) -> Result<u16, Fault> {
        let mut raw = [0u8; 2];
        self.read_block(reg::TX_ATTEN + 2 * tx_lane(port)?, &mut raw)?;
        Ok(u16::from_le_bytes(raw))
    }

    /// Set a TX port's attenuation in milli-dB
    pub fn set_tx_attenuation(&mut self, port: Port, attn_mdb: u16) -> Result<(), Fault> {
        let raw = attn_mdb.to_le_bytes();
        self.write_block(reg::TX_ATTEN + 2 * tx_lane(port)?, &raw)
    }

    /// Read a TX port's power boost setting
    pub fn tx_boost(&mut self, port: Port) -> Result<bool, Fault> {
        let raw = self.read_register(reg::TX_BOOST + tx_lane(port)?)?;
        Ok(raw & bits::BOOST_EN != 0)
    }

    /// Enable or disable a TX port's power boost
    pub fn set_tx_boost(&mut self, port: Port, enable: bool) -> Result<(), Fault> {
        let value = if enable { bits::BOOST_EN } else { 0 };
        self.write_register(reg::TX_BOOST + tx_lane(port)?, value)
    }

    /// Read a port's SSI sample rate in Hz
    pub fn sample_rate(&mut self, port: Port) -> Result<u32, Fault> {
        let mut raw = [0u8; 4];
        self.read_block(reg::SAMPLE_RATE + 4 * port.index() as u16, &mut raw)?;
        Ok(u32::from_le_bytes(raw))
    }

    /// Read a port's carrier frequency in Hz
    pub fn carrier_frequency(&mut self, port: Port) -> Result<u64, Fault> {
        let mut raw = [0u8; 8];
        self.read_block(reg::CARRIER_FREQ + 8 * port.index() as u16, &mut raw)?;
        Ok(u64::from_le_bytes(raw))
    }

    /// Route a port through its internal loopback path
    pub fn set_loopback(&mut self, port: Port, enable: bool) -> Result<(), Fault> {
        let mut ctrl = self.read_register(reg::LOOPBACK_CTRL)?;
        let bit = 1u8 << port.index();
        if enable {
            ctrl |= bit;
        } else {
            ctrl &= !bit;
        }
        self.write_register(reg::LOOPBACK_CTRL, ctrl)
    }

    /// Load and commit a radio profile image
    pub fn load_profile(&mut self, image: &[u8]) -> Result<(), Fault> {
        log::debug!("rfic: loading {} byte profile", image.len());
        self.write_register(reg::PROFILE_CTRL, bits::CTRL_START)?;
        for chunk in image.chunks(config::PROFILE_CHUNK) {
            self.write_block(reg::PROFILE_DATA, chunk)?;
        }
        self.write_register(reg::PROFILE_CTRL, bits::CTRL_COMMIT)?;
        self.poll_ready(reg::PROFILE_STATUS)
    }
}

/// High byte of a register address
const fn addr_hi(addr: u16) -> u8 {
    ((addr >> 8) & 0x7F) as u8
}

/// Low byte of a register address
const fn addr_lo(addr: u16) -> u8 {
    (addr & 0xFF) as u8
}

/// TX lane index of a transmit port
const fn tx_lane(port: Port) -> Result<u16, Fault> {
    match port {
        Port::Tx1 => Ok(0),
        Port::Tx2 => Ok(1),
        Port::Rx1 | Port::Rx2 => Err(Fault::InvalidPort),
    }
}

/// Map a bus error onto the driver fault code
fn spi_fault<E: core::fmt::Debug>(err: E) -> Fault {
    log::debug!("rfic: spi transaction failed: {err:?}");
    Fault::Spi
}
