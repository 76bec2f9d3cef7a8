//! Shared mock hardware for the driver tests
//!
//! The mocks emulate the board seams the driver is generic over: the
//! RFIC register file behind the SPI bus, the control GPIO block, the
//! per-port sample DMA engine, and the application event handler. Each
//! mock hands out a cloneable handle over shared state so tests can
//! script failures and inspect what the driver did after the fact.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use xcvr_driver::drivers::rfic::{bits, reg};
use xcvr_driver::hal::{RadioPins, SampleDma, Transfer};
use xcvr_driver::radio::event::{EventHandler, StreamEvent};
use xcvr_driver::types::{IqSample, Port};

/// Leak a zeroed sample buffer for the lifetime of the test process
pub fn leak_buf(samples: usize) -> &'static mut [IqSample] {
    Box::leak(vec![IqSample::ZERO; samples].into_boxed_slice())
}

// ============================================================================
// RFIC register file behind the SPI bus
// ============================================================================

/// Size of the emulated register file
const REG_SPACE: usize = 0x100;

/// Bus-level SPI failure
#[derive(Debug)]
pub struct SpiFault;

impl embedded_hal::spi::Error for SpiFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Emulated chip state, shared between the driver's SPI handle and the test
pub struct ChipState {
    /// Register file
    pub regs: [u8; REG_SPACE],
    /// Fail every bus transaction
    pub fail_bus: bool,
    /// Per-port calibration requests that the chip rejects
    pub fail_cal: [bool; 4],
    /// (port index, requested level) state requests that the chip rejects
    pub fail_state: Vec<(usize, u8)>,
    /// Reject the profile commit
    pub fail_profile: bool,
    /// Bytes streamed into the profile window since the last start
    pub profile_bytes: usize,
    /// Completed bus transactions
    pub xfers: usize,
}

impl ChipState {
    fn new() -> Self {
        let mut regs = [0u8; REG_SPACE];
        // Silicon B0, firmware 1.4.0.2
        regs[reg::SILICON_REV as usize] = 0xB0;
        regs[reg::FW_VERSION as usize] = 1;
        regs[reg::FW_VERSION as usize + 1] = 4;
        regs[reg::FW_VERSION as usize + 2] = 0;
        regs[reg::FW_VERSION as usize + 3] = 2;
        // 34.5 C junction temperature
        regs[reg::TEMP as usize..reg::TEMP as usize + 2].copy_from_slice(&345i16.to_le_bytes());
        for port in Port::ALL {
            let idx = port.index();
            regs[reg::SAMPLE_RATE as usize + 4 * idx..reg::SAMPLE_RATE as usize + 4 * idx + 4]
                .copy_from_slice(&15_360_000u32.to_le_bytes());
            let carrier = 900_000_000u64 + 1_000_000 * idx as u64;
            regs[reg::CARRIER_FREQ as usize + 8 * idx..reg::CARRIER_FREQ as usize + 8 * idx + 8]
                .copy_from_slice(&carrier.to_le_bytes());
        }
        Self {
            regs,
            fail_bus: false,
            fail_cal: [false; 4],
            fail_state: Vec::new(),
            fail_profile: false,
            profile_bytes: 0,
            xfers: 0,
        }
    }

    /// Apply a single register write with its side effects
    fn reg_write(&mut self, addr: u16, value: u8) {
        let a = addr as usize;
        if addr == reg::PROFILE_CTRL {
            self.regs[a] = value;
            if value == bits::CTRL_START {
                self.profile_bytes = 0;
            }
            if value == bits::CTRL_COMMIT {
                self.regs[reg::PROFILE_STATUS as usize] = if self.fail_profile {
                    bits::STATUS_ERROR
                } else {
                    0
                };
            }
        } else if addr == reg::PROFILE_DATA {
            self.profile_bytes += 1;
        } else if (reg::STATE_REQUEST..reg::STATE_REQUEST + 4).contains(&addr) {
            let port = (addr - reg::STATE_REQUEST) as usize;
            if self.fail_state.contains(&(port, value)) {
                self.regs[reg::STATE_STATUS as usize + port] = bits::STATUS_ERROR;
            } else {
                self.regs[reg::CHANNEL_STATE as usize + port] = value;
                self.regs[reg::STATE_STATUS as usize + port] = 0;
            }
        } else if (reg::CAL_REQUEST..reg::CAL_REQUEST + 4).contains(&addr) {
            let port = (addr - reg::CAL_REQUEST) as usize;
            if self.fail_cal[port] {
                self.regs[reg::CAL_STATUS as usize + port] = bits::STATUS_ERROR;
            } else {
                self.regs[reg::CAL_STATUS as usize + port] = 0;
                self.regs[reg::CHANNEL_STATE as usize + port] = 1;
            }
        } else {
            self.regs[a] = value;
        }
    }

    /// Apply a block write starting at `addr`
    fn block_write(&mut self, addr: u16, data: &[u8]) {
        if addr == reg::PROFILE_DATA {
            // Auto-increment window: every byte lands in the same port
            self.profile_bytes += data.len();
        } else {
            for (offset, &value) in data.iter().enumerate() {
                self.reg_write(addr + offset as u16, value);
            }
        }
    }
}

/// SPI handle implementing the RFIC frame protocol against [`ChipState`]
#[derive(Clone)]
pub struct MockSpi {
    state: Arc<Mutex<ChipState>>,
}

impl MockSpi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChipState::new())),
        }
    }

    /// Lock the emulated chip for scripting or inspection
    pub fn chip(&self) -> MutexGuard<'_, ChipState> {
        self.state.lock().unwrap()
    }
}

impl ErrorType for MockSpi {
    type Error = SpiFault;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), SpiFault> {
        let mut chip = self.state.lock().unwrap();
        chip.xfers += 1;
        if chip.fail_bus {
            return Err(SpiFault);
        }

        // First write carries the address header; later operations move
        // data at that address.
        let mut target: Option<(u16, bool)> = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => match target {
                    None => {
                        assert!(bytes.len() >= 2, "frame too short for an address header");
                        let write = bytes[0] & 0x80 != 0;
                        let addr = u16::from(bytes[0] & 0x7F) << 8 | u16::from(bytes[1]);
                        target = Some((addr, write));
                        if write && bytes.len() > 2 {
                            chip.block_write(addr, &bytes[2..]);
                        }
                    }
                    Some((addr, true)) => chip.block_write(addr, *bytes),
                    Some((_, false)) => panic!("data write inside a read frame"),
                },
                Operation::Read(buf) => {
                    let (addr, _) = target.expect("read without an address header");
                    for (offset, slot) in buf.iter_mut().enumerate() {
                        *slot = chip.regs[addr as usize + offset];
                    }
                }
                Operation::DelayNs(_) => {}
                _ => panic!("unexpected SPI operation"),
            }
        }
        Ok(())
    }
}

// ============================================================================
// Control GPIO block
// ============================================================================

/// GPIO access failure
#[derive(Debug)]
pub struct PinFault;

/// Recorded GPIO state
pub struct PinState {
    /// Per-port enable line levels
    pub enable: [bool; 4],
    /// RESETN line level
    pub reset_high: bool,
    /// Fail every pin access
    pub fail: bool,
    /// RESETN low pulses seen
    pub reset_pulses: usize,
}

/// Pin handle the driver drives
#[derive(Clone)]
pub struct MockPins {
    state: Arc<Mutex<PinState>>,
}

impl MockPins {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PinState {
                enable: [false; 4],
                reset_high: true,
                fail: false,
                reset_pulses: 0,
            })),
        }
    }

    pub fn pins(&self) -> MutexGuard<'_, PinState> {
        self.state.lock().unwrap()
    }
}

impl RadioPins for MockPins {
    type Error = PinFault;

    fn set_enable(&mut self, port: Port, high: bool) -> Result<(), PinFault> {
        let mut state = self.state.lock().unwrap();
        if state.fail {
            return Err(PinFault);
        }
        state.enable[port.index()] = high;
        Ok(())
    }

    fn set_reset(&mut self, high: bool) -> Result<(), PinFault> {
        let mut state = self.state.lock().unwrap();
        if state.fail {
            return Err(PinFault);
        }
        if state.reset_high && !high {
            state.reset_pulses += 1;
        }
        state.reset_high = high;
        Ok(())
    }
}

// ============================================================================
// Sample DMA engine
// ============================================================================

/// DMA engine failure
#[derive(Debug)]
pub struct DmaFault;

/// Recorded DMA engine state
pub struct DmaState {
    /// Ports with a wired sample channel
    pub bound: [bool; 4],
    /// Addressable capacity in samples
    pub capacity: u32,
    /// Transfer currently armed per port
    pub armed: [Option<Transfer>; 4],
    /// Arm calls seen
    pub arms: usize,
    /// Disarm calls seen
    pub disarms: usize,
    /// Fail the next arm
    pub fail_arm: bool,
    /// Fail the next disarm
    pub fail_disarm: bool,
}

/// DMA handle the driver programs
#[derive(Clone)]
pub struct MockDma {
    state: Arc<Mutex<DmaState>>,
}

impl MockDma {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DmaState {
                bound: [true; 4],
                capacity: 65_536,
                armed: [None; 4],
                arms: 0,
                disarms: 0,
                fail_arm: false,
                fail_disarm: false,
            })),
        }
    }

    pub fn dma(&self) -> MutexGuard<'_, DmaState> {
        self.state.lock().unwrap()
    }
}

impl SampleDma for MockDma {
    type Error = DmaFault;

    fn capacity(&self, _port: Port) -> u32 {
        self.state.lock().unwrap().capacity
    }

    fn is_bound(&self, port: Port) -> bool {
        self.state.lock().unwrap().bound[port.index()]
    }

    fn arm(&mut self, port: Port, transfer: Transfer) -> Result<(), DmaFault> {
        let mut state = self.state.lock().unwrap();
        if state.fail_arm {
            return Err(DmaFault);
        }
        state.armed[port.index()] = Some(transfer);
        state.arms += 1;
        Ok(())
    }

    fn disarm(&mut self, port: Port) -> Result<(), DmaFault> {
        let mut state = self.state.lock().unwrap();
        if state.fail_disarm {
            return Err(DmaFault);
        }
        state.armed[port.index()] = None;
        state.disarms += 1;
        Ok(())
    }
}

// ============================================================================
// Event sink
// ============================================================================

/// Recording event handler
#[derive(Default)]
pub struct EventSink {
    events: Mutex<Vec<StreamEvent>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain every recorded event
    pub fn take(&self) -> Vec<StreamEvent> {
        std::mem::take(&mut self.events.lock().unwrap())
    }

    /// Number of recorded events without draining
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventHandler for EventSink {
    fn on_event(&self, event: StreamEvent) {
        self.events.lock().unwrap().push(event);
    }
}
