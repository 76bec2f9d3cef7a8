//! Transceiver Interface Driver
//!
//! The foreground driver facade plus the interrupt-side completion
//! handle. [`Xcvr`] owns the hardware and executes every blocking
//! operation; [`StreamIrq`] is handed to the DMA completion interrupt
//! and only flips descriptor state and raises events.
//!
//! Both sides share one [`SharedState`]: the per-port radio states,
//! stream descriptors, and the sticky fault latch live behind a
//! critical-section mutex so a foreground decision to arm a stream is
//! atomic with respect to a completion deactivating it. The SPI bus is
//! serialized by construction: all bus traffic goes through the single
//! `&mut Xcvr`.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::spi::SpiDevice;

use crate::config;
use crate::drivers::rfic::Rfic;
use crate::hal::{RadioPins, SampleDma, Transfer};
use crate::radio::event::{EventDispatcher, EventHandler, StreamEvent};
use crate::radio::fault::FaultLatch;
use crate::radio::state::{transition_path, Transition};
use crate::radio::stream::{validate_arm, StreamRejected, StreamSlot};
use crate::types::{Fault, IqSample, Port, RadioState, Temperature, VersionInfo};

/// Per-port state shared between the foreground and completion paths
struct PortTable {
    radio: [RadioState; Port::COUNT],
    streams: [StreamSlot; Port::COUNT],
    fault: FaultLatch,
}

impl PortTable {
    const fn new() -> Self {
        Self {
            radio: [RadioState::Standby; Port::COUNT],
            streams: [
                StreamSlot::new(),
                StreamSlot::new(),
                StreamSlot::new(),
                StreamSlot::new(),
            ],
            fault: FaultLatch::new(),
        }
    }
}

/// State shared by [`Xcvr`] and [`StreamIrq`]
///
/// Construct one per transceiver with the application's event handler
/// and pass it to [`Xcvr::new`].
pub struct SharedState<'d> {
    table: Mutex<RefCell<PortTable>>,
    events: EventDispatcher<'d>,
}

impl<'d> SharedState<'d> {
    /// Create the shared state with the registered event handler
    #[must_use]
    pub const fn new(handler: &'d dyn EventHandler) -> Self {
        Self {
            table: Mutex::new(RefCell::new(PortTable::new())),
            events: EventDispatcher::new(handler),
        }
    }

    /// Run `f` on the port table inside a critical section
    fn with<R>(&self, f: impl FnOnce(&mut PortTable) -> R) -> R {
        critical_section::with(|cs| f(&mut self.table.borrow_ref_mut(cs)))
    }
}

/// Completion-path handle
///
/// Copy this into the DMA completion interrupt service routine and call
/// [`StreamIrq::on_transfer_complete`] once per completion or error
/// interrupt. No blocking hardware access happens here.
#[derive(Clone, Copy)]
pub struct StreamIrq<'d> {
    shared: &'d SharedState<'d>,
}

impl StreamIrq<'_> {
    /// Handle one DMA completion interrupt for `port`
    ///
    /// A wrap interrupt on a healthy cyclic stream is ignored; a
    /// one-shot completion deactivates the descriptor and raises exactly
    /// one done event. Interrupts for ports with no armed stream are
    /// stale and dropped, so an explicit stop and a racing completion
    /// never produce two done events for the same transfer.
    pub fn on_transfer_complete(&self, port: Port, result: Result<(), Fault>) {
        let event = self.shared.with(|table| {
            let slot = &mut table.streams[port.index()];
            if !slot.is_active() {
                return None;
            }
            match result {
                Ok(()) if slot.is_cyclic() => None,
                Ok(()) => {
                    slot.complete();
                    Some(StreamEvent::Done {
                        port,
                        result: Ok(()),
                    })
                }
                Err(fault) => {
                    slot.complete();
                    table.fault.latch(fault);
                    Some(StreamEvent::Done {
                        port,
                        result: Err(fault),
                    })
                }
            }
        });

        if let Some(event) = event {
            self.shared.events.dispatch(event);
        }
    }
}

/// Transceiver driver facade
///
/// Owns the RFIC register interface, the control pins, and the sample
/// DMA engine. All operations are synchronous against the hardware and
/// return exactly one fault code on failure; hardware-class faults latch
/// until [`Xcvr::clear_fault`].
pub struct Xcvr<'d, SPI, PINS, DMA> {
    rfic: Rfic<SPI>,
    pins: PINS,
    dma: DMA,
    shared: &'d SharedState<'d>,
}

impl<'d, SPI, PINS, DMA> Xcvr<'d, SPI, PINS, DMA>
where
    SPI: SpiDevice,
    PINS: RadioPins,
    DMA: SampleDma,
{
    /// Create the driver and its completion-path handle
    ///
    /// The driver starts with every port in Standby; call
    /// [`Xcvr::initialize`] before any other operation.
    pub fn new(
        shared: &'d SharedState<'d>,
        spi: SPI,
        pins: PINS,
        dma: DMA,
    ) -> (Self, StreamIrq<'d>) {
        let driver = Self {
            rfic: Rfic::new(spi),
            pins,
            dma,
            shared,
        };
        (driver, StreamIrq { shared })
    }

    /// Reset the device and probe its version
    pub fn initialize(&mut self) -> Result<VersionInfo, Fault> {
        self.check_fault()?;
        self.hw_reset()?;
        let version = self.run_hw(Rfic::version_info)?;
        log::info!(
            "xcvr: silicon {:X}.{:X}, firmware {}.{}.{}.{}",
            version.silicon.major,
            version.silicon.minor,
            version.firmware.major,
            version.firmware.minor,
            version.firmware.maint,
            version.firmware.rc,
        );
        Ok(version)
    }

    /// Pulse the RESETN line and return every port to Standby
    ///
    /// Refused while any stream is armed: the DMA engine must not be
    /// left running against a chip that forgot about it.
    pub fn hw_reset(&mut self) -> Result<(), Fault> {
        self.check_fault()?;
        if self.any_stream_active() {
            return Err(Fault::InvalidRadioState);
        }

        for port in Port::ALL {
            self.pins
                .set_enable(port, false)
                .map_err(|err| self.gpio_fault(err))?;
        }
        self.pins.set_reset(false).map_err(|err| self.gpio_fault(err))?;
        self.run_hw(|rfic| rfic.settle(config::RESET_PULSE_NS))?;
        self.pins.set_reset(true).map_err(|err| self.gpio_fault(err))?;
        self.run_hw(|rfic| rfic.settle(config::RESET_SETTLE_NS))?;

        self.shared.with(|table| {
            table.radio = [RadioState::Standby; Port::COUNT];
        });
        log::debug!("xcvr: hardware reset complete");
        Ok(())
    }

    /// Read the pending sticky fault, if any
    #[must_use]
    pub fn last_fault(&self) -> Option<Fault> {
        self.shared.with(|table| table.fault.pending())
    }

    /// Acknowledge and clear the sticky fault
    pub fn clear_fault(&mut self) {
        self.shared.with(|table| table.fault.clear());
    }

    /// Get a port's current radio state
    ///
    /// Pure read of the driver's authoritative copy; never fails and
    /// never touches the bus.
    #[must_use]
    pub fn radio_state(&self, port: Port) -> RadioState {
        self.shared.with(|table| table.radio[port.index()])
    }

    /// Drive a port to `target`, stepping through every intermediate state
    ///
    /// Each sub-transition is one hardware-backed request. The walk
    /// stops at the first rejected step: the port rests at the last
    /// state it actually reached and the step's fault is reported. No
    /// rollback, no skipping ahead. `target == current` succeeds
    /// trivially.
    pub fn set_radio_state(&mut self, port: Port, target: RadioState) -> Result<(), Fault> {
        self.check_fault()?;
        self.drive_state(port, target)
    }

    /// Drive a port to Calibrated from its current state
    pub fn to_rf_calibrated(&mut self, port: Port) -> Result<(), Fault> {
        self.set_radio_state(port, RadioState::Calibrated)
    }

    /// Drive a port to Primed from its current state
    pub fn to_rf_primed(&mut self, port: Port) -> Result<(), Fault> {
        self.set_radio_state(port, RadioState::Primed)
    }

    /// Drive a port to Enabled from its current state
    pub fn to_rf_enabled(&mut self, port: Port) -> Result<(), Fault> {
        self.set_radio_state(port, RadioState::Enabled)
    }

    /// Arm a continuous IQ sample stream on `port`
    ///
    /// The DMA engine streams directly from `buf`; ownership of the
    /// buffer transfers to the hardware until the matching done event,
    /// after which [`Xcvr::reclaim_buffer`] returns it. The port is
    /// raised to Enabled first if it is not already there, using the
    /// same ordered walk as [`Xcvr::set_radio_state`].
    ///
    /// A cyclic stream loops over the buffer until stopped with
    /// [`Xcvr::iq_stream_stop`]; a one-shot stream completes after one
    /// pass and deactivates itself from the completion interrupt.
    ///
    /// Arming while a stream is active is refused; stop it first. A
    /// refused request hands the buffer back in [`StreamRejected`]. A
    /// parked buffer from an earlier stream that was never reclaimed is
    /// dropped by a new arm — reclaim first to reuse the memory.
    pub fn iq_stream(
        &mut self,
        port: Port,
        cyclic: bool,
        buf: &'static mut [IqSample],
    ) -> Result<(), StreamRejected> {
        if let Err(fault) = self.check_fault() {
            return Err(StreamRejected { fault, buf });
        }
        if !self.dma.is_bound(port) {
            return Err(StreamRejected {
                fault: Fault::InvalidPort,
                buf,
            });
        }
        let Ok(samples) = u32::try_from(buf.len()) else {
            return Err(StreamRejected {
                fault: Fault::ExceedsDmaBuffer,
                buf,
            });
        };
        if let Err(fault) = validate_arm(samples, self.dma.capacity(port)) {
            return Err(StreamRejected { fault, buf });
        }
        if self
            .shared
            .with(|table| table.streams[port.index()].is_active())
        {
            return Err(StreamRejected {
                fault: Fault::InvalidRadioState,
                buf,
            });
        }

        if let Err(fault) = self.drive_state(port, RadioState::Enabled) {
            return Err(StreamRejected { fault, buf });
        }

        let transfer = Transfer {
            addr: buf.as_ptr() as usize,
            samples,
            cyclic,
        };

        // Slot activation and engine start share one critical section so
        // a completion interrupt can never observe a half-armed stream.
        self.shared.with(|table| {
            let slot = &mut table.streams[port.index()];
            match slot.arm(buf, samples, cyclic) {
                Err(buf) => Err(StreamRejected {
                    fault: Fault::InvalidRadioState,
                    buf,
                }),
                Ok(()) => match self.dma.arm(port, transfer) {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        log::warn!("xcvr: {} dma arm failed: {err:?}", port.name());
                        table.fault.latch(Fault::Dma);
                        let slot = &mut table.streams[port.index()];
                        slot.stop();
                        let buf = match slot.reclaim() {
                            Ok(Some(buf)) => buf,
                            // armed with this buffer a moment ago
                            _ => &mut [],
                        };
                        Err(StreamRejected {
                            fault: Fault::Dma,
                            buf,
                        })
                    }
                },
            }
        })?;

        log::debug!(
            "xcvr: {} streaming {} samples ({})",
            port.name(),
            samples,
            if cyclic { "cyclic" } else { "one-shot" },
        );
        self.shared.events.dispatch(StreamEvent::Started { port });
        Ok(())
    }

    /// Stop any active stream on `port`
    ///
    /// Disarms the DMA engine, deactivates the descriptor, and raises
    /// exactly one done event. A port with no active stream is a
    /// harmless no-op and raises nothing.
    pub fn iq_stream_stop(&mut self, port: Port) -> Result<(), Fault> {
        self.check_fault()?;
        self.stop_stream(port)
    }

    /// Take back a buffer whose stream has stopped or completed
    ///
    /// Fails with `PortDisabled` while the DMA engine still owns the
    /// buffer. Allowed while a fault is latched: recovering the memory
    /// must not depend on the chip being healthy.
    pub fn reclaim_buffer(
        &mut self,
        port: Port,
    ) -> Result<Option<&'static mut [IqSample]>, Fault> {
        self.shared
            .with(|table| table.streams[port.index()].reclaim())
    }

    /// Load and commit a radio profile image
    ///
    /// Refused while any stream is armed. All ports return to Standby;
    /// the new profile invalidates earlier calibrations.
    pub fn load_profile(&mut self, image: &[u8]) -> Result<(), Fault> {
        self.check_fault()?;
        if image.is_empty() || image.len() > config::PROFILE_SIZE {
            return Err(Fault::InvalidParameter);
        }
        if self.any_stream_active() {
            return Err(Fault::InvalidRadioState);
        }
        self.run_hw(|rfic| rfic.load_profile(image))?;
        for port in Port::ALL {
            self.pins
                .set_enable(port, false)
                .map_err(|err| self.gpio_fault(err))?;
        }
        self.shared.with(|table| {
            table.radio = [RadioState::Standby; Port::COUNT];
        });
        Ok(())
    }

    /// Read the junction temperature
    pub fn temperature(&mut self) -> Result<Temperature, Fault> {
        self.run_hw(Rfic::temperature)
    }

    /// Read silicon and firmware version information
    pub fn version_info(&mut self) -> Result<VersionInfo, Fault> {
        self.run_hw(Rfic::version_info)
    }

    /// Read a TX port's attenuation in milli-dB
    pub fn tx_attenuation(&mut self, port: Port) -> Result<u16, Fault> {
        self.run_hw(|rfic| rfic.tx_attenuation(port))
    }

    /// Set a TX port's attenuation in milli-dB (10 000 = 10.000 dB)
    pub fn set_tx_attenuation(&mut self, port: Port, attn_mdb: u16) -> Result<(), Fault> {
        if !port.is_tx() {
            return Err(Fault::InvalidPort);
        }
        if attn_mdb > config::TX_ATTEN_MAX_MDB {
            return Err(Fault::InvalidParameter);
        }
        self.run_hw(|rfic| rfic.set_tx_attenuation(port, attn_mdb))
    }

    /// Read a TX port's power boost setting
    pub fn tx_boost(&mut self, port: Port) -> Result<bool, Fault> {
        self.run_hw(|rfic| rfic.tx_boost(port))
    }

    /// Enable or disable a TX port's power boost
    pub fn set_tx_boost(&mut self, port: Port, enable: bool) -> Result<(), Fault> {
        if !port.is_tx() {
            return Err(Fault::InvalidPort);
        }
        self.run_hw(|rfic| rfic.set_tx_boost(port, enable))
    }

    /// Read a port's SSI sample rate in Hz
    pub fn sample_rate(&mut self, port: Port) -> Result<u32, Fault> {
        self.run_hw(|rfic| rfic.sample_rate(port))
    }

    /// Read a port's carrier frequency in Hz
    pub fn carrier_frequency(&mut self, port: Port) -> Result<u64, Fault> {
        self.run_hw(|rfic| rfic.carrier_frequency(port))
    }

    /// Route a port through its internal loopback path
    pub fn set_loopback(&mut self, port: Port, enable: bool) -> Result<(), Fault> {
        self.run_hw(|rfic| rfic.set_loopback(port, enable))
    }

    /// Read a raw RFIC register
    ///
    /// Low-level escape hatch for bring-up and diagnostics.
    pub fn read_register(&mut self, addr: u16) -> Result<u8, Fault> {
        self.run_hw(|rfic| rfic.read_register(addr))
    }

    /// Write a raw RFIC register
    ///
    /// Low-level escape hatch for bring-up and diagnostics.
    pub fn write_register(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        self.run_hw(|rfic| rfic.write_register(addr, value))
    }

    /// Fail fast with the pending sticky fault, if any
    fn check_fault(&self) -> Result<(), Fault> {
        self.shared.with(|table| table.fault.check())
    }

    /// Run a hardware operation, latching any fault it reports
    fn run_hw<T>(
        &mut self,
        op: impl FnOnce(&mut Rfic<SPI>) -> Result<T, Fault>,
    ) -> Result<T, Fault> {
        self.check_fault()?;
        op(&mut self.rfic).map_err(|fault| {
            self.shared.with(|table| table.fault.latch(fault));
            fault
        })
    }

    /// Latch and report a GPIO failure
    fn gpio_fault(&self, err: PINS::Error) -> Fault {
        log::warn!("xcvr: gpio access failed: {err:?}");
        self.shared.with(|table| table.fault.latch(Fault::Gpio));
        Fault::Gpio
    }

    /// Check whether any port has an armed stream
    fn any_stream_active(&self) -> bool {
        self.shared
            .with(|table| table.streams.iter().any(StreamSlot::is_active))
    }

    /// Walk a port to `target` one hardware-backed step at a time
    fn drive_state(&mut self, port: Port, target: RadioState) -> Result<(), Fault> {
        let current = self.radio_state(port);
        for step in transition_path(current, target) {
            self.execute_step(port, step)?;
        }
        Ok(())
    }

    /// Execute one sub-transition and record the state it reached
    fn execute_step(&mut self, port: Port, step: Transition) -> Result<(), Fault> {
        // Leaving Enabled tears down an armed stream first: disabling
        // the port invalidates the descriptor's SSI binding.
        if step.from == RadioState::Enabled {
            self.stop_stream(port)?;
        }

        match self.apply_step(port, step) {
            Ok(()) => {
                self.shared
                    .with(|table| table.radio[port.index()] = step.to);
                log::debug!(
                    "xcvr: {} {} -> {}",
                    port.name(),
                    step.from.name(),
                    step.to.name(),
                );
                Ok(())
            }
            Err(Fault::Comm) => {
                // Chip-side rejection: report the fault of the profile
                // stage this step was running.
                let fault = step.entry_fault();
                log::warn!(
                    "xcvr: {} rejected {} -> {} ({})",
                    port.name(),
                    step.from.name(),
                    step.to.name(),
                    fault.name(),
                );
                self.shared.with(|table| table.fault.latch(fault));
                Err(fault)
            }
            Err(fault) => {
                self.shared.with(|table| table.fault.latch(fault));
                Err(fault)
            }
        }
    }

    /// Issue the hardware operations behind one sub-transition
    fn apply_step(&mut self, port: Port, step: Transition) -> Result<(), Fault> {
        match (step.from, step.to) {
            (RadioState::Standby, RadioState::Calibrated) => self.rfic.run_init_cals(port),
            (RadioState::Primed, RadioState::Enabled) => {
                self.pins
                    .set_enable(port, true)
                    .map_err(|err| self.gpio_fault(err))?;
                self.rfic.request_state(port, RadioState::Enabled)
            }
            (RadioState::Enabled, RadioState::Primed) => {
                self.rfic.request_state(port, RadioState::Primed)?;
                self.pins
                    .set_enable(port, false)
                    .map_err(|err| self.gpio_fault(err))
            }
            (RadioState::Calibrated, RadioState::Primed)
            | (RadioState::Primed, RadioState::Calibrated)
            | (RadioState::Calibrated, RadioState::Standby) => {
                self.rfic.request_state(port, step.to)
            }
            // transition_path only produces adjacent pairs
            _ => Err(Fault::InvalidRadioState),
        }
    }

    /// Disarm and deactivate a port's stream, raising one done event
    fn stop_stream(&mut self, port: Port) -> Result<(), Fault> {
        if !self
            .shared
            .with(|table| table.streams[port.index()].is_active())
        {
            return Ok(());
        }

        if let Err(err) = self.dma.disarm(port) {
            log::warn!("xcvr: {} dma disarm failed: {err:?}", port.name());
            self.shared.with(|table| table.fault.latch(Fault::Dma));
            return Err(Fault::Dma);
        }

        // A natural completion may have raced the disarm and already
        // raised the done event; emit only if the stop deactivated it.
        let was_active = self.shared.with(|table| table.streams[port.index()].stop());
        if was_active {
            log::debug!("xcvr: {} stream stopped", port.name());
            self.shared.events.dispatch(StreamEvent::Done {
                port,
                result: Ok(()),
            });
        }
        Ok(())
    }
}
