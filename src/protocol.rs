//! Communication Protocols
//!
//! Control console command parsing and response formatting. Commands are
//! single lines of whitespace-separated words, e.g. `SetRadioState Tx1 3`
//! or `GetTemp`. Streaming is not exposed here; the console is a thin
//! adapter over the driver's control operations.

use heapless::{String, Vec};

use crate::config::{CONSOLE_CMD_LEN, CONSOLE_RESP_LEN};
use crate::types::{Fault, Port, RadioState, Temperature, VersionInfo};

/// Console command parsed from terminal input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Set a port's radio state to an activation level
    SetRadioState(Port, RadioState),
    /// Read a port's radio state
    GetRadioState(Port),
    /// Drive a port to Calibrated
    ToRfCalibrated(Port),
    /// Drive a port to Primed
    ToRfPrimed(Port),
    /// Drive a port to Enabled
    ToRfEnabled(Port),
    /// Read the junction temperature
    GetTemperature,
    /// Read version information
    GetVersion,
    /// Set a TX port's attenuation (milli-dB)
    SetTxAttenuation(Port, u16),
    /// Read a TX port's attenuation
    GetTxAttenuation(Port),
    /// Enable or disable a TX port's power boost
    SetTxBoost(Port, bool),
    /// Read a TX port's power boost setting
    GetTxBoost(Port),
    /// Read a port's SSI sample rate
    GetSampleRate(Port),
    /// Read a port's carrier frequency
    GetCarrierFrequency(Port),
    /// Clear the sticky fault register
    ClearFault,
    /// Unknown or malformed command
    Unknown(String<24>),
}

/// Console command parser
///
/// Feed received bytes one at a time; a command is produced when the
/// line terminator arrives.
pub struct ConsoleParser {
    /// Line buffer
    buffer: Vec<u8, CONSOLE_CMD_LEN>,
}

impl ConsoleParser {
    /// Create a new console parser
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed a byte to the parser
    ///
    /// Returns a command when a complete line has been received.
    pub fn feed(&mut self, byte: u8) -> Option<ConsoleCommand> {
        if byte == b'\r' || byte == b'\n' {
            let cmd = self.parse_buffer();
            self.buffer.clear();
            cmd
        } else {
            let _ = self.buffer.push(byte);

            // Prevent overflow
            if self.buffer.len() >= CONSOLE_CMD_LEN {
                self.buffer.clear();
            }

            None
        }
    }

    /// Clear the line buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Parse the current buffer as a command line
    fn parse_buffer(&self) -> Option<ConsoleCommand> {
        let line = core::str::from_utf8(&self.buffer).ok()?;
        let mut words = line.split_whitespace();
        let name = words.next()?;

        let cmd = match name {
            "SetRadioState" => {
                let port = parse_port(words.next())?;
                let state = parse_state(words.next())?;
                ConsoleCommand::SetRadioState(port, state)
            }
            "GetRadioState" => ConsoleCommand::GetRadioState(parse_port(words.next())?),
            "ToRfCalibrated" => ConsoleCommand::ToRfCalibrated(parse_port(words.next())?),
            "ToRfPrimed" => ConsoleCommand::ToRfPrimed(parse_port(words.next())?),
            "ToRfEnabled" => ConsoleCommand::ToRfEnabled(parse_port(words.next())?),
            "GetTemp" => ConsoleCommand::GetTemperature,
            "GetVerInfo" => ConsoleCommand::GetVersion,
            "SetTxAttn" => {
                let port = parse_port(words.next())?;
                let mdb = parse_attn_mdb(words.next())?;
                ConsoleCommand::SetTxAttenuation(port, mdb)
            }
            "GetTxAttn" => ConsoleCommand::GetTxAttenuation(parse_port(words.next())?),
            "SetTxBoost" => {
                let port = parse_port(words.next())?;
                let enable = parse_flag(words.next())?;
                ConsoleCommand::SetTxBoost(port, enable)
            }
            "GetTxBoost" => ConsoleCommand::GetTxBoost(parse_port(words.next())?),
            "GetSampleRate" => ConsoleCommand::GetSampleRate(parse_port(words.next())?),
            "GetCarrierFreq" => ConsoleCommand::GetCarrierFrequency(parse_port(words.next())?),
            "ClearError" => ConsoleCommand::ClearFault,
            other => ConsoleCommand::Unknown(other.chars().take(24).collect()),
        };

        Some(cmd)
    }
}

impl Default for ConsoleParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a port name word
fn parse_port(word: Option<&str>) -> Option<Port> {
    Port::from_name(word?)
}

/// Parse an activation level word (0–3)
fn parse_state(word: Option<&str>) -> Option<RadioState> {
    RadioState::from_level(word?.parse().ok()?)
}

/// Parse a boolean flag word (0 or 1)
fn parse_flag(word: Option<&str>) -> Option<bool> {
    match word? {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// Parse an attenuation in dB (e.g. "10.5") into milli-dB
fn parse_attn_mdb(word: Option<&str>) -> Option<u16> {
    let db: f32 = word?.parse().ok()?;
    if !(0.0..=65.0).contains(&db) {
        return None;
    }
    Some((db * 1000.0) as u16)
}

/// Console response formatter
pub struct ConsoleResponse {
    buffer: String<CONSOLE_RESP_LEN>,
}

impl ConsoleResponse {
    /// Create a new response formatter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Format an operation outcome
    pub fn status(&mut self, result: Result<(), Fault>) {
        self.buffer.clear();
        match result {
            Ok(()) => {
                let _ = self.buffer.push_str("Success");
            }
            Err(fault) => {
                let _ = core::fmt::write(
                    &mut self.buffer,
                    format_args!("Failed ({})", fault.name()),
                );
            }
        }
    }

    /// Format a radio state response
    pub fn radio_state(&mut self, port: Port, state: RadioState) {
        self.buffer.clear();
        let _ = core::fmt::write(
            &mut self.buffer,
            format_args!("{} = {}", port.name(), state.name()),
        );
    }

    /// Format a temperature response
    pub fn temperature(&mut self, temp: Temperature) {
        self.buffer.clear();
        let whole = temp.tenths() / 10;
        let frac = (temp.tenths() % 10).unsigned_abs();
        let _ = core::fmt::write(&mut self.buffer, format_args!("{whole}.{frac}C"));
    }

    /// Format a version information response
    pub fn version(&mut self, version: &VersionInfo) {
        self.buffer.clear();
        let _ = core::fmt::write(
            &mut self.buffer,
            format_args!(
                "Silicon {:X}{:X}, Firmware {}.{}.{}.{}",
                version.silicon.major,
                version.silicon.minor,
                version.firmware.major,
                version.firmware.minor,
                version.firmware.maint,
                version.firmware.rc,
            ),
        );
    }

    /// Format a transmit attenuation response
    pub fn tx_attenuation(&mut self, port: Port, attn_mdb: u16) {
        self.buffer.clear();
        let _ = core::fmt::write(
            &mut self.buffer,
            format_args!(
                "{} Attenuation = {}.{:03} dB",
                port.name(),
                attn_mdb / 1000,
                attn_mdb % 1000,
            ),
        );
    }

    /// Format a transmit boost response
    pub fn tx_boost(&mut self, port: Port, enabled: bool) {
        self.buffer.clear();
        let _ = core::fmt::write(
            &mut self.buffer,
            format_args!(
                "{} Boost {}",
                port.name(),
                if enabled { "Enabled" } else { "Disabled" },
            ),
        );
    }

    /// Format a sample rate response
    pub fn sample_rate(&mut self, port: Port, freq_hz: u32) {
        self.buffer.clear();
        let _ = core::fmt::write(
            &mut self.buffer,
            format_args!("{} Sample Rate = {freq_hz} Hz", port.name()),
        );
    }

    /// Format a carrier frequency response
    pub fn carrier_frequency(&mut self, port: Port, freq_hz: u64) {
        self.buffer.clear();
        let _ = core::fmt::write(
            &mut self.buffer,
            format_args!("{} Carrier Frequency = {freq_hz} Hz", port.name()),
        );
    }

    /// Get the response string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Get the response bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for ConsoleResponse {
    fn default() -> Self {
        Self::new()
    }
}
