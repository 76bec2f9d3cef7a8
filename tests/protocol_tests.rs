//! Tests for the control console protocol
//!
//! Byte-fed command parsing and response formatting.

use xcvr_driver::protocol::{ConsoleCommand, ConsoleParser, ConsoleResponse};
use xcvr_driver::types::{
    Fault, FirmwareVersion, Port, RadioState, SiliconVersion, Temperature, VersionInfo,
};

/// Feed a whole line and return the parsed command
fn parse(line: &str) -> Option<ConsoleCommand> {
    let mut parser = ConsoleParser::new();
    let mut cmd = None;
    for byte in line.bytes() {
        cmd = parser.feed(byte);
    }
    cmd
}

// ============================================================================
// Parser Tests
// ============================================================================

#[test]
fn set_radio_state_parses_port_and_level() {
    assert_eq!(
        parse("SetRadioState Tx1 3\n"),
        Some(ConsoleCommand::SetRadioState(Port::Tx1, RadioState::Enabled))
    );
    assert_eq!(
        parse("SetRadioState Rx2 0\n"),
        Some(ConsoleCommand::SetRadioState(Port::Rx2, RadioState::Standby))
    );
}

#[test]
fn set_radio_state_rejects_bad_arguments() {
    assert_eq!(parse("SetRadioState Rx3 1\n"), None);
    assert_eq!(parse("SetRadioState Rx1 7\n"), None);
    assert_eq!(parse("SetRadioState Rx1\n"), None);
}

#[test]
fn get_radio_state_parses() {
    assert_eq!(
        parse("GetRadioState Rx2\n"),
        Some(ConsoleCommand::GetRadioState(Port::Rx2))
    );
}

#[test]
fn convenience_transitions_parse() {
    assert_eq!(
        parse("ToRfCalibrated Rx1\n"),
        Some(ConsoleCommand::ToRfCalibrated(Port::Rx1))
    );
    assert_eq!(
        parse("ToRfPrimed Tx2\n"),
        Some(ConsoleCommand::ToRfPrimed(Port::Tx2))
    );
    assert_eq!(
        parse("ToRfEnabled Tx1\n"),
        Some(ConsoleCommand::ToRfEnabled(Port::Tx1))
    );
}

#[test]
fn bare_commands_parse() {
    assert_eq!(parse("GetTemp\n"), Some(ConsoleCommand::GetTemperature));
    assert_eq!(parse("GetVerInfo\n"), Some(ConsoleCommand::GetVersion));
    assert_eq!(parse("ClearError\n"), Some(ConsoleCommand::ClearFault));
}

#[test]
fn tx_attenuation_parses_decibels() {
    assert_eq!(
        parse("SetTxAttn Tx2 10.5\n"),
        Some(ConsoleCommand::SetTxAttenuation(Port::Tx2, 10_500))
    );
    assert_eq!(
        parse("SetTxAttn Tx1 0\n"),
        Some(ConsoleCommand::SetTxAttenuation(Port::Tx1, 0))
    );
    assert_eq!(
        parse("GetTxAttn Tx1\n"),
        Some(ConsoleCommand::GetTxAttenuation(Port::Tx1))
    );
}

#[test]
fn tx_attenuation_rejects_out_of_range() {
    assert_eq!(parse("SetTxAttn Tx1 -3\n"), None);
    assert_eq!(parse("SetTxAttn Tx1 90\n"), None);
    assert_eq!(parse("SetTxAttn Tx1 lots\n"), None);
}

#[test]
fn tx_boost_parses_flag() {
    assert_eq!(
        parse("SetTxBoost Tx1 1\n"),
        Some(ConsoleCommand::SetTxBoost(Port::Tx1, true))
    );
    assert_eq!(
        parse("SetTxBoost Tx2 0\n"),
        Some(ConsoleCommand::SetTxBoost(Port::Tx2, false))
    );
    assert_eq!(parse("SetTxBoost Tx1 2\n"), None);
    assert_eq!(
        parse("GetTxBoost Tx2\n"),
        Some(ConsoleCommand::GetTxBoost(Port::Tx2))
    );
}

#[test]
fn telemetry_queries_parse() {
    assert_eq!(
        parse("GetSampleRate Rx1\n"),
        Some(ConsoleCommand::GetSampleRate(Port::Rx1))
    );
    assert_eq!(
        parse("GetCarrierFreq Tx2\n"),
        Some(ConsoleCommand::GetCarrierFrequency(Port::Tx2))
    );
}

#[test]
fn unknown_commands_are_reported() {
    match parse("FlyToTheMoon now\n") {
        Some(ConsoleCommand::Unknown(word)) => assert_eq!(word.as_str(), "FlyToTheMoon"),
        other => panic!("expected Unknown, got {other:?}"),
    }
}

#[test]
fn empty_lines_produce_nothing() {
    assert_eq!(parse("\n"), None);
    assert_eq!(parse("   \n"), None);
}

#[test]
fn carriage_return_terminates_too() {
    assert_eq!(parse("GetTemp\r"), Some(ConsoleCommand::GetTemperature));
}

#[test]
fn oversized_lines_are_discarded() {
    let mut parser = ConsoleParser::new();
    for _ in 0..200 {
        assert_eq!(parser.feed(b'x'), None);
    }
    // The parser recovered and accepts the next well-formed line.
    let mut cmd = None;
    for byte in "GetTemp\n".bytes() {
        cmd = parser.feed(byte);
    }
    assert_eq!(cmd, Some(ConsoleCommand::GetTemperature));
}

#[test]
fn consecutive_lines_parse_independently() {
    let mut parser = ConsoleParser::new();
    let mut cmds = Vec::new();
    for byte in "GetTemp\nGetRadioState Tx1\n".bytes() {
        if let Some(cmd) = parser.feed(byte) {
            cmds.push(cmd);
        }
    }
    assert_eq!(
        cmds,
        [
            ConsoleCommand::GetTemperature,
            ConsoleCommand::GetRadioState(Port::Tx1),
        ]
    );
}

// ============================================================================
// Response Formatter Tests
// ============================================================================

#[test]
fn status_responses() {
    let mut resp = ConsoleResponse::new();
    resp.status(Ok(()));
    assert_eq!(resp.as_str(), "Success");

    resp.status(Err(Fault::Calibration));
    assert_eq!(resp.as_str(), "Failed (ProfileCalError)");
}

#[test]
fn radio_state_response() {
    let mut resp = ConsoleResponse::new();
    resp.radio_state(Port::Tx1, RadioState::Enabled);
    assert_eq!(resp.as_str(), "Tx1 = Enabled");
}

#[test]
fn temperature_response() {
    let mut resp = ConsoleResponse::new();
    resp.temperature(Temperature::from_tenths(345));
    assert_eq!(resp.as_str(), "34.5C");

    resp.temperature(Temperature::from_tenths(-53));
    assert_eq!(resp.as_str(), "-5.3C");
}

#[test]
fn version_response() {
    let mut resp = ConsoleResponse::new();
    resp.version(&VersionInfo {
        silicon: SiliconVersion { major: 0xB, minor: 0 },
        firmware: FirmwareVersion {
            major: 1,
            minor: 4,
            maint: 0,
            rc: 2,
        },
    });
    assert_eq!(resp.as_str(), "Silicon B0, Firmware 1.4.0.2");
}

#[test]
fn attenuation_response_formats_millidecibels() {
    let mut resp = ConsoleResponse::new();
    resp.tx_attenuation(Port::Tx1, 10_500);
    assert_eq!(resp.as_str(), "Tx1 Attenuation = 10.500 dB");

    resp.tx_attenuation(Port::Tx2, 500);
    assert_eq!(resp.as_str(), "Tx2 Attenuation = 0.500 dB");
}

#[test]
fn boost_response() {
    let mut resp = ConsoleResponse::new();
    resp.tx_boost(Port::Tx1, true);
    assert_eq!(resp.as_str(), "Tx1 Boost Enabled");

    resp.tx_boost(Port::Tx2, false);
    assert_eq!(resp.as_str(), "Tx2 Boost Disabled");
}

#[test]
fn telemetry_responses() {
    let mut resp = ConsoleResponse::new();
    resp.sample_rate(Port::Rx1, 15_360_000);
    assert_eq!(resp.as_str(), "Rx1 Sample Rate = 15360000 Hz");

    resp.carrier_frequency(Port::Tx1, 902_000_000);
    assert_eq!(resp.as_str(), "Tx1 Carrier Frequency = 902000000 Hz");
}

#[test]
fn response_buffer_clears() {
    let mut resp = ConsoleResponse::new();
    resp.status(Ok(()));
    assert!(!resp.as_bytes().is_empty());
    resp.clear();
    assert_eq!(resp.as_str(), "");
}
