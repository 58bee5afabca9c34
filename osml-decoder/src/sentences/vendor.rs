//! Logger vendor sentences (`$POSM...`)
//!
//! The logger interleaves its own telemetry with the sentences it records:
//! start and shutdown markers, the active device configuration, and optional
//! gyroscope, accelerometer and supply voltage readings.

use super::fields::FieldReader;
use super::{Sentence, SentenceError, SentenceRegistry};
use crate::logger_config::{baud_from_code, OUTPUT_GYRO, OUTPUT_SUPPLY};
use serde::{Deserialize, Serialize};

/// `$POSMST,Start NMEA Logger,V 0.1.15*06`
#[derive(Debug, Clone, PartialEq)]
pub struct OsmStart {
    pub message: String,
    /// Firmware version string, e.g. `V 0.1.15`
    pub version: String,
}

/// `$POSMSO,Reason: times up*4C`
#[derive(Debug, Clone, PartialEq)]
pub struct OsmShutdown {
    pub reason: String,
}

/// `$POSMCFG,255,255,255,255,ffff,65535*73`
#[derive(Debug, Clone, PartialEq)]
pub struct OsmConfig {
    pub baud_a_code: i64,
    pub baud_b_code: i64,
    pub seatalk: i64,
    /// Bitmask of enabled telemetry outputs
    pub outputs: i64,
    /// Vessel identifier, written in hex by the logger
    pub vessel_id: i64,
    pub bootloader: i64,
}

impl OsmConfig {
    /// Baud rate of channel A, 0 for unknown codes
    pub fn baud_a(&self) -> u32 {
        baud_from_code(self.baud_a_code)
    }

    /// Baud rate of channel B, 0 for unknown codes
    pub fn baud_b(&self) -> u32 {
        baud_from_code(self.baud_b_code)
    }

    pub fn seatalk_enabled(&self) -> bool {
        self.seatalk == 1
    }

    pub fn gyro_enabled(&self) -> bool {
        self.outputs & OUTPUT_GYRO != 0
    }

    pub fn supply_enabled(&self) -> bool {
        self.outputs & OUTPUT_SUPPLY != 0
    }
}

/// Three axis reading from the gyroscope or accelerometer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Axes {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// `$POSMVCC,5073,4873*5E`
///
/// Older firmware writes only the first reading; the normalised value then
/// stays 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsmVoltage {
    pub voltage: i64,
    pub normalized: i64,
}

pub(super) fn register(registry: &mut SentenceRegistry) {
    registry.register("OSMST", decode_start);
    registry.register("OSMSO", decode_shutdown);
    registry.register("OSMCFG", decode_config);
    registry.register("OSMGYR", decode_gyro);
    registry.register("OSMACC", decode_acceleration);
    registry.register("OSMVCC", decode_voltage);
}

fn decode_start(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Start(OsmStart {
        message: f.string(0, "message")?,
        version: f.string(1, "version")?,
    }))
}

fn decode_shutdown(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Shutdown(OsmShutdown {
        reason: f.string(0, "message")?,
    }))
}

fn decode_config(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Config(OsmConfig {
        baud_a_code: f.int(0, "bauda")?,
        baud_b_code: f.int(1, "baudb")?,
        seatalk: f.int(2, "seatalk")?,
        outputs: f.int(3, "outputs")?,
        vessel_id: f.hex_int(4, "vesselid")?,
        bootloader: f.int(5, "bootloader")?,
    }))
}

fn axes(f: &FieldReader<'_>, names: [&'static str; 3]) -> Result<Axes, SentenceError> {
    Ok(Axes {
        x: f.int(0, names[0])?,
        y: f.int(1, names[1])?,
        z: f.int(2, names[2])?,
    })
}

fn decode_gyro(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    axes(f, ["xaxis", "yaxis", "zaxis"]).map(Sentence::Gyro)
}

fn decode_acceleration(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    axes(f, ["xacc", "yacc", "zacc"]).map(Sentence::Acceleration)
}

fn decode_voltage(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Voltage(OsmVoltage {
        voltage: f.int(0, "voltage")?,
        normalized: f.optional_int(1, "normvoltage")?.unwrap_or(0),
    }))
}
