//! Logger device configuration (`config.dat`)
//!
//! The logger reads its settings from a small text file on the storage card:
//!
//! ```text
//! s3          baud code channel A, `s` prefix enables seatalk
//! 5           baud code channel B
//! 3           outputs bitmask (1 = supply voltage, 2 = gyro/accelerometer)
//! 00000255    vessel id, 8 hex digits, omitted when 0
//! ```
//!
//! Lines are CRLF terminated. The baud code table is shared with the
//! `$POSMCFG` sentence the logger writes into its data files.

use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// File name of the configuration on the storage card
pub const CONFIG_FILE: &str = "config.dat";

/// Backup of the previous configuration
pub const BACKUP_FILE: &str = "config.old";

/// Outputs bit: supply voltage telemetry
pub const OUTPUT_SUPPLY: i64 = 1;

/// Outputs bit: gyroscope and accelerometer telemetry
pub const OUTPUT_GYRO: i64 = 2;

const BAUD_TABLE: [(i64, u32); 6] = [
    (0, 0),
    (1, 1200),
    (2, 2400),
    (3, 4800),
    (4, 9600),
    (5, 19200),
];

const CHANNEL_B_BAUDS: [u32; 4] = [0, 1200, 2400, 4800];

const MAX_VESSEL_ID: u16 = 9999;

/// Map a baud code to a baud rate, 0 for unknown codes
pub fn baud_from_code(code: i64) -> u32 {
    BAUD_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, baud)| *baud)
        .unwrap_or(0)
}

/// Map a baud rate to its code, 0 for unsupported rates
pub fn code_from_baud(baud: u32) -> i64 {
    BAUD_TABLE
        .iter()
        .find(|(_, b)| *b == baud)
        .map(|(code, _)| *code)
        .unwrap_or(0)
}

/// Settings the logger reads on power-on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    pub seatalk: bool,
    pub baud_a: u32,
    pub baud_b: u32,
    pub gyro: bool,
    pub supply: bool,
    #[serde(rename = "vesselID")]
    pub vessel_id: u16,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            seatalk: false,
            baud_a: 4800,
            baud_b: 4800,
            gyro: true,
            supply: false,
            vessel_id: 0,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the vessel id
    pub fn with_vessel_id(mut self, vessel_id: u16) -> Self {
        self.vessel_id = vessel_id;
        self
    }

    /// Builder method: enable seatalk on channel A
    pub fn with_seatalk(mut self, enabled: bool) -> Self {
        self.seatalk = enabled;
        self
    }

    /// Builder method: set the baud rate of channel A
    pub fn with_baud_a(mut self, baud: u32) -> Self {
        self.baud_a = baud;
        self
    }

    /// Builder method: set the baud rate of channel B
    pub fn with_baud_b(mut self, baud: u32) -> Self {
        self.baud_b = baud;
        self
    }

    /// Builder method: write gyro and accelerometer data
    pub fn with_gyro(mut self, enabled: bool) -> Self {
        self.gyro = enabled;
        self
    }

    /// Builder method: write supply voltage data
    pub fn with_supply(mut self, enabled: bool) -> Self {
        self.supply = enabled;
        self
    }

    /// Outputs bitmask as written to the file
    pub fn outputs(&self) -> i64 {
        let mut outputs = 0;
        if self.supply {
            outputs |= OUTPUT_SUPPLY;
        }
        if self.gyro {
            outputs |= OUTPUT_GYRO;
        }
        outputs
    }

    /// Check the values against what the logger firmware accepts
    pub fn validate(&self) -> Result<()> {
        if !BAUD_TABLE.iter().any(|(_, b)| *b == self.baud_a) {
            return Err(DecoderError::InvalidConfig(format!(
                "invalid baud rate for channel A: {}",
                self.baud_a
            )));
        }
        if !CHANNEL_B_BAUDS.contains(&self.baud_b) {
            return Err(DecoderError::InvalidConfig(format!(
                "invalid baud rate for channel B: {}",
                self.baud_b
            )));
        }
        if self.vessel_id > MAX_VESSEL_ID {
            return Err(DecoderError::InvalidConfig(format!(
                "invalid vessel id: {}",
                self.vessel_id
            )));
        }
        Ok(())
    }

    /// Write the `config.dat` representation
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let prefix = if self.seatalk { "s" } else { "" };
        write!(writer, "{}{}\r\n", prefix, code_from_baud(self.baud_a))?;
        write!(writer, "{}\r\n", code_from_baud(self.baud_b))?;
        write!(writer, "{}\r\n", self.outputs())?;
        if self.vessel_id > 0 {
            write!(writer, "{:08x}\r\n", self.vessel_id)?;
        }
        Ok(())
    }

    /// Parse the `config.dat` representation
    ///
    /// Missing trailing lines keep their zero values; lines after the fourth
    /// are ignored.
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut config = Self {
            seatalk: false,
            baud_a: 0,
            baud_b: 0,
            gyro: false,
            supply: false,
            vessel_id: 0,
        };

        for (index, line) in reader.lines().take(4).enumerate() {
            let line = line?;
            let line = line.trim();
            match index {
                0 => {
                    let code = match line.strip_prefix('s') {
                        Some(code) => {
                            config.seatalk = true;
                            code
                        }
                        None => line,
                    };
                    config.baud_a = parse_baud_code(code);
                }
                1 => config.baud_b = parse_baud_code(line),
                2 => {
                    let outputs: i64 = line.parse().map_err(|_| {
                        DecoderError::InvalidConfig(format!("invalid outputs value: {:?}", line))
                    })?;
                    config.gyro = outputs & OUTPUT_GYRO != 0;
                    config.supply = outputs & OUTPUT_SUPPLY != 0;
                }
                _ => {
                    config.vessel_id = u16::from_str_radix(line, 16).map_err(|_| {
                        DecoderError::InvalidConfig(format!("invalid vessel id: {:?}", line))
                    })?;
                }
            }
        }

        Ok(config)
    }

    /// Read `config.dat` from a storage card folder
    pub fn read_from_card(card: &Path) -> Result<Self> {
        let path = card.join(CONFIG_FILE);
        log::debug!("Reading logger configuration from {:?}", path);
        let file = File::open(&path)?;
        Self::read(BufReader::new(file))
    }

    /// Write `config.dat` to a storage card folder
    ///
    /// An existing configuration is kept as `config.old`.
    pub fn write_to_card(&self, card: &Path) -> Result<()> {
        let path = card.join(CONFIG_FILE);
        let backup = card.join(BACKUP_FILE);

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup)?;
            }
            fs::rename(&path, &backup)?;
            log::debug!("Previous configuration moved to {:?}", backup);
        }

        let mut file = File::create(&path)?;
        self.write(&mut file)?;
        file.flush()?;
        log::info!("Logger configuration written to {:?}", path);
        Ok(())
    }
}

fn parse_baud_code(text: &str) -> u32 {
    text.parse().map(baud_from_code).unwrap_or(0)
}

impl std::fmt::Display for LoggerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Seatalk: {}, BaudA: {}, BaudB: {}, Gyro: {}, Supply: {}, VesselID: {}",
            self.seatalk, self.baud_a, self.baud_b, self.gyro, self.supply, self.vessel_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> LoggerConfig {
        LoggerConfig::new()
            .with_baud_a(4800)
            .with_baud_b(19200)
            .with_gyro(true)
            .with_supply(true)
            .with_seatalk(true)
            .with_vessel_id(5678)
    }

    #[test]
    fn test_baud_table() {
        assert_eq!(baud_from_code(0), 0);
        assert_eq!(baud_from_code(1), 1200);
        assert_eq!(baud_from_code(5), 19200);
        assert_eq!(baud_from_code(255), 0);
        assert_eq!(code_from_baud(9600), 4);
        assert_eq!(code_from_baud(1234), 0);
    }

    #[test]
    fn test_write() {
        let mut buf = Vec::new();
        sample().write(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "s3\r\n5\r\n3\r\n0000162e\r\n");
    }

    #[test]
    fn test_write_without_vessel_id() {
        let mut buf = Vec::new();
        LoggerConfig::default().write(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "3\r\n3\r\n2\r\n");
    }

    #[test]
    fn test_read() {
        let cfg = LoggerConfig::read(Cursor::new("s5\r\n3\r\n3\r\n0000162e\r\n")).unwrap();
        assert_eq!(cfg.baud_a, 19200);
        assert_eq!(cfg.baud_b, 4800);
        assert!(cfg.seatalk);
        assert!(cfg.gyro);
        assert!(cfg.supply);
        assert_eq!(cfg.vessel_id, 5678);
    }

    #[test]
    fn test_read_invalid_vessel_id() {
        let result = LoggerConfig::read(Cursor::new("s5\r\n3\r\n3\r\n0000162x\r\n"));
        assert!(matches!(result, Err(DecoderError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate() {
        let cfg = sample().with_baud_a(19200).with_baud_b(4800);
        assert!(cfg.validate().is_ok());
        assert!(sample().with_baud_a(1234).validate().is_err());
        // channel B is limited to 4800
        assert!(sample().validate().is_err());
        assert!(sample()
            .with_baud_b(4800)
            .with_vessel_id(10000)
            .validate()
            .is_err());
    }

    #[test]
    fn test_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"seatalk":true,"baudA":4800,"baudB":19200,"gyro":true,"supply":true,"vesselID":5678}"#
        );
    }

    #[test]
    fn test_card_round_trip_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let first = LoggerConfig::default().with_vessel_id(597);
        first.write_to_card(dir.path()).unwrap();

        let second = first.clone().with_supply(true);
        second.write_to_card(dir.path()).unwrap();

        assert!(dir.path().join(BACKUP_FILE).exists());
        assert_eq!(LoggerConfig::read_from_card(dir.path()).unwrap(), second);
    }
}
