//! Sentence registry and typed sentences
//!
//! Payloads are decoded in three steps:
//! 1. Match the `$IDENT,...*HH` envelope grammar → otherwise `NotNmea`
//! 2. Verify the XOR checksum
//! 3. Look up the decoder for the identifier → otherwise `UnknownTag`
//!
//! The registry is a plain value built once and shared by reference; the set of
//! sentences is closed, so decoded sentences are a single enum.

pub mod fields;
pub mod frame;
pub mod standard;
pub mod vendor;

use crate::types::LineError;
use std::collections::HashMap;
use std::fmt;

pub use fields::FieldReader;
pub use frame::{checksum, Frame};
pub use standard::{Dbt, Dpt, FixStatus, Gga, Grme, Grmm, Grmz, Rmc};
pub use vendor::{Axes, OsmConfig, OsmShutdown, OsmStart, OsmVoltage};

/// Decoder for the fields of one sentence type
pub type DecodeFn = fn(&FieldReader<'_>) -> Result<Sentence, SentenceError>;

/// Every sentence kind the registry can decode
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    /// Position/time fix
    Rmc(Rmc),
    /// Fix data with altitude
    Gga(Gga),
    /// Depth below transducer in feet/metres/fathoms
    Dbt(Dbt),
    /// Depth in metres
    Dpt(Dpt),
    Grmz(Grmz),
    Grmm(Grmm),
    Grme(Grme),
    /// Logger start marker with firmware version
    Start(OsmStart),
    /// Logger shutdown reason
    Shutdown(OsmShutdown),
    /// Logger device configuration
    Config(OsmConfig),
    Gyro(Axes),
    Acceleration(Axes),
    /// Supply voltage
    Voltage(OsmVoltage),
}

impl Sentence {
    /// Short name of the sentence kind
    pub fn kind(&self) -> &'static str {
        match self {
            Sentence::Rmc(_) => "RMC",
            Sentence::Gga(_) => "GGA",
            Sentence::Dbt(_) => "DBT",
            Sentence::Dpt(_) => "DPT",
            Sentence::Grmz(_) => "GRMZ",
            Sentence::Grmm(_) => "GRMM",
            Sentence::Grme(_) => "GRME",
            Sentence::Start(_) => "OSMST",
            Sentence::Shutdown(_) => "OSMSO",
            Sentence::Config(_) => "OSMCFG",
            Sentence::Gyro(_) => "OSMGYR",
            Sentence::Acceleration(_) => "OSMACC",
            Sentence::Voltage(_) => "OSMVCC",
        }
    }
}

/// Errors raised while decoding a payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SentenceError {
    #[error("payload does not match the sentence envelope")]
    NotNmea,

    #[error("unknown sentence identifier: {0}")]
    UnknownTag(String),

    #[error("checksum mismatch: declared {expected:02X}, computed {actual:02X}")]
    Checksum { expected: u8, actual: u8 },

    #[error("missing field {index} ({name})")]
    MissingField { index: usize, name: &'static str },

    #[error("invalid value for {name}: {value:?}")]
    InvalidField { name: &'static str, value: String },
}

impl SentenceError {
    /// Classify for the per-line error/warning buckets
    pub fn into_line_error(self, ident: &str) -> LineError {
        match self {
            SentenceError::NotNmea => LineError::NotNmea,
            SentenceError::UnknownTag(tag) => LineError::UnknownTag(tag),
            other => LineError::Decode {
                ident: ident.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Dispatch table from sentence type to decoder
#[derive(Clone)]
pub struct SentenceRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl fmt::Debug for SentenceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.decoders.keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("SentenceRegistry")
            .field("types", &types)
            .finish()
    }
}

impl SentenceRegistry {
    /// Registry with all standard and vendor sentences the logger emits
    pub fn new() -> Self {
        let mut registry = Self::empty();
        standard::register(&mut registry);
        vendor::register(&mut registry);
        log::trace!("Sentence registry built with {} decoders", registry.len());
        registry
    }

    /// Registry without any decoders
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Add or replace the decoder for a sentence type (`RMC`, `OSMST`, ...)
    pub fn register(&mut self, sentence_type: &'static str, decode: DecodeFn) {
        self.decoders.insert(sentence_type, decode);
    }

    pub fn is_registered(&self, sentence_type: &str) -> bool {
        self.decoders.contains_key(sentence_type)
    }

    /// Number of registered sentence types
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode a payload into a typed sentence
    pub fn decode(&self, payload: &str) -> Result<Sentence, SentenceError> {
        let frame = Frame::parse(payload)?;
        self.decode_frame(&frame)
    }

    /// Decode an already framed payload
    pub fn decode_frame(&self, frame: &Frame<'_>) -> Result<Sentence, SentenceError> {
        frame.verify_checksum()?;

        let decode = self
            .decoders
            .get(frame.sentence_type())
            .ok_or_else(|| SentenceError::UnknownTag(frame.ident.to_string()))?;

        decode(&frame.reader())
    }

    /// Decode a payload and classify any failure as a line error
    pub fn classify(&self, payload: &str) -> Result<Sentence, LineError> {
        let frame = Frame::parse(payload).map_err(|_| LineError::NotNmea)?;
        self.decode_frame(&frame)
            .map_err(|e| e.into_line_error(frame.ident))
    }
}

impl Default for SentenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration() {
        let registry = SentenceRegistry::new();
        assert_eq!(registry.len(), 13);
        for ty in ["OSMST", "OSMSO", "OSMCFG", "OSMGYR", "OSMACC", "OSMVCC"] {
            assert!(registry.is_registered(ty), "{}", ty);
        }
        for ty in ["RMC", "GGA", "DBT", "DPT", "GRMZ", "GRMM", "GRME"] {
            assert!(registry.is_registered(ty), "{}", ty);
        }
    }

    #[test]
    fn test_unknown_tag_is_warning() {
        let registry = SentenceRegistry::new();
        let err = registry.classify("$GPRTE,1,1,c,0*07").unwrap_err();
        assert_eq!(err, LineError::UnknownTag("GPRTE".into()));
        assert!(err.is_warning());
    }

    #[test]
    fn test_not_nmea() {
        let registry = SentenceRegistry::new();
        assert_eq!(
            registry.classify("$GPGLL,,,,,101221,*51$GPRMC,101224,V,,,,,,,110916,,*3B"),
            Err(LineError::NotNmea)
        );
    }

    #[test]
    fn test_decode_error_carries_ident() {
        let registry = SentenceRegistry::new();
        let err = registry
            .classify("$GPGGA,121133,4721.463,N16,000.2,E*7D")
            .unwrap_err();
        assert!(matches!(err, LineError::Decode { ref ident, .. } if ident == "GPGGA"));
    }

    #[test]
    fn test_custom_registration() {
        fn decode_txt(_: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
            Ok(Sentence::Grmm(Grmm {
                datum: "text".into(),
            }))
        }

        let mut registry = SentenceRegistry::empty();
        assert!(registry.is_empty());
        registry.register("RTE", decode_txt);
        assert_eq!(registry.decode("$GPRTE,1,1,c,0*07").unwrap().kind(), "GRMM");
    }

    #[test]
    fn test_kind_names() {
        let registry = SentenceRegistry::new();
        let sentence = registry.decode("$POSMST,Start NMEA Logger,V 0.1.15*06").unwrap();
        assert_eq!(sentence.kind(), "OSMST");
    }
}
