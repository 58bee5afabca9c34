//! Sentence framing: `$IDENT[,field]*HH`
//!
//! A hand-written scanner for the envelope shared by every sentence the logger
//! writes, recognised or not. Framing and checksum verification are kept apart
//! so an unregistered identifier can still be told from line noise.

use super::fields::FieldReader;
use super::SentenceError;

const MIN_IDENT_LEN: usize = 5;
const MAX_IDENT_LEN: usize = 7;

/// A payload that matched the envelope grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Sentence identifier, e.g. `GPRMC` or `POSMST`
    pub ident: &'a str,
    /// Everything between `$` and `*`, the checksummed region
    pub body: &'a str,
    /// Comma separated fields following the identifier
    pub fields: Vec<&'a str>,
    /// Checksum as written after `*`
    pub declared_checksum: u8,
}

impl<'a> Frame<'a> {
    /// Match a payload against the envelope grammar
    ///
    /// Surrounding whitespace is ignored. Any deviation yields `NotNmea`.
    pub fn parse(payload: &'a str) -> Result<Self, SentenceError> {
        let text = payload.trim();

        let inner = text.strip_prefix('$').ok_or(SentenceError::NotNmea)?;
        let (body, checksum_hex) = inner.split_once('*').ok_or(SentenceError::NotNmea)?;

        if checksum_hex.len() != 2 || !checksum_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SentenceError::NotNmea);
        }
        let declared_checksum =
            u8::from_str_radix(checksum_hex, 16).map_err(|_| SentenceError::NotNmea)?;

        let mut parts = body.split(',');
        let ident = parts.next().unwrap_or_default();
        if !(MIN_IDENT_LEN..=MAX_IDENT_LEN).contains(&ident.len())
            || !ident.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(SentenceError::NotNmea);
        }

        let fields: Vec<&str> = parts.collect();
        if !fields.iter().all(|f| f.bytes().all(is_field_byte)) {
            return Err(SentenceError::NotNmea);
        }

        Ok(Self {
            ident,
            body,
            fields,
            declared_checksum,
        })
    }

    /// Checksum computed over the body
    pub fn computed_checksum(&self) -> u8 {
        checksum(self.body.as_bytes())
    }

    /// Compare declared and computed checksums
    pub fn verify_checksum(&self) -> Result<(), SentenceError> {
        let actual = self.computed_checksum();
        if actual != self.declared_checksum {
            return Err(SentenceError::Checksum {
                expected: self.declared_checksum,
                actual,
            });
        }
        Ok(())
    }

    /// Registry key for this identifier
    ///
    /// Proprietary identifiers drop the leading `P`, standard ones drop the
    /// two character talker: `POSMST` -> `OSMST`, `GPRMC` -> `RMC`.
    pub fn sentence_type(&self) -> &'a str {
        match self.ident.strip_prefix('P') {
            Some(rest) => rest,
            None => &self.ident[2..],
        }
    }

    /// Field reader over this frame's fields
    pub fn reader(&self) -> FieldReader<'_> {
        FieldReader::new(&self.fields)
    }
}

/// XOR of all bytes
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc ^ b)
}

fn is_field_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'.') || b.is_ascii_whitespace()
}
