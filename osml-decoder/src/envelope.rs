//! Logger line envelope
//!
//! Every record the logger writes looks like `HH:MM:SS.mmm;<channel>;<payload>`.
//! This module splits a record into its three parts and converts the elapsed
//! time offset to and from its textual form.

use crate::types::{LineError, Offset};

/// A record split into its envelope fields, before payload decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub offset: Offset,
    pub channel: &'a str,
    pub payload: &'a str,
}

/// Split a logger record on the first two `;` separators
pub fn split_line(line: &str) -> Result<RawLine<'_>, LineError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut parts = line.splitn(3, ';');

    let (Some(offset), Some(channel), Some(payload)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(LineError::MalformedLine);
    };

    Ok(RawLine {
        offset: parse_offset(offset)?,
        channel,
        payload,
    })
}

/// Parse an elapsed offset of the form `HH:MM:SS[.mmm]`
///
/// Each component is parsed on its own; hours are not capped at 24.
pub fn parse_offset(text: &str) -> Result<Offset, LineError> {
    let invalid = || LineError::InvalidOffset(text.to_string());

    let parts: Vec<&str> = text.split(':').collect();
    let [hours, minutes, rest] = parts.as_slice() else {
        return Err(invalid());
    };

    let (seconds, millis) = match rest.split_once('.') {
        Some((secs, ms)) if !ms.is_empty() && ms.len() <= 3 => (secs, Some(ms)),
        Some(_) => return Err(invalid()),
        None => (*rest, None),
    };

    let hours = parse_component(hours).ok_or_else(invalid)?;
    let minutes = parse_component(minutes).ok_or_else(invalid)?;
    let seconds = parse_component(seconds).ok_or_else(invalid)?;
    let millis = match millis {
        Some(ms) => parse_component(ms).ok_or_else(invalid)?,
        None => 0,
    };

    let total_ms = ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis;
    Offset::try_milliseconds(total_ms).ok_or_else(invalid)
}

/// Render an offset as `HH:MM:SS.mmm`
pub fn format_offset(offset: Offset) -> String {
    let total_ms = offset.num_milliseconds().max(0);
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
}

fn parse_component(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Bounded so the millisecond total cannot overflow
    if text.len() > 9 {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line() {
        let raw = split_line("00:00:05.000;I;$POSMST,Start NMEA Logger,V 0.1.15*06\r\n").unwrap();
        assert_eq!(raw.offset, Offset::seconds(5));
        assert_eq!(raw.channel, "I");
        assert_eq!(raw.payload, "$POSMST,Start NMEA Logger,V 0.1.15*06");
    }

    #[test]
    fn test_payload_keeps_further_separators() {
        let raw = split_line("00:00:01.000;A;foo;bar").unwrap();
        assert_eq!(raw.payload, "foo;bar");
    }

    #[test]
    fn test_too_few_fields() {
        assert_eq!(split_line("00:00:01.000;A"), Err(LineError::MalformedLine));
        assert_eq!(split_line("garbage"), Err(LineError::MalformedLine));
    }

    #[test]
    fn test_invalid_offset() {
        assert!(matches!(
            split_line("00:xx:01.000;A;$GPRMC"),
            Err(LineError::InvalidOffset(_))
        ));
        assert!(parse_offset("01:02").is_err());
        assert!(parse_offset("01:02:03.").is_err());
        assert!(parse_offset("01:02:03.1234").is_err());
        assert!(parse_offset("-1:02:03").is_err());
    }

    #[test]
    fn test_parse_offset_components() {
        assert_eq!(
            parse_offset("02:00:02.540").unwrap(),
            Offset::milliseconds(2 * 3_600_000 + 2_540)
        );
        assert_eq!(parse_offset("00:00:10").unwrap(), Offset::seconds(10));
        assert_eq!(parse_offset("30:00:00.000").unwrap(), Offset::hours(30));
    }

    #[test]
    fn test_offset_round_trip() {
        let day = 86_400_000i64;
        let sweep = (0..day).step_by(997).chain([1, 999, 59_999, 3_599_999, day - 1]);
        for ms in sweep {
            let d = Offset::milliseconds(ms);
            assert_eq!(parse_offset(&format_offset(d)).unwrap(), d);
        }
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(Offset::milliseconds(7_262_540)), "02:01:02.540");
        assert_eq!(format_offset(Offset::zero()), "00:00:00.000");
    }
}
