//! Absolute timestamp reconstruction
//!
//! The logger has no wall clock; every line only carries the time elapsed
//! since power-on. Valid RMC fixes give absolute anchors:
//!
//! 1. The first valid fix sets `reference = fix_time - offset`.
//! 2. A second pass re-anchors on every valid fix and projects all other lines
//!    as `reference + offset`.
//!
//! Without any valid fix the reference stays at the Unix epoch.

use crate::logline::LogLine;
use crate::sentences::Sentence;
use crate::types::{zero_instant, Offset, Timestamp};

/// Outcome of reconstructing one file
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// Anchor in effect after the last line
    pub reference: Timestamp,
    /// True if at least one valid fix was found
    pub reference_found: bool,
    /// Raw time of the first valid fix
    pub created: Option<Timestamp>,
    /// Vessel id from the first device configuration sentence
    pub vessel_id: Option<i64>,
    /// Firmware version from the first start marker
    pub version: Option<String>,
}

/// Two-pass timestamp reconstructor
pub struct TimestampReconstructor;

impl TimestampReconstructor {
    /// Fill `corrected` on every line
    ///
    /// Lines are expected in ascending offset order.
    pub fn reconstruct(lines: &mut [LogLine]) -> Reconstruction {
        let mut result = Reconstruction {
            reference: zero_instant(),
            reference_found: false,
            created: None,
            vessel_id: None,
            version: None,
        };

        for line in lines.iter() {
            if result.created.is_none() {
                if let Some((_, fix_time)) = line.valid_fix() {
                    result.created = Some(fix_time);
                    if let Some(reference) = anchor(fix_time, line.offset) {
                        result.reference = reference;
                        result.reference_found = true;
                    }
                }
            }
            match &line.sentence {
                Some(Sentence::Config(cfg)) if result.vessel_id.is_none() => {
                    result.vessel_id = Some(cfg.vessel_id);
                }
                Some(Sentence::Start(start)) if result.version.is_none() => {
                    result.version = Some(start.version.clone());
                }
                _ => {}
            }
        }

        if !result.reference_found {
            log::debug!("No valid fix found, projecting from {}", result.reference);
        }

        let mut reference = result.reference;
        for line in lines.iter_mut() {
            let fix_time = line.valid_fix().map(|(_, time)| time);
            line.corrected = match fix_time {
                Some(fix_time) => {
                    if let Some(reanchored) = anchor(fix_time, line.offset) {
                        reference = reanchored;
                    }
                    Some(fix_time)
                }
                None => reference.checked_add_signed(line.offset),
            };
        }

        result.reference = reference;
        result
    }
}

fn anchor(fix_time: Timestamp, offset: Offset) -> Option<Timestamp> {
    fix_time.checked_sub_signed(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::format_offset;
    use crate::logline::LineOutcome;
    use crate::sentences::{checksum, SentenceRegistry};
    use chrono::{TimeZone, Utc};

    fn lines(input: &[&str]) -> Vec<LogLine> {
        let registry = SentenceRegistry::new();
        input
            .iter()
            .map(|l| match LogLine::parse(l, &registry) {
                LineOutcome::Decoded(line) | LineOutcome::Unknown(line, _) => line,
                LineOutcome::Rejected { error, .. } => panic!("{}: {}", l, error),
            })
            .collect()
    }

    #[test]
    fn test_projects_from_first_fix() {
        let mut lines = lines(&[
            "00:00:05.000;I;$POSMST,Start NMEA Logger,V 0.1.15*06",
            "00:00:10.000;A;$GPRMC,080000,A,4721.182,N,00832.161,E,5.2,81.0,110916,1.5,E*4E",
            "00:00:15.000;I;$POSMGYR,-340,-107,-78*42",
        ]);
        let result = TimestampReconstructor::reconstruct(&mut lines);

        assert!(result.reference_found);
        assert_eq!(result.version.as_deref(), Some("V 0.1.15"));
        let fix = Utc.with_ymd_and_hms(2016, 9, 11, 8, 0, 0).unwrap();
        assert_eq!(result.created, Some(fix));
        assert_eq!(
            lines[0].corrected,
            Some(Utc.with_ymd_and_hms(2016, 9, 11, 7, 59, 55).unwrap())
        );
        assert_eq!(lines[1].corrected, Some(fix));
        assert_eq!(
            lines[2].corrected,
            Some(Utc.with_ymd_and_hms(2016, 9, 11, 8, 0, 5).unwrap())
        );
    }

    #[test]
    fn test_no_fix_falls_back_to_epoch() {
        let mut lines = lines(&[
            "00:00:05.000;I;$POSMST,Start NMEA Logger,V 0.1.15*06",
            "00:01:00.250;B;$GPRMC,101224,V,,,,,,,110916,,*3B",
        ]);
        let result = TimestampReconstructor::reconstruct(&mut lines);

        assert!(!result.reference_found);
        assert_eq!(result.created, None);
        for line in &lines {
            assert_eq!(line.corrected, zero_instant().checked_add_signed(line.offset));
        }
    }

    #[test]
    fn test_reanchors_on_every_fix() {
        // second fix is 2s later than the elapsed clock suggests
        let mut lines = lines(&[
            "00:00:10.000;A;$GPRMC,080000,A,4721.182,N,00832.161,E,5.2,81.0,110916,1.5,E*4E",
            "00:00:20.000;A;$GPRMC,080012,A,4721.182,N,00832.161,E,5.2,81.0,110916,1.5,E*4D",
            "00:00:25.000;I;$POSMGYR,-340,-107,-78*42",
        ]);
        let result = TimestampReconstructor::reconstruct(&mut lines);

        assert_eq!(
            result.created,
            Some(Utc.with_ymd_and_hms(2016, 9, 11, 8, 0, 0).unwrap())
        );
        assert_eq!(
            lines[2].corrected,
            Some(Utc.with_ymd_and_hms(2016, 9, 11, 8, 0, 17).unwrap())
        );
    }

    #[test]
    fn test_vessel_id_first_found_wins() {
        let mut lines = lines(&[
            "00:00:01.000;I;$POSMCFG,3,5,1,3,0255,0*75",
            "00:00:02.000;I;$POSMCFG,255,255,255,255,ffff,65535*73",
        ]);
        let result = TimestampReconstructor::reconstruct(&mut lines);
        assert_eq!(result.vessel_id, Some(597));
    }

    /// Every line rewritten as a fix at its corrected time
    fn as_fixes(lines: &[LogLine]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                let time = line.corrected.unwrap();
                let body = format!(
                    "GPRMC,{},A,4721.182,N,00832.161,E,5.2,81.0,{},1.5,E",
                    time.format("%H%M%S%.3f"),
                    time.format("%d%m%y")
                );
                format!(
                    "{};{};${}*{:02X}",
                    format_offset(line.offset),
                    line.channel,
                    body,
                    checksum(body.as_bytes())
                )
            })
            .collect()
    }

    #[test]
    fn test_idempotent() {
        let mut first = lines(&[
            "00:00:05.000;I;$POSMST,Start NMEA Logger,V 0.1.15*06",
            "00:00:10.000;A;$GPRMC,080000,A,4721.182,N,00832.161,E,5.2,81.0,110916,1.5,E*4E",
            "00:00:15.500;I;$POSMGYR,-340,-107,-78*42",
            "00:00:20.000;A;$GPRMC,080012,A,4721.182,N,00832.161,E,5.2,81.0,110916,1.5,E*4D",
            "00:00:25.000;I;$POSMGYR,-340,-107,-78*42",
        ]);
        TimestampReconstructor::reconstruct(&mut first);

        let fixes = as_fixes(&first);
        let fix_refs: Vec<&str> = fixes.iter().map(String::as_str).collect();
        let mut second = lines(&fix_refs);
        let result = TimestampReconstructor::reconstruct(&mut second);

        assert!(result.reference_found);
        assert!(second.iter().all(|l| l.valid_fix().is_some()));
        let expected: Vec<_> = first.iter().map(|l| l.corrected).collect();
        let actual: Vec<_> = second.iter().map(|l| l.corrected).collect();
        assert_eq!(actual, expected);
    }
}
