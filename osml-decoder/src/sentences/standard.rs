//! Standard positioning, depth and altitude sentences
//!
//! The subset of NMEA 0183 and Garmin proprietary sentences that GPS and
//! depth sounders attached to the logger emit.

use super::fields::FieldReader;
use super::{Sentence, SentenceError, SentenceRegistry};
use crate::types::Timestamp;
use chrono::{NaiveDate, NaiveTime};

/// Fix status flag of an RMC sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStatus {
    /// `A`: data valid
    Valid,
    /// `V`: receiver warning, data void
    Void,
}

/// RMC: recommended minimum position/time fix
#[derive(Debug, Clone, PartialEq)]
pub struct Rmc {
    pub time: Option<NaiveTime>,
    pub status: FixStatus,
    /// Decimal degrees, south negative
    pub latitude: f64,
    /// Decimal degrees, west negative
    pub longitude: f64,
    /// Speed over ground in knots
    pub speed: f64,
    /// Course over ground in degrees true
    pub course: f64,
    pub date: Option<NaiveDate>,
    /// Magnetic variation in degrees, west negative
    pub variation: f64,
}

impl Rmc {
    /// Absolute UTC time of the fix, if both date and time are present
    pub fn fix_time(&self) -> Option<Timestamp> {
        let date = self.date?;
        let time = self.time?;
        Some(date.and_time(time).and_utc())
    }

    /// Valid status and a usable absolute time
    pub fn valid_fix_time(&self) -> Option<Timestamp> {
        match self.status {
            FixStatus::Valid => self.fix_time(),
            FixStatus::Void => None,
        }
    }
}

/// GGA: fix data including altitude
#[derive(Debug, Clone, PartialEq)]
pub struct Gga {
    pub time: Option<NaiveTime>,
    pub latitude: f64,
    pub longitude: f64,
    pub fix_quality: i64,
    pub satellites: i64,
    pub hdop: f64,
    /// Antenna altitude above mean sea level in metres
    pub altitude: f64,
    pub geoid_separation: f64,
}

/// DBT: depth below transducer
#[derive(Debug, Clone, PartialEq)]
pub struct Dbt {
    pub depth_feet: f64,
    pub depth_meters: f64,
    pub depth_fathoms: f64,
}

/// DPT: depth in metres
#[derive(Debug, Clone, PartialEq)]
pub struct Dpt {
    pub depth: f64,
    /// Transducer offset, positive for distance to waterline
    pub offset: f64,
    pub range: Option<f64>,
}

/// PGRMZ: Garmin altitude
#[derive(Debug, Clone, PartialEq)]
pub struct Grmz {
    /// Altitude in the unit given by `unit`, feet in practice
    pub altitude: i64,
    pub unit: String,
    pub fix_type: i64,
}

/// PGRMM: Garmin map datum
#[derive(Debug, Clone, PartialEq)]
pub struct Grmm {
    pub datum: String,
}

/// PGRME: Garmin estimated position error in metres
#[derive(Debug, Clone, PartialEq)]
pub struct Grme {
    pub horizontal: f64,
    pub vertical: f64,
    pub spherical: f64,
}

pub(super) fn register(registry: &mut SentenceRegistry) {
    registry.register("RMC", decode_rmc);
    registry.register("GGA", decode_gga);
    registry.register("DBT", decode_dbt);
    registry.register("DPT", decode_dpt);
    registry.register("GRMZ", decode_grmz);
    registry.register("GRMM", decode_grmm);
    registry.register("GRME", decode_grme);
}

fn decode_rmc(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    let status = match f.raw(1, "validity")? {
        "A" => FixStatus::Valid,
        "V" | "" => FixStatus::Void,
        other => {
            return Err(SentenceError::InvalidField {
                name: "validity",
                value: other.to_string(),
            })
        }
    };
    Ok(Sentence::Rmc(Rmc {
        time: f.time(0, "time")?,
        status,
        latitude: f.latitude(2, "latitude")?,
        longitude: f.longitude(4, "longitude")?,
        speed: f.float(6, "speed")?,
        course: f.float(7, "course")?,
        date: f.date(8, "date")?,
        variation: f.signed_by_direction(9, "variation", 'E', 'W')?,
    }))
}

fn decode_gga(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Gga(Gga {
        time: f.time(0, "time")?,
        latitude: f.latitude(1, "latitude")?,
        longitude: f.longitude(3, "longitude")?,
        fix_quality: f.int(5, "fix quality")?,
        satellites: f.int(6, "satellites")?,
        hdop: f.float(7, "hdop")?,
        altitude: f.float(8, "altitude")?,
        geoid_separation: f.float(10, "geoid separation")?,
    }))
}

fn decode_dbt(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Dbt(Dbt {
        depth_feet: f.float(0, "depth feet")?,
        depth_meters: f.float(2, "depth meters")?,
        depth_fathoms: f.float(4, "depth fathoms")?,
    }))
}

fn decode_dpt(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Dpt(Dpt {
        depth: f.float(0, "depth")?,
        offset: f.float(1, "offset")?,
        range: f.optional_float(2, "range")?,
    }))
}

fn decode_grmz(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Grmz(Grmz {
        altitude: f.int(0, "altitude")?,
        unit: f.string(1, "unit")?,
        fix_type: f.int(2, "fixtype")?,
    }))
}

fn decode_grmm(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Grmm(Grmm {
        datum: f.string(0, "mapdate")?,
    }))
}

fn decode_grme(f: &FieldReader<'_>) -> Result<Sentence, SentenceError> {
    Ok(Sentence::Grme(Grme {
        horizontal: f.float(0, "horizontal error")?,
        vertical: f.float(2, "vertical error")?,
        spherical: f.float(4, "spherical error")?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn decode(payload: &str) -> Result<Sentence, SentenceError> {
        SentenceRegistry::new().decode(payload)
    }

    #[test]
    fn test_valid_rmc() {
        let Sentence::Rmc(rmc) =
            decode("$GPRMC,080000,A,4721.182,N,00832.161,E,5.2,81.0,110916,1.5,E*4E").unwrap()
        else {
            panic!("expected RMC");
        };
        assert_eq!(rmc.status, FixStatus::Valid);
        assert!((rmc.speed - 5.2).abs() < 1e-9);
        assert!((rmc.variation - 1.5).abs() < 1e-9);
        assert_eq!(
            rmc.valid_fix_time(),
            Some(Utc.with_ymd_and_hms(2016, 9, 11, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_void_rmc_with_empty_fields() {
        let Sentence::Rmc(rmc) = decode("$GPRMC,101224,V,,,,,,,110916,,*3B").unwrap() else {
            panic!("expected RMC");
        };
        assert_eq!(rmc.status, FixStatus::Void);
        assert_eq!(rmc.latitude, 0.0);
        assert!(rmc.fix_time().is_some());
        assert_eq!(rmc.valid_fix_time(), None);
    }

    #[test]
    fn test_gga_altitude() {
        let Sentence::Gga(gga) =
            decode("$GPGGA,101313,4721.182,N,00832.161,E,1,03,2.3,269.3,M,48.0,M,,*47").unwrap()
        else {
            panic!("expected GGA");
        };
        assert_eq!(gga.fix_quality, 1);
        assert_eq!(gga.satellites, 3);
        assert!((gga.altitude - 269.3).abs() < 1e-9);
        assert!((gga.geoid_separation - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_gga_fails() {
        assert!(decode("$GPGGA,121133,4721.463,N16,000.2,E*7D").is_err());
    }

    #[test]
    fn test_garmin_sentences() {
        assert_eq!(
            decode("$PGRMM,WGS 84*06").unwrap(),
            Sentence::Grmm(Grmm {
                datum: "WGS 84".into()
            })
        );
        assert_eq!(
            decode("$PGRMZ,20,f,3*29").unwrap(),
            Sentence::Grmz(Grmz {
                altitude: 20,
                unit: "f".into(),
                fix_type: 3
            })
        );
        let Sentence::Grme(grme) = decode("$PGRME,6.3,M,,M,6.3,M*00").unwrap() else {
            panic!("expected GRME");
        };
        assert!((grme.horizontal - 6.3).abs() < 1e-9);
        assert_eq!(grme.vertical, 0.0);
    }
}
