//! Typed access to sentence fields
//!
//! Receivers leave fields empty until they have data, so an empty field reads
//! as the zero value of its type. A field that is absent altogether is an
//! arity error.

use super::SentenceError;
use chrono::{NaiveDate, NaiveTime};

/// Cursor-free typed reader over the fields of one frame
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    fields: &'a [&'a str],
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a [&'a str]) -> Self {
        Self { fields }
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw text of a field
    pub fn raw(&self, index: usize, name: &'static str) -> Result<&'a str, SentenceError> {
        self.fields
            .get(index)
            .map(|f| f.trim())
            .ok_or(SentenceError::MissingField { index, name })
    }

    pub fn string(&self, index: usize, name: &'static str) -> Result<String, SentenceError> {
        self.raw(index, name).map(str::to_string)
    }

    pub fn int(&self, index: usize, name: &'static str) -> Result<i64, SentenceError> {
        let text = self.raw(index, name)?;
        if text.is_empty() {
            return Ok(0);
        }
        text.parse().map_err(|_| invalid(name, text))
    }

    /// Integer written in hexadecimal, without a `0x` prefix
    pub fn hex_int(&self, index: usize, name: &'static str) -> Result<i64, SentenceError> {
        let text = self.raw(index, name)?;
        if text.is_empty() {
            return Ok(0);
        }
        i64::from_str_radix(text, 16).map_err(|_| invalid(name, text))
    }

    pub fn float(&self, index: usize, name: &'static str) -> Result<f64, SentenceError> {
        let text = self.raw(index, name)?;
        if text.is_empty() {
            return Ok(0.0);
        }
        decimal(text).ok_or_else(|| invalid(name, text))
    }

    /// Integer field that may be missing entirely
    pub fn optional_int(&self, index: usize, name: &'static str) -> Result<Option<i64>, SentenceError> {
        if index >= self.fields.len() {
            return Ok(None);
        }
        self.int(index, name).map(Some)
    }

    /// Float field that may be missing entirely
    pub fn optional_float(
        &self,
        index: usize,
        name: &'static str,
    ) -> Result<Option<f64>, SentenceError> {
        if index >= self.fields.len() {
            return Ok(None);
        }
        self.float(index, name).map(Some)
    }

    /// Latitude from `ddmm.mmmm` plus an `N`/`S` hemisphere field
    pub fn latitude(&self, index: usize, name: &'static str) -> Result<f64, SentenceError> {
        self.coordinate(index, name, 'N', 'S')
    }

    /// Longitude from `dddmm.mmmm` plus an `E`/`W` hemisphere field
    pub fn longitude(&self, index: usize, name: &'static str) -> Result<f64, SentenceError> {
        self.coordinate(index, name, 'E', 'W')
    }

    /// Signed value with a trailing direction field, e.g. magnetic variation
    pub fn signed_by_direction(
        &self,
        index: usize,
        name: &'static str,
        positive: char,
        negative: char,
    ) -> Result<f64, SentenceError> {
        let value = self.float(index, name)?;
        let direction = self.raw(index + 1, name)?;
        match direction.chars().next() {
            None => Ok(value),
            Some(c) if c == positive => Ok(value),
            Some(c) if c == negative => Ok(-value),
            Some(_) => Err(invalid(name, direction)),
        }
    }

    /// UTC time of day `hhmmss[.sss]`; `None` if empty or out of range
    pub fn time(&self, index: usize, name: &'static str) -> Result<Option<NaiveTime>, SentenceError> {
        let text = self.raw(index, name)?;
        if text.is_empty() {
            return Ok(None);
        }
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.len() != 6
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid(name, text));
        }

        let hour = two_digits(&whole[0..2]);
        let minute = two_digits(&whole[2..4]);
        let second = two_digits(&whole[4..6]);
        let millis = fraction
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(3)
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));

        Ok(NaiveTime::from_hms_milli_opt(hour, minute, second, millis))
    }

    /// Date `ddmmyy`, years counted from 2000; `None` if empty or impossible
    pub fn date(&self, index: usize, name: &'static str) -> Result<Option<NaiveDate>, SentenceError> {
        let text = self.raw(index, name)?;
        if text.is_empty() {
            return Ok(None);
        }
        if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(name, text));
        }
        let day = two_digits(&text[0..2]);
        let month = two_digits(&text[2..4]);
        let year = 2000 + two_digits(&text[4..6]) as i32;
        Ok(NaiveDate::from_ymd_opt(year, month, day))
    }

    fn coordinate(
        &self,
        index: usize,
        name: &'static str,
        positive: char,
        negative: char,
    ) -> Result<f64, SentenceError> {
        let value = self.raw(index, name)?;
        let hemisphere = self.raw(index + 1, name)?;
        if value.is_empty() && hemisphere.is_empty() {
            return Ok(0.0);
        }

        let sign = match hemisphere {
            h if h.len() == 1 && h.starts_with(positive) => 1.0,
            h if h.len() == 1 && h.starts_with(negative) => -1.0,
            h => return Err(invalid(name, h)),
        };

        let raw = decimal(value).ok_or_else(|| invalid(name, value))?;
        let degrees = (raw / 100.0).trunc();
        let minutes = raw - degrees * 100.0;
        if minutes >= 60.0 {
            return Err(invalid(name, value));
        }
        Ok(sign * (degrees + minutes / 60.0))
    }
}

/// Plain decimal `[+-]digits[.digits]`; rejects exponents, `nan` and `inf`
fn decimal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !digits(whole) || !digits(fraction) {
        return None;
    }
    text.parse().ok()
}

fn two_digits(text: &str) -> u32 {
    text.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

fn invalid(name: &'static str, value: &str) -> SentenceError {
    SentenceError::InvalidField {
        name,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_read_as_zero() {
        let fields = ["", "", ""];
        let reader = FieldReader::new(&fields);
        assert_eq!(reader.int(0, "a").unwrap(), 0);
        assert_eq!(reader.float(1, "b").unwrap(), 0.0);
        assert_eq!(reader.latitude(1, "lat").unwrap(), 0.0);
        assert_eq!(reader.time(0, "time").unwrap(), None);
    }

    #[test]
    fn test_missing_field() {
        let fields = ["1"];
        let reader = FieldReader::new(&fields);
        assert_eq!(
            reader.int(3, "zaxis"),
            Err(SentenceError::MissingField {
                index: 3,
                name: "zaxis"
            })
        );
        assert_eq!(reader.optional_int(1, "norm").unwrap(), None);
    }

    #[test]
    fn test_coordinates() {
        let fields = ["4721.182", "N", "00832.161", "E", "4721.182", "S", "00832.161", "W"];
        let reader = FieldReader::new(&fields);
        let lat = reader.latitude(0, "lat").unwrap();
        let lon = reader.longitude(2, "lon").unwrap();
        assert!((lat - 47.353_033).abs() < 1e-5);
        assert!((lon - 8.536_016).abs() < 1e-5);
        assert!((reader.latitude(4, "lat").unwrap() + lat).abs() < 1e-9);
        assert!((reader.longitude(6, "lon").unwrap() + lon).abs() < 1e-9);
    }

    #[test]
    fn test_bad_hemisphere() {
        let fields = ["4721.463", "N16"];
        let reader = FieldReader::new(&fields);
        assert!(matches!(
            reader.latitude(0, "latitude"),
            Err(SentenceError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_time_and_date() {
        let fields = ["080000", "101224.50", "110916", "320916", "12:00"];
        let reader = FieldReader::new(&fields);
        assert_eq!(
            reader.time(0, "time").unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0)
        );
        assert_eq!(
            reader.time(1, "time").unwrap(),
            NaiveTime::from_hms_milli_opt(10, 12, 24, 500)
        );
        assert_eq!(
            reader.date(2, "date").unwrap(),
            NaiveDate::from_ymd_opt(2016, 9, 11)
        );
        assert_eq!(reader.date(3, "date").unwrap(), None);
        assert!(reader.time(4, "time").is_err());
    }

    #[test]
    fn test_non_decimal_floats_rejected() {
        let fields = ["nan", "inf", "-Infinity", "1e3", ".", "-2.5", ".5", "nan", "N"];
        let reader = FieldReader::new(&fields);
        for index in 0..5 {
            assert!(matches!(
                reader.float(index, "speed"),
                Err(SentenceError::InvalidField { .. })
            ));
        }
        assert_eq!(reader.float(5, "speed").unwrap(), -2.5);
        assert_eq!(reader.float(6, "speed").unwrap(), 0.5);
        assert!(matches!(
            reader.latitude(7, "latitude"),
            Err(SentenceError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_hex_int() {
        let fields = ["ffff", "0255", "xyz"];
        let reader = FieldReader::new(&fields);
        assert_eq!(reader.hex_int(0, "vesselid").unwrap(), 65535);
        assert_eq!(reader.hex_int(1, "vesselid").unwrap(), 597);
        assert!(reader.hex_int(2, "vesselid").is_err());
    }
}
