//! Conversions between chrono values and spreadsheet serial numbers.
//!
//! Serial values use the 1900 date system: the integer part counts days and
//! the fraction carries the time of day. The base date 1899-12-30 absorbs the
//! format's historical phantom leap day, so 2008-01-01 maps to 39448 exactly
//! as consumers expect.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub(crate) const SECONDS_PER_DAY: f64 = 86_400.0;

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("Invalid 1900 date system base")
}

/// Serial number of a calendar date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use longan::common::datetime::date_to_serial;
///
/// let date = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
/// assert_eq!(date_to_serial(date), 39448.0);
/// ```
pub fn date_to_serial(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

/// Serial number of a date plus time-of-day fraction.
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    date_to_serial(dt.date()) + dt.time().num_seconds_from_midnight() as f64 / SECONDS_PER_DAY
}

/// Calendar date for a serial number, ignoring any time fraction.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    excel_epoch().checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Date and time for a serial number, with the fraction resolved to whole
/// seconds.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let date = serial_to_date(serial)?;
    let seconds = ((serial - serial.floor()) * SECONDS_PER_DAY).round() as u32;
    if seconds >= 86_400 {
        // The fraction rounded up to the next midnight
        return date
            .checked_add_signed(Duration::days(1))
            .map(|d| d.and_time(NaiveTime::MIN));
    }
    date.and_hms_opt(seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_serials() {
        assert_eq!(date_to_serial(ymd(2008, 1, 1)), 39448.0);
        assert_eq!(date_to_serial(ymd(2023, 1, 1)), 44927.0);
        // First day after the phantom leap day region
        assert_eq!(date_to_serial(ymd(1900, 3, 1)), 61.0);
    }

    #[test]
    fn test_datetime_serial_fraction() {
        let noon = ymd(2008, 1, 1).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(noon), 39448.5);

        let quarter = ymd(2008, 1, 1).and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(quarter), 39448.25);
    }

    #[test]
    fn test_serial_to_datetime_roundtrip() {
        let dt = ymd(2019, 7, 4).and_hms_opt(23, 59, 59).unwrap();
        let serial = datetime_to_serial(dt);
        assert_eq!(serial_to_datetime(serial), Some(dt));

        assert_eq!(
            serial_to_datetime(39448.5),
            Some(ymd(2008, 1, 1).and_hms_opt(12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_serial_to_date_ignores_fraction() {
        assert_eq!(serial_to_date(39448.99), Some(ymd(2008, 1, 1)));
        assert_eq!(serial_to_date(39448.0), Some(ymd(2008, 1, 1)));
    }
}
