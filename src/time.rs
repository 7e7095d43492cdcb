use hifitime::Epoch;

use crate::constants::{Second, SerialDay, SECONDS_PER_DAY, UNIX_EPOCH_SERIAL_DAY};

/// Transformation from a serial day count to Unix seconds (UTC)
///
/// The serial day count is the number of elapsed days since 1899-12-30T00:00:00 UTC,
/// as stored in the fifth column of Geolife PLT files. Leap seconds are not counted,
/// matching the POSIX definition of Unix time.
///
/// Argument
/// --------
/// * `days`: elapsed days (fractional) since 1899-12-30 UTC
///
/// Return
/// ------
/// * the same instant as seconds since 1970-01-01T00:00:00 UTC
pub fn serial_days_to_unix_seconds(days: SerialDay) -> Second {
    (days - UNIX_EPOCH_SERIAL_DAY) * SECONDS_PER_DAY
}

/// Transformation from a serial day count to a [`hifitime::Epoch`] in the UTC time scale
///
/// Argument
/// --------
/// * `days`: elapsed days (fractional) since 1899-12-30 UTC
///
/// Return
/// ------
/// * the corresponding epoch
pub fn serial_days_to_epoch(days: SerialDay) -> Epoch {
    Epoch::from_unix_seconds(serial_days_to_unix_seconds(days))
}

/// Transformation from Unix seconds back to an [`Epoch`]
///
/// Used to report the time span of loaded segments, see
/// [`Segment::epoch_span`](crate::samples::Segment::epoch_span).
pub fn unix_seconds_to_epoch(t: Second) -> Epoch {
    Epoch::from_unix_seconds(t)
}

#[cfg(test)]
mod time_test {
    use super::*;

    #[test]
    fn test_serial_day_offset() {
        assert_eq!(serial_days_to_unix_seconds(25569.0), 0.0);
        assert_eq!(serial_days_to_unix_seconds(25570.0), 86_400.0);
        assert_eq!(serial_days_to_unix_seconds(25568.5), -43_200.0);
    }

    #[test]
    fn test_serial_days_to_epoch() {
        let epoch = serial_days_to_epoch(25569.5);
        assert_eq!(epoch.to_gregorian_utc(), (1970, 1, 1, 12, 0, 0, 0));

        // 2008-10-23 02:53:04 UTC, first row of Geolife user 000
        let epoch = serial_days_to_epoch(39744.1201851852);
        let (y, m, d, h, min, _, _) = epoch.to_gregorian_utc();
        assert_eq!((y, m, d, h, min), (2008, 10, 23, 2, 53));
    }

    #[test]
    fn test_epoch_roundtrip() {
        let t = serial_days_to_unix_seconds(39744.1201851852);
        let back = unix_seconds_to_epoch(t).to_unix_seconds();
        assert!((back - t).abs() < 1e-3);
    }
}
