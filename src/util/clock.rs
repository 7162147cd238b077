use time::{OffsetDateTime, UtcOffset};

pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Local wall-clock time. Inside the browser the time and timezone come from
/// the JavaScript `Date`; elsewhere from the operating system.
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now(&self) -> OffsetDateTime {
        let date = js_sys::Date::new_0();
        let unix_millis = date.get_time() as i128;
        // getTimezoneOffset is UTC minus local, in minutes.
        let offset_seconds = -(date.get_timezone_offset() as i32) * 60;
        let offset = UtcOffset::from_whole_seconds(offset_seconds).unwrap_or(UtcOffset::UTC);

        OffsetDateTime::from_unix_timestamp_nanos(unix_millis * 1_000_000)
            .map(|utc| utc.to_offset(offset))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now(&self) -> OffsetDateTime {
        let utc = OffsetDateTime::now_utc();
        match UtcOffset::current_local_offset() {
            Ok(offset) => utc.to_offset(offset),
            Err(_) => utc,
        }
    }
}

pub struct FixedClock {
    at: OffsetDateTime,
}

impl FixedClock {
    pub fn new(at: OffsetDateTime) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.at
    }
}

pub fn unix_millis(at: OffsetDateTime) -> i128 {
    at.unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn fixed_clock_always_returns_same_instant() {
        let clock = FixedClock::new(datetime!(2024-03-01 09:30 UTC));
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), datetime!(2024-03-01 09:30 UTC));
    }

    #[test]
    fn unix_millis_truncates_nanos() {
        assert_eq!(unix_millis(datetime!(1970-01-01 00:00:01.5 UTC)), 1500);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn system_clock_is_after_epoch() {
        assert!(SystemClock.now() > OffsetDateTime::UNIX_EPOCH);
    }
}
