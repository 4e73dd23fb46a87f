//! Time slot parsing
//!
//! A slot is a 30-minute bucket of the day. Clients send either the
//! 12-hour form shown in the booking form ("7:30 PM") or 24-hour "HH:MM".
//! Both map onto the same bucket; the canonical form is 24-hour "HH:MM".

use std::fmt;

use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use super::ValidationError;

/// Slot granularity in minutes
pub const SLOT_MINUTES: u16 = 30;

const MINUTES_PER_DAY: u16 = 24 * 60;

static TWELVE_HOUR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*([ap])\.?m\.?$").expect("invalid 12-hour regex")
});

static TWENTY_FOUR_HOUR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("invalid 24-hour regex")
});

/// Validated 30-minute time slot, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Parse a requested time and floor it to its slot.
    ///
    /// # Example
    /// ```
    /// use reserv8_server::models::TimeSlot;
    ///
    /// assert_eq!(TimeSlot::new("7:45 PM").unwrap().to_string(), "19:30");
    /// assert_eq!(TimeSlot::new("12:00 AM").unwrap().to_string(), "00:00");
    /// assert_eq!(TimeSlot::new("09:10").unwrap().to_string(), "09:00");
    /// assert!(TimeSlot::new("25:00").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "time" });
        }

        let (hour, minute) = if let Some(caps) = TWELVE_HOUR_RE.captures(s) {
            let hour: u16 = caps[1].parse().map_err(|_| invalid())?;
            let minute: u16 = caps[2].parse().map_err(|_| invalid())?;
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            let pm = caps[3].eq_ignore_ascii_case("p");
            let hour = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            };
            (hour, minute)
        } else if let Some(caps) = TWENTY_FOUR_HOUR_RE.captures(s) {
            let hour: u16 = caps[1].parse().map_err(|_| invalid())?;
            let minute: u16 = caps[2].parse().map_err(|_| invalid())?;
            if caps.get(3).is_some_and(|sec| sec.as_str() > "59") {
                return Err(invalid());
            }
            (hour, minute)
        } else {
            return Err(invalid());
        };

        if hour > 23 || minute > 59 {
            return Err(invalid());
        }

        Ok(Self::floor(hour * 60 + minute))
    }

    /// Slots covering operating hours, starting at the first slot boundary
    /// at or after `open` and ending before `close`.
    ///
    /// A closing time at or before the opening time runs past midnight.
    pub fn between(open: NaiveTime, close: NaiveTime) -> Vec<Self> {
        let open = (open.hour() * 60 + open.minute()) as u16;
        let mut close = (close.hour() * 60 + close.minute()) as u16;
        if close <= open {
            close += MINUTES_PER_DAY;
        }

        let start = open.div_ceil(SLOT_MINUTES) * SLOT_MINUTES;
        (start..close)
            .step_by(SLOT_MINUTES as usize)
            .map(|m| Self(m % MINUTES_PER_DAY))
            .collect()
    }

    fn floor(minutes: u16) -> Self {
        Self(minutes - minutes % SLOT_MINUTES)
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// 12-hour display form, as used in confirmation emails.
    pub fn to_twelve_hour(&self) -> String {
        let (hour, suffix) = match self.hour() {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{}:{:02} {}", hour, self.minute(), suffix)
    }
}

fn invalid() -> ValidationError {
    ValidationError::InvalidFormat {
        field: "time",
        reason: "expected a time like '7:30 PM' or '19:30'",
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_twelve_hour() {
        assert_eq!(TimeSlot::new("11:00 AM").unwrap().to_string(), "11:00");
        assert_eq!(TimeSlot::new("1:30 PM").unwrap().to_string(), "13:30");
        assert_eq!(TimeSlot::new("12:30 PM").unwrap().to_string(), "12:30");
        assert_eq!(TimeSlot::new("12:15 am").unwrap().to_string(), "00:00");
        assert_eq!(TimeSlot::new("7:00pm").unwrap().to_string(), "19:00");
        assert_eq!(TimeSlot::new(" 6:30 p.m. ").unwrap().to_string(), "18:30");
    }

    #[test]
    fn parses_twenty_four_hour() {
        assert_eq!(TimeSlot::new("19:30").unwrap().to_string(), "19:30");
        assert_eq!(TimeSlot::new("7:05").unwrap().to_string(), "07:00");
        assert_eq!(TimeSlot::new("23:59:59").unwrap().to_string(), "23:30");
    }

    #[test]
    fn floors_to_half_hour() {
        assert_eq!(TimeSlot::new("7:29 PM"), TimeSlot::new("7:00 PM"));
        assert_eq!(TimeSlot::new("7:31 PM"), TimeSlot::new("7:30 PM"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            TimeSlot::new(""),
            Err(ValidationError::Empty { .. })
        ));
        for bad in ["noon", "13:00 PM", "0:30 AM", "24:00", "10:60", "10:00:61", "7 PM"] {
            assert!(
                matches!(TimeSlot::new(bad), Err(ValidationError::InvalidFormat { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn twelve_hour_display() {
        assert_eq!(TimeSlot::new("00:00").unwrap().to_twelve_hour(), "12:00 AM");
        assert_eq!(TimeSlot::new("09:30").unwrap().to_twelve_hour(), "9:30 AM");
        assert_eq!(TimeSlot::new("12:00").unwrap().to_twelve_hour(), "12:00 PM");
        assert_eq!(TimeSlot::new("19:30").unwrap().to_twelve_hour(), "7:30 PM");
    }

    #[test]
    fn slots_between_operating_hours() {
        let slots: Vec<String> = TimeSlot::between(t(11, 0), t(13, 0))
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(slots, ["11:00", "11:30", "12:00", "12:30"]);
    }

    #[test]
    fn slots_start_on_boundary() {
        let slots = TimeSlot::between(t(11, 15), t(12, 15));
        assert_eq!(slots.first().unwrap().to_string(), "11:30");
        assert_eq!(slots.last().unwrap().to_string(), "12:00");
    }

    #[test]
    fn slots_wrap_past_midnight() {
        let slots: Vec<String> = TimeSlot::between(t(23, 0), t(1, 0))
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(slots, ["23:00", "23:30", "00:00", "00:30"]);
    }
}
