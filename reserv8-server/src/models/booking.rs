//! Booking request fields

use std::fmt;

use chrono::NaiveDate;

use super::{ValidationError, DEFAULT_TOTAL_TABLES};

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PHONE_LEN: usize = 32;

/// Calendar date of a booking (ISO `YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookingDate(NaiveDate);

impl BookingDate {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "date" });
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "date",
                reason: "expected YYYY-MM-DD",
            })
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for BookingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Number of tables requested in one booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCount(i32);

impl TableCount {
    /// A single table, the booking form's default.
    pub const ONE: Self = Self(1);

    /// Accepts 1 up to a fresh slot's capacity.
    pub fn new(n: i64) -> Result<Self, ValidationError> {
        if n < 1 || n > i64::from(DEFAULT_TOTAL_TABLES) {
            return Err(ValidationError::OutOfRange {
                field: "tables",
                min: 1,
                max: i64::from(DEFAULT_TOTAL_TABLES),
            });
        }
        Ok(Self(n as i32))
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

/// Customer name shown on the booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerName(String);

impl CustomerName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if s.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Address the confirmation email goes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }
        if s.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        let well_formed = match s.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !s.contains(char::is_whitespace)
            }
            None => false,
        };
        if !well_formed {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "expected an address like name@example.com",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional contact number, stored as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPhone(String);

impl ContactPhone {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "phone" });
        }
        if s.chars().count() > MAX_PHONE_LEN {
            return Err(ValidationError::TooLong {
                field: "phone",
                max: MAX_PHONE_LEN,
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parses_iso() {
        let d = BookingDate::new("2025-03-14").unwrap();
        assert_eq!(d.to_string(), "2025-03-14");
    }

    #[test]
    fn date_rejects_other_formats() {
        assert!(matches!(BookingDate::new(""), Err(ValidationError::Empty { .. })));
        assert!(BookingDate::new("14/03/2025").is_err());
        assert!(BookingDate::new("2025-02-30").is_err());
    }

    #[test]
    fn table_count_range() {
        assert_eq!(TableCount::new(1).unwrap().get(), 1);
        assert_eq!(TableCount::new(10).unwrap().get(), 10);
        assert!(matches!(
            TableCount::new(0),
            Err(ValidationError::OutOfRange { min: 1, max: 10, .. })
        ));
        assert!(TableCount::new(-3).is_err());
        assert!(TableCount::new(11).is_err());
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(CustomerName::new("  Asha  ").unwrap().as_str(), "Asha");
        assert!(CustomerName::new("   ").is_err());
        assert!(matches!(
            CustomerName::new(&"x".repeat(101)),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn email_shape() {
        assert!(ContactEmail::new("guest@example.com").is_ok());
        assert!(ContactEmail::new("guest@").is_err());
        assert!(ContactEmail::new("@example.com").is_err());
        assert!(ContactEmail::new("guest.example.com").is_err());
        assert!(ContactEmail::new("a@b@c").is_err());
        assert!(ContactEmail::new("gu est@example.com").is_err());
    }

    #[test]
    fn phone_fits_column() {
        let phone = ContactPhone::new(" +44 20 7946 0000 ").unwrap();
        assert_eq!(phone.as_str(), "+44 20 7946 0000");
        assert!(ContactPhone::new(&"9".repeat(32)).is_ok());
        assert!(matches!(
            ContactPhone::new(&"9".repeat(33)),
            Err(ValidationError::TooLong { field: "phone", max: 32 })
        ));
        assert!(matches!(ContactPhone::new("  "), Err(ValidationError::Empty { .. })));
    }
}
