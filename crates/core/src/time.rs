use std::fmt;
use thiserror::Error;

/// Wall-clock time of day, stored as seconds since midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("empty time value")]
    Empty,
    #[error("invalid time format: {0:?}. Expected HH:MM / HH:MM:SS / HH:MM AM/PM")]
    Malformed(String),
}

impl ClockTime {
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self(hour * 3600 + minute * 60 + second))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    pub fn minutes(self) -> u32 {
        self.0 / 60
    }

    /// Parses `HH:MM`, `HH:MM:SS`, `H:MM AM/PM` or `H AM/PM`. A `.` is accepted
    /// in place of `:`.
    pub fn parse(raw: &str) -> Result<Self, TimeError> {
        let normalized = raw.trim().to_ascii_uppercase().replace('.', ":");
        if normalized.is_empty() {
            return Err(TimeError::Empty);
        }
        let malformed = || TimeError::Malformed(raw.to_string());

        let (clock, meridiem) = match split_meridiem(&normalized) {
            Some((clock, pm)) => (clock, Some(pm)),
            None => (normalized.as_str(), None),
        };

        let mut fields = Vec::with_capacity(3);
        for part in clock.split(':') {
            let part = part.trim();
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            fields.push(part.parse::<u32>().map_err(|_| malformed())?);
        }

        let (hour, minute, second) = match (meridiem, fields.as_slice()) {
            (Some(_), [h]) => (*h, 0, 0),
            (_, [h, m]) => (*h, *m, 0),
            (_, [h, m, s]) => (*h, *m, *s),
            _ => return Err(malformed()),
        };

        let hour = match meridiem {
            Some(pm) => {
                if !(1..=12).contains(&hour) {
                    return Err(malformed());
                }
                hour % 12 + if pm { 12 } else { 0 }
            }
            None => hour,
        };

        Self::from_hms(hour, minute, second).ok_or_else(malformed)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

fn split_meridiem(s: &str) -> Option<(&str, bool)> {
    if let Some(rest) = s.strip_suffix("AM") {
        return Some((rest.trim_end(), false));
    }
    if let Some(rest) = s.strip_suffix("PM") {
        return Some((rest.trim_end(), true));
    }
    None
}

fn is_meridiem(token: &str) -> bool {
    token.eq_ignore_ascii_case("AM") || token.eq_ignore_ascii_case("PM")
}

/// Splits a cell holding both bounds of a range, `"01:30 PM 03:00 PM"` or
/// `"13:30 15:00"`, into its two halves. Returns `None` for anything else.
pub fn split_range(raw: &str) -> Option<(String, String)> {
    let mut times: Vec<String> = Vec::new();
    for token in raw.split_whitespace().filter(|t| *t != "-") {
        if is_meridiem(token) {
            let last = times.last_mut()?;
            last.push(' ');
            last.push_str(token);
        } else {
            times.push(token.to_string());
        }
    }
    match <[String; 2]>::try_from(times) {
        Ok([start, end]) => Some((start, end)),
        Err(_) => None,
    }
}

/// Half-open interval overlap on times of day.
pub fn overlaps(a_start: ClockTime, a_end: ClockTime, b_start: ClockTime, b_end: ClockTime) -> bool {
    a_start.max(b_start) < a_end.min(b_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> ClockTime {
        ClockTime::from_hms(h, m, 0).unwrap()
    }

    #[test]
    fn parses_all_accepted_forms() {
        assert_eq!(ClockTime::parse("09:30"), Ok(t(9, 30)));
        assert_eq!(ClockTime::parse(" 13:30:15 ").unwrap().seconds(), 13 * 3600 + 30 * 60 + 15);
        assert_eq!(ClockTime::parse("01:30 PM"), Ok(t(13, 30)));
        assert_eq!(ClockTime::parse("1:30pm"), Ok(t(13, 30)));
        assert_eq!(ClockTime::parse("12:00 AM"), Ok(t(0, 0)));
        assert_eq!(ClockTime::parse("12:15 PM"), Ok(t(12, 15)));
        assert_eq!(ClockTime::parse("1 PM"), Ok(t(13, 0)));
        assert_eq!(ClockTime::parse("1.30 PM"), Ok(t(13, 30)));
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(ClockTime::parse("   "), Err(TimeError::Empty));
        for bad in ["25:00", "9", "13:00 PM", "0:30 AM", "ab:cd", "10:60", "10:00:00:00", "noon"] {
            assert!(
                matches!(ClockTime::parse(bad), Err(TimeError::Malformed(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn renders_with_seconds() {
        assert_eq!(t(8, 5).to_string(), "08:05:00");
        assert_eq!(t(13, 30).minutes(), 13 * 60 + 30);
    }

    #[test]
    fn splits_combined_range_cells() {
        assert_eq!(
            split_range("01:30 PM 03:00 PM"),
            Some(("01:30 PM".into(), "03:00 PM".into()))
        );
        assert_eq!(split_range("13:30 15:00"), Some(("13:30".into(), "15:00".into())));
        assert_eq!(split_range("09:00 - 11:00"), Some(("09:00".into(), "11:00".into())));
        assert_eq!(split_range("09:00"), None);
        assert_eq!(split_range("PM 09:00"), None);
    }

    #[test]
    fn overlap_is_half_open() {
        assert!(overlaps(t(9, 0), t(10, 0), t(9, 30), t(11, 0)));
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
    }
}
