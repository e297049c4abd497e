//! Datetime units and ISO-8601 text conversion.
//!
//! Datetimes are stored as a signed 64-bit count of units since
//! 1970-01-01T00:00. Only units with a fixed length in nanoseconds are
//! supported, which keeps every conversion a rescale.

use std::fmt;

/// Sentinel count for "not a time".
pub const NAT: i64 = i64::MIN;

const NANOS_PER_DAY: i128 = 86_400 * 1_000_000_000;

/// Resolution of a datetime instance, ordered from coarse to fine.
///
/// `Generic` is the unit of a datetime whose resolution is not yet known;
/// it loses to every concrete unit during unification.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    Generic,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds (`None` for `Generic`).
    pub const fn nanos(self) -> Option<i128> {
        match self {
            TimeUnit::Generic => None,
            TimeUnit::Week => Some(7 * NANOS_PER_DAY),
            TimeUnit::Day => Some(NANOS_PER_DAY),
            TimeUnit::Hour => Some(3_600_000_000_000),
            TimeUnit::Minute => Some(60_000_000_000),
            TimeUnit::Second => Some(1_000_000_000),
            TimeUnit::Millisecond => Some(1_000_000),
            TimeUnit::Microsecond => Some(1_000),
            TimeUnit::Nanosecond => Some(1),
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Generic => "",
            TimeUnit::Week => "W",
            TimeUnit::Day => "D",
            TimeUnit::Hour => "h",
            TimeUnit::Minute => "m",
            TimeUnit::Second => "s",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Microsecond => "us",
            TimeUnit::Nanosecond => "ns",
        }
    }

    /// The finer of two units.
    #[must_use]
    pub fn finer(self, other: TimeUnit) -> TimeUnit {
        self.max(other)
    }

    /// Characters needed to render any in-range date in this unit.
    pub const fn iso_len(self) -> usize {
        match self {
            TimeUnit::Generic => 21,
            TimeUnit::Week | TimeUnit::Day => 10,
            TimeUnit::Hour => 13,
            TimeUnit::Minute => 16,
            TimeUnit::Second => 19,
            TimeUnit::Millisecond => 23,
            TimeUnit::Microsecond => 26,
            TimeUnit::Nanosecond => 29,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Generic => write!(f, "generic"),
            unit => write!(f, "{}", unit.suffix()),
        }
    }
}

/// Rescale a count from one unit to another, flooring toward negative
/// infinity. `None` on overflow.
///
/// `NAT` maps to `NAT`; a generic count keeps its value.
pub fn convert(value: i64, from: TimeUnit, to: TimeUnit) -> Option<i64> {
    if value == NAT {
        return Some(NAT);
    }
    let (Some(from_nanos), Some(to_nanos)) = (from.nanos(), to.nanos()) else {
        return Some(value);
    };
    let scaled = i128::from(value).checked_mul(from_nanos)?.div_euclid(to_nanos);
    i64::try_from(scaled).ok().filter(|v| *v != NAT)
}

/// Days since the epoch of a proleptic Gregorian date.
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = (if year >= 0 { year } else { year - 399 }) / 400;
    let yoe = year - era * 400;
    let mp = i64::from((month + 9) % 12);
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Proleptic Gregorian date of a day count since the epoch.
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if month <= 2 { year + 1 } else { year }, month, day)
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

fn parse_field(text: &str, digits: usize) -> Option<u32> {
    if text.len() != digits || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse an ISO-8601 date or date-time.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` and `YYYY-MM-DDTHH:MM:SS`
/// (a space may replace the `T`), plus `NaT`. Returns the count together
/// with the unit implied by the text's precision.
pub fn parse_iso(text: &str) -> Option<(i64, TimeUnit)> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("nat") {
        return Some((NAT, TimeUnit::Generic));
    }
    let (date, time) = match text.find(|c: char| c == 'T' || c == ' ') {
        Some(split) => (&text[..split], Some(&text[split + 1..])),
        None => (text, None),
    };

    let mut parts = date.splitn(3, '-');
    let year = parse_field(parts.next()?, 4)?;
    let month = parse_field(parts.next()?, 2)?;
    let day = parse_field(parts.next()?, 2)?;
    let year = i64::from(year);
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return None;
    }
    let days = days_from_civil(year, month, day);

    let Some(time) = time else {
        return Some((days, TimeUnit::Day));
    };
    let mut fields = time.split(':');
    let hour = parse_field(fields.next()?, 2)?;
    let minute = parse_field(fields.next()?, 2)?;
    let second = match fields.next() {
        Some(s) => Some(parse_field(s, 2)?),
        None => None,
    };
    if fields.next().is_some() || hour > 23 || minute > 59 || second.is_some_and(|s| s > 59) {
        return None;
    }
    let minutes = days * 1440 + i64::from(hour) * 60 + i64::from(minute);
    match second {
        Some(second) => Some((minutes * 60 + i64::from(second), TimeUnit::Second)),
        None => Some((minutes, TimeUnit::Minute)),
    }
}

/// Whether `text` parses as an ISO-8601 datetime.
pub fn looks_like_iso(text: &str) -> bool {
    parse_iso(text).is_some_and(|(value, _)| value != NAT)
}

/// Render a count in `unit` as ISO-8601 text at that unit's precision.
pub fn format_iso(value: i64, unit: TimeUnit) -> String {
    if value == NAT {
        return "NaT".to_owned();
    }
    let Some(nanos) = unit.nanos() else {
        return value.to_string();
    };
    let total = i128::from(value) * nanos;
    let days = total.div_euclid(NANOS_PER_DAY) as i64;
    let rem = total.rem_euclid(NANOS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    let mut out = format!("{year:04}-{month:02}-{day:02}");

    let hour = rem / 3_600_000_000_000;
    let minute = rem / 60_000_000_000 % 60;
    let second = rem / 1_000_000_000 % 60;
    let frac = rem % 1_000_000_000;
    match unit {
        TimeUnit::Generic | TimeUnit::Week | TimeUnit::Day => {}
        TimeUnit::Hour => out.push_str(&format!("T{hour:02}")),
        TimeUnit::Minute => out.push_str(&format!("T{hour:02}:{minute:02}")),
        TimeUnit::Second => out.push_str(&format!("T{hour:02}:{minute:02}:{second:02}")),
        TimeUnit::Millisecond => out.push_str(&format!(
            "T{hour:02}:{minute:02}:{second:02}.{:03}",
            frac / 1_000_000
        )),
        TimeUnit::Microsecond => out.push_str(&format!(
            "T{hour:02}:{minute:02}:{second:02}.{:06}",
            frac / 1_000
        )),
        TimeUnit::Nanosecond => {
            out.push_str(&format!("T{hour:02}:{minute:02}:{second:02}.{frac:09}"));
        }
    }
    out
}
