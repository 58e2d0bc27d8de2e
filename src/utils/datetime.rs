use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;

use crate::dialog::Instant;

/// `at` as a wall-clock instant in `timezone`.
pub fn in_timezone(at: DateTime<Utc>, timezone: Tz) -> Instant {
    let local = at.with_timezone(&timezone);
    local.with_timezone(&local.offset().fix())
}

/// Current time in the named IANA timezone. Unknown names fall back to UTC.
pub fn now_in(timezone: &str) -> Instant {
    let tz = match timezone.parse::<Tz>() {
        Ok(tz) => tz,
        Err(e) => {
            tracing::warn!("Unknown timezone '{}', using UTC: {}", timezone, e);
            Tz::UTC
        }
    };
    in_timezone(Utc::now(), tz)
}

pub fn format_date(dt: &Instant) -> String {
    dt.format("%d.%m.%Y").to_string()
}

pub fn format_time(dt: &Instant) -> String {
    dt.format("%H:%M").to_string()
}

pub fn format_datetime(dt: &Instant) -> String {
    dt.format("%d.%m.%Y %H:%M").to_string()
}

/// Human-readable span of an event, in the offset the instants carry.
pub fn format_span(from: &Instant, to: &Instant, full_day: bool) -> String {
    if full_day {
        return format!("{}, весь день", format_date(from));
    }
    if from.date_naive() == to.date_naive() {
        format!("{} {}–{}", format_date(from), format_time(from), format_time(to))
    } else {
        format!("{} – {}", format_datetime(from), format_datetime(to))
    }
}
