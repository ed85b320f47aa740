//! Local date-time → canonical UTC instant.
//!
//! Patients type a wall-clock time (`2024-06-01T10:00`, the shape of an HTML
//! `datetime-local` input). It is read in the clinic's zone and pinned to an
//! absolute instant before it leaves the form. Input that already carries an
//! offset is taken as-is.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};

use super::SubmissionError;
use crate::config::ClinicTimeZone;

/// Accepted zone-less shapes, most common first.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Convert user input into an absolute UTC instant.
///
/// A wall time that occurs twice (DST fall-back) resolves to the earlier
/// instant. A wall time skipped by a DST jump is read with the offset in
/// force before the jump, which moves it forward by the gap (02:30 on a
/// spring-forward night becomes 03:30).
pub fn to_canonical_timestamp(
    input: &str,
    zone: ClinicTimeZone,
) -> Result<DateTime<Utc>, SubmissionError> {
    let trimmed = input.trim();
    let invalid = || SubmissionError::InvalidDateTime(input.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(absolute) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(absolute.with_timezone(&Utc));
    }

    let naive = parse_local(trimmed).ok_or_else(invalid)?;
    let resolved = match zone {
        ClinicTimeZone::Local => resolve_in(&Local, &naive),
        ClinicTimeZone::Fixed(offset) => resolve_in(&offset, &naive),
    };
    resolved.ok_or_else(invalid)
}

fn parse_local(input: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

fn resolve_in<Tz: TimeZone>(zone: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => {
            let day_before = naive.checked_sub_signed(Duration::days(1))?;
            let offset = zone.from_local_datetime(&day_before).earliest()?.offset().fix();
            let utc = naive.checked_sub_signed(Duration::seconds(offset.local_minus_utc().into()))?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}
