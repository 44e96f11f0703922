//! Timezone resolution and wall-clock conversion.
//!
//! Stored record times are wall-clock values anchored to the record's own
//! canonical IANA zone. Conversion re-anchors them in a caller-chosen target
//! zone under full IANA rules, so times near a DST transition resolve to the
//! correct offset for that date.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

use crate::models::{ConvertedTimeEntry, TimedRecord};
use crate::{Error, Result};

/// Local datetime format used in API responses; the offset is implied by the
/// accompanying `timezone` field.
pub const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Source of the fallback timezone when a request does not carry one.
///
/// The derivation is opaque to the API layer; the production implementation
/// reads the configured service default.
pub trait UserTimezoneProvider: Send + Sync {
    fn user_timezone(&self) -> String;
}

/// Provider backed by the `DEFAULT_TIMEZONE` configuration value.
#[derive(Debug, Clone)]
pub struct ConfigTimezoneProvider {
    default_timezone: String,
}

impl ConfigTimezoneProvider {
    pub fn new(default_timezone: String) -> Self {
        Self { default_timezone }
    }
}

impl UserTimezoneProvider for ConfigTimezoneProvider {
    fn user_timezone(&self) -> String {
        self.default_timezone.clone()
    }
}

/// Validate a timezone identifier against the IANA database.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| Error::InvalidTimezone(name.to_string()))
}

/// Determine the effective timezone for a request.
///
/// An explicit, non-empty `timezone` query parameter wins verbatim; otherwise
/// the injected provider supplies the fallback. Either way the identifier must
/// exist in the IANA database.
pub fn resolve_timezone(param: Option<&str>, provider: &impl UserTimezoneProvider) -> Result<Tz> {
    match param {
        Some(name) if !name.is_empty() => parse_timezone(name),
        _ => parse_timezone(&provider.user_timezone()),
    }
}

/// Anchor a stored wall-clock time in the record's canonical zone.
///
/// Ambiguous local times (the repeated hour at a DST fall-back) resolve to the
/// earlier offset. A wall-clock that does not exist in the zone (DST gap) is
/// corrupt stored data.
fn anchor_in_source(wall: NaiveDateTime, source: &str) -> Result<DateTime<Tz>> {
    let zone: Tz = source
        .parse()
        .map_err(|_| Error::MalformedRecordTime(format!("unknown canonical timezone {}", source)))?;

    zone.from_local_datetime(&wall)
        .earliest()
        .ok_or_else(|| {
            Error::MalformedRecordTime(format!("{} does not exist in {}", wall, source))
        })
}

/// Re-express a stored wall-clock time in the target zone as a local string.
pub fn convert_wall_clock(wall: NaiveDateTime, source: &str, target: Tz) -> Result<String> {
    let anchored = anchor_in_source(wall, source)?;
    Ok(anchored.with_timezone(&target).format(LOCAL_FORMAT).to_string())
}

/// Convert a record's start into the target zone.
pub fn start_in_timezone<R: TimedRecord>(record: &R, target: Tz) -> Result<String> {
    convert_wall_clock(record.start_wall(), record.source_timezone(), target)
}

/// Convert a record's end into the target zone.
pub fn end_in_timezone<R: TimedRecord>(record: &R, target: Tz) -> Result<String> {
    convert_wall_clock(record.end_wall(), record.source_timezone(), target)
}

/// Convert a batch of records into the target zone, keyed by uid.
///
/// A record whose stored time cannot be interpreted is skipped with a warning
/// rather than failing the batch or producing a wrong time.
pub fn convert_records<R: TimedRecord>(records: &[R], target: Tz) -> BTreeMap<String, ConvertedTimeEntry> {
    let mut data = BTreeMap::new();

    for record in records {
        let converted = start_in_timezone(record, target)
            .and_then(|start| end_in_timezone(record, target).map(|end| (start, end)));

        let (start_date, end_date) = match converted {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Skipping record {}: {}", record.uid(), e);
                continue;
            }
        };

        data.insert(
            record.uid().to_string(),
            ConvertedTimeEntry {
                event_id: record.uid(),
                start_date,
                end_date,
                timezone: target.name().to_string(),
            },
        );
    }

    data
}
