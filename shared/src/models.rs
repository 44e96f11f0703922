//! Shared data models.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A stored event with its venue and text fields.
///
/// Start and end are wall-clock times anchored to the record's own canonical
/// IANA timezone, never bare UTC instants.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub uid: i64,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Canonical IANA zone the stored wall-clock times are anchored to
    pub timezone: String,
}

/// A stored appointment. Structurally an event without text or venue.
#[derive(Debug, Clone)]
pub struct AppointmentRecord {
    pub uid: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timezone: String,
}

/// An event venue: optional coordinates plus a postal address decomposition.
///
/// Address fields default to the empty string when unset. When both
/// coordinates are present and non-zero they take precedence over the
/// address for geo lookups.
#[derive(Debug, Clone, Default)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub street: String,
    pub street_nr: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Which record table a request resolves against.
///
/// Resolved once at the routing boundary; everything downstream is generic
/// over [`TimedRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Events,
    Appointments,
}

/// Access to the timed fields shared by events and appointments.
pub trait TimedRecord {
    fn uid(&self) -> i64;
    fn start_wall(&self) -> NaiveDateTime;
    fn end_wall(&self) -> NaiveDateTime;
    /// The canonical IANA zone the stored wall-clock times belong to.
    fn source_timezone(&self) -> &str;
}

impl TimedRecord for EventRecord {
    fn uid(&self) -> i64 {
        self.uid
    }

    fn start_wall(&self) -> NaiveDateTime {
        self.start
    }

    fn end_wall(&self) -> NaiveDateTime {
        self.end
    }

    fn source_timezone(&self) -> &str {
        &self.timezone
    }
}

impl TimedRecord for AppointmentRecord {
    fn uid(&self) -> i64 {
        self.uid
    }

    fn start_wall(&self) -> NaiveDateTime {
        self.start
    }

    fn end_wall(&self) -> NaiveDateTime {
        self.end
    }

    fn source_timezone(&self) -> &str {
        &self.timezone
    }
}

/// One converted start/end pair as returned by the timezone API.
///
/// The `eventId` field name is used for appointments too; clients already
/// depend on it.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedTimeEntry {
    #[serde(rename = "eventId")]
    pub event_id: i64,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub timezone: String,
}
