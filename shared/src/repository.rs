//! Record lookups behind capability traits.
//!
//! Handlers only see the traits; the Postgres implementations live beside
//! them. Requested identifiers that match nothing are silently absent from
//! the result, never an error.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::models::{AppointmentRecord, EventRecord, Location};
use crate::Result;

/// Lookup of events by identifier set.
#[async_trait]
pub trait EventLookup: Send + Sync {
    /// Fetch the events whose uid appears in `ids`. Unordered; missing and
    /// unparseable ids are omitted.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<EventRecord>>;
}

/// Lookup of appointments by identifier set.
#[async_trait]
pub trait AppointmentLookup: Send + Sync {
    /// Fetch the appointments whose uid appears in `ids`. Unordered; missing
    /// and unparseable ids are omitted.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<AppointmentRecord>>;
}

/// Uids are positive integers; anything else in the requested id list can
/// match nothing and is dropped before the query.
fn parse_uids(ids: &[String]) -> Vec<i64> {
    ids.iter()
        .filter_map(|id| id.parse::<i64>().ok())
        .filter(|uid| *uid > 0)
        .collect()
}

/// Postgres-backed event lookup.
pub struct PgEventLookup {
    pool: PgPool,
}

impl PgEventLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLookup for PgEventLookup {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<EventRecord>> {
        let uids = parse_uids(ids);
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        type EventRow = (
            i64,
            String,
            String,
            NaiveDateTime,
            NaiveDateTime,
            String,
            Option<f64>,
            Option<f64>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        );

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.uid, e.title, e.description, e.start_time, e.end_time, e.timezone,
                   l.latitude, l.longitude,
                   l.street, l.street_nr, l.postal_code, l.city, l.country
            FROM events e
            LEFT JOIN locations l ON l.uid = e.location_uid
            WHERE e.uid = ANY($1)
            ORDER BY e.uid ASC
            "#,
        )
        .bind(&uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    uid,
                    title,
                    description,
                    start,
                    end,
                    timezone,
                    latitude,
                    longitude,
                    street,
                    street_nr,
                    postal_code,
                    city,
                    country,
                )| EventRecord {
                    uid,
                    title,
                    description,
                    start,
                    end,
                    timezone,
                    location: Location {
                        latitude,
                        longitude,
                        street: street.unwrap_or_default(),
                        street_nr: street_nr.unwrap_or_default(),
                        postal_code: postal_code.unwrap_or_default(),
                        city: city.unwrap_or_default(),
                        country: country.unwrap_or_default(),
                    },
                },
            )
            .collect())
    }
}

/// Postgres-backed appointment lookup.
pub struct PgAppointmentLookup {
    pool: PgPool,
}

impl PgAppointmentLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentLookup for PgAppointmentLookup {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<AppointmentRecord>> {
        let uids = parse_uids(ids);
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (i64, NaiveDateTime, NaiveDateTime, String)>(
            r#"
            SELECT uid, start_time, end_time, timezone
            FROM appointments
            WHERE uid = ANY($1)
            ORDER BY uid ASC
            "#,
        )
        .bind(&uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(uid, start, end, timezone)| AppointmentRecord {
                uid,
                start,
                end,
                timezone,
            })
            .collect())
    }
}
