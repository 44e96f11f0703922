//! Shared library for Surfcamp Events Lambda functions.
//!
//! This crate provides the domain models, timezone conversion, calendar link
//! building, and storage/config plumbing used across all Lambda functions.

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod repository;
pub mod secrets;
pub mod timezone;

pub use calendar::google_calendar_url;
pub use config::Config;
pub use error::{Error, Result};
pub use http::ApiResponse;
pub use models::{AppointmentRecord, ConvertedTimeEntry, EventRecord, Location, RecordKind, TimedRecord};
pub use repository::{AppointmentLookup, EventLookup, PgAppointmentLookup, PgEventLookup};
pub use secrets::{get_secret, get_database_credentials, DatabaseCredentials};
pub use timezone::{convert_records, parse_timezone, resolve_timezone, ConfigTimezoneProvider, UserTimezoneProvider};
