//! Google Calendar deep links for events.
//!
//! Builds a `calendar/render` URL that pre-populates the "create event" form
//! with the event's converted times, text fields, and a Google Maps query for
//! its venue.

use chrono::NaiveDateTime;
use chrono_tz::Tz;

use crate::models::{EventRecord, Location};
use crate::timezone::{end_in_timezone, start_in_timezone, LOCAL_FORMAT};
use crate::{Error, Result};

/// Compact datetime format required by the Google Calendar URL schema.
const GOOGLE_CALENDAR_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Build the Google Calendar URL for an event.
///
/// Passing the event's own canonical zone as target is the normal case; an
/// explicit target re-expresses the times before formatting.
pub fn google_calendar_url(event: &EventRecord, target: Tz) -> Result<String> {
    let maps_url = google_maps_url(&event.location);

    let start = google_calendar_date(&start_in_timezone(event, target)?)?;
    let end = google_calendar_date(&end_in_timezone(event, target)?)?;

    let title = urlencoding::encode(&event.title);
    let description = urlencoding::encode(&event.description);

    Ok(format!(
        "https://www.google.com/calendar/render?action=TEMPLATE&text={}&dates={}/{}&details={}&location={}",
        title, start, end, description, maps_url
    ))
}

/// Reformat a converted local datetime into the compact calendar form.
fn google_calendar_date(local: &str) -> Result<String> {
    let parsed = NaiveDateTime::parse_from_str(local, LOCAL_FORMAT)
        .map_err(|e| Error::MalformedRecordTime(format!("unparseable local datetime {}: {}", local, e)))?;

    Ok(parsed.format(GOOGLE_CALENDAR_FORMAT).to_string())
}

/// Get the Google Maps URL for a location, preferring coordinates.
fn google_maps_url(location: &Location) -> String {
    if location.latitude.is_some() && location.longitude.is_some() {
        return maps_url_from_coordinates(location);
    }

    maps_url_from_address(location)
}

/// Maps URL from latitude/longitude.
///
/// A zero coordinate is treated as absent here and yields an empty location
/// rather than falling back to the address. Kept for client compatibility;
/// see DESIGN.md before changing.
fn maps_url_from_coordinates(location: &Location) -> String {
    let (Some(latitude), Some(longitude)) = (location.latitude, location.longitude) else {
        return String::new();
    };

    if latitude == 0.0 || longitude == 0.0 {
        return String::new();
    }

    format!("https://www.google.com/maps?q={},{}", latitude, longitude)
}

/// Maps URL from the postal address.
///
/// Missing address fields simply leave extra separators in the query; clients
/// tolerate them and the output is kept byte-compatible.
fn maps_url_from_address(location: &Location) -> String {
    let address = format!(
        "{} {}, {} {}, {}",
        location.street, location.street_nr, location.postal_code, location.city, location.country
    );

    let encoded = urlencoding::encode(address.trim());

    format!("https://www.google.com/maps/search/?q={}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Tz;

    fn berlin() -> Tz {
        "Europe/Berlin".parse().unwrap()
    }

    fn sample_event(location: Location) -> EventRecord {
        EventRecord {
            uid: 7,
            title: "Surf & Yoga".to_string(),
            description: "Bring a towel".to_string(),
            location,
            start: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            timezone: "Europe/Berlin".to_string(),
        }
    }

    fn coordinates(latitude: f64, longitude: f64) -> Location {
        Location {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Location::default()
        }
    }

    #[test]
    fn test_maps_url_prefers_coordinates() {
        let url = google_maps_url(&coordinates(52.5, 13.4));
        assert_eq!(url, "https://www.google.com/maps?q=52.5,13.4");
    }

    #[test]
    fn test_zero_coordinates_yield_empty_location() {
        // (0, 0) passes the presence check but is treated as absent, and the
        // address is deliberately not consulted.
        let mut location = coordinates(0.0, 0.0);
        location.city = "Berlin".to_string();

        assert_eq!(google_maps_url(&location), "");
    }

    #[test]
    fn test_maps_url_from_full_address() {
        let location = Location {
            street: "Strandweg".to_string(),
            street_nr: "12".to_string(),
            postal_code: "25999".to_string(),
            city: "Kampen".to_string(),
            country: "Germany".to_string(),
            ..Location::default()
        };

        assert_eq!(
            google_maps_url(&location),
            "https://www.google.com/maps/search/?q=Strandweg%2012%2C%2025999%20Kampen%2C%20Germany"
        );
    }

    #[test]
    fn test_missing_address_fields_keep_separators() {
        let location = Location {
            city: "Berlin".to_string(),
            ..Location::default()
        };

        // " , " + " Berlin" + ", " with the outer whitespace trimmed.
        assert_eq!(
            google_maps_url(&location),
            "https://www.google.com/maps/search/?q=%2C%20%20Berlin%2C"
        );
    }

    #[test]
    fn test_calendar_url_template() {
        let url = google_calendar_url(&sample_event(coordinates(52.5, 13.4)), berlin()).unwrap();

        assert_eq!(
            url,
            "https://www.google.com/calendar/render?action=TEMPLATE\
             &text=Surf%20%26%20Yoga\
             &dates=20240601T100000/20240601T120000\
             &details=Bring%20a%20towel\
             &location=https://www.google.com/maps?q=52.5,13.4"
        );
    }

    #[test]
    fn test_calendar_url_converts_into_target_zone() {
        // Berlin 10:00 CEST is 08:00 UTC.
        let url = google_calendar_url(
            &sample_event(coordinates(52.5, 13.4)),
            "UTC".parse().unwrap(),
        )
        .unwrap();

        assert!(url.contains("&dates=20240601T080000/20240601T100000&"));
    }
}
