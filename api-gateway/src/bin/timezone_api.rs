//! Timezone API Lambda - serves stored event/appointment times in a caller-chosen zone.
//!
//! Endpoints:
//! - GET /api/surfcamp-events/get-time-for-events?ids=<csv>&timezone=<optional>
//! - GET /api/surfcamp-events/get-time-for-appointments?ids=<csv>&timezone=<optional>
//!
//! Any other path is handed to the next handler in the chain untouched.

use std::future::Future;
use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shared::http::{empty_response, error_response, json_response};
use shared::models::RecordKind;
use shared::repository::{AppointmentLookup, EventLookup, PgAppointmentLookup, PgEventLookup};
use shared::timezone::{convert_records, resolve_timezone, ConfigTimezoneProvider, UserTimezoneProvider};
use shared::{db, secrets, Config};

const EVENTS_PATH: &str = "/api/surfcamp-events/get-time-for-events";
const APPOINTMENTS_PATH: &str = "/api/surfcamp-events/get-time-for-appointments";

/// Timezone API middleware over injected record lookups.
struct TimezoneApi<E, A, P> {
    events: E,
    appointments: A,
    timezones: P,
}

impl<E, A, P> TimezoneApi<E, A, P>
where
    E: EventLookup,
    A: AppointmentLookup,
    P: UserTimezoneProvider,
{
    fn new(events: E, appointments: A, timezones: P) -> Self {
        Self {
            events,
            appointments,
            timezones,
        }
    }

    /// Handle a request, delegating unmatched paths to `next` unchanged.
    async fn process<F, Fut>(&self, event: Request, next: F) -> Result<Response<Body>, Error>
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Result<Response<Body>, Error>>,
    {
        let kind = match event.uri().path() {
            EVENTS_PATH => RecordKind::Events,
            APPOINTMENTS_PATH => RecordKind::Appointments,
            _ => return next(event).await,
        };

        let params = event.query_string_parameters();

        let Some(ids) = params.first("ids") else {
            return empty_response(400);
        };
        // Split verbatim: no trimming, no dedup. Empty segments become
        // identifiers that match nothing.
        let ids: Vec<String> = ids.split(',').map(str::to_string).collect();

        let timezone = match resolve_timezone(params.first("timezone"), &self.timezones) {
            Ok(timezone) => timezone,
            Err(e) => return error_response(e.status_code(), e.to_string()),
        };

        let data = match kind {
            RecordKind::Events => {
                convert_records(&self.events.find_by_ids(&ids).await?, timezone)
            }
            RecordKind::Appointments => {
                convert_records(&self.appointments.find_by_ids(&ids).await?, timezone)
            }
        };

        info!(
            "Converted {} of {} requested records into {}",
            data.len(),
            ids.len(),
            timezone.name()
        );

        json_response(200, &data)
    }
}

/// Application state
struct AppState {
    api: TimezoneApi<PgEventLookup, PgAppointmentLookup, ConfigTimezoneProvider>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env().map_err(|e| shared::Error::Config(e.to_string()))?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let credentials =
            secrets::get_database_credentials(&secrets_client, &config.db_secret_arn).await?;
        let pool = db::create_pool(&config, &credentials).await?;

        Ok(Self {
            api: TimezoneApi::new(
                PgEventLookup::new(pool.clone()),
                PgAppointmentLookup::new(pool),
                ConfigTimezoneProvider::new(config.default_timezone),
            ),
        })
    }
}

/// End of the chain when this Lambda is deployed standalone.
async fn pass_through(_event: Request) -> Result<Response<Body>, Error> {
    error_response(404, "Not found")
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { state.api.process(event, pass_through).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use lambda_http::aws_lambda_events::query_map::QueryMap;
    use lambda_http::http;
    use shared::models::{AppointmentRecord, EventRecord, Location};
    use std::collections::HashMap;

    struct StubEvents(Vec<EventRecord>);

    #[async_trait]
    impl EventLookup for StubEvents {
        async fn find_by_ids(&self, ids: &[String]) -> shared::Result<Vec<EventRecord>> {
            Ok(self
                .0
                .iter()
                .filter(|e| ids.contains(&e.uid.to_string()))
                .cloned()
                .collect())
        }
    }

    struct StubAppointments(Vec<AppointmentRecord>);

    #[async_trait]
    impl AppointmentLookup for StubAppointments {
        async fn find_by_ids(&self, ids: &[String]) -> shared::Result<Vec<AppointmentRecord>> {
            Ok(self
                .0
                .iter()
                .filter(|a| ids.contains(&a.uid.to_string()))
                .cloned()
                .collect())
        }
    }

    struct FixedProvider(&'static str);

    impl UserTimezoneProvider for FixedProvider {
        fn user_timezone(&self) -> String {
            self.0.to_string()
        }
    }

    fn wall(h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn sample_event(uid: i64) -> EventRecord {
        EventRecord {
            uid,
            title: "Beach cleanup".to_string(),
            description: "Meet at the pier".to_string(),
            location: Location::default(),
            start: wall(10, 0),
            end: wall(12, 0),
            timezone: "Europe/Berlin".to_string(),
        }
    }

    fn sample_appointment(uid: i64) -> AppointmentRecord {
        AppointmentRecord {
            uid,
            start: wall(9, 30),
            end: wall(10, 0),
            timezone: "Europe/Berlin".to_string(),
        }
    }

    fn api(
        events: Vec<EventRecord>,
        appointments: Vec<AppointmentRecord>,
    ) -> TimezoneApi<StubEvents, StubAppointments, FixedProvider> {
        TimezoneApi::new(
            StubEvents(events),
            StubAppointments(appointments),
            FixedProvider("Europe/Berlin"),
        )
    }

    fn request(path: &str, params: &[(&str, &str)]) -> Request {
        let mut query: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in params {
            query
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }

        http::Request::builder()
            .method("GET")
            .uri(format!("https://surfcamp.example{}", path))
            .body(Body::Empty)
            .unwrap()
            .with_query_string_parameters(QueryMap::from(query))
    }

    async fn never_next(_event: Request) -> Result<Response<Body>, Error> {
        panic!("pass-through must not be taken");
    }

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        match response.body() {
            Body::Text(text) => serde_json::from_str(text).unwrap(),
            other => panic!("expected text body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_ids_is_400_with_empty_body() {
        for path in [EVENTS_PATH, APPOINTMENTS_PATH] {
            let response = api(vec![], vec![])
                .process(request(path, &[("timezone", "UTC")]), never_next)
                .await
                .unwrap();

            assert_eq!(response.status(), 400);
            assert!(matches!(response.body(), Body::Empty));
        }
    }

    #[tokio::test]
    async fn test_unmatched_path_passes_through_unchanged() {
        let response = api(vec![sample_event(5)], vec![])
            .process(request("/api/other", &[("ids", "5")]), |event| async move {
                assert_eq!(event.uri().path(), "/api/other");
                assert_eq!(event.query_string_parameters().first("ids"), Some("5"));
                empty_response(204)
            })
            .await
            .unwrap();

        assert_eq!(response.status(), 204);
    }

    #[tokio::test]
    async fn test_events_convert_into_requested_timezone() {
        let response = api(vec![sample_event(5)], vec![])
            .process(
                request(EVENTS_PATH, &[("ids", "5,999"), ("timezone", "UTC")]),
                never_next,
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            "application/json; charset=utf-8"
        );

        let json = body_json(&response);
        // Unknown id 999 is silently absent, not an error.
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["5"]["eventId"], 5);
        // Berlin 10:00 CEST is 08:00 UTC.
        assert_eq!(json["5"]["startDate"], "2024-06-01T08:00:00");
        assert_eq!(json["5"]["endDate"], "2024-06-01T10:00:00");
        assert_eq!(json["5"]["timezone"], "UTC");
    }

    #[tokio::test]
    async fn test_appointments_reuse_event_id_field() {
        let response = api(vec![], vec![sample_appointment(12)])
            .process(request(APPOINTMENTS_PATH, &[("ids", "12")]), never_next)
            .await
            .unwrap();

        assert_eq!(response.status(), 200);

        let json = body_json(&response);
        assert_eq!(json["12"]["eventId"], 12);
        // No timezone parameter: the provider default applies and the stored
        // wall-clock round-trips.
        assert_eq!(json["12"]["startDate"], "2024-06-01T09:30:00");
        assert_eq!(json["12"]["timezone"], "Europe/Berlin");
    }

    #[tokio::test]
    async fn test_invalid_timezone_is_client_error() {
        let response = api(vec![sample_event(5)], vec![])
            .process(
                request(EVENTS_PATH, &[("ids", "5"), ("timezone", "Mars/Olympus")]),
                never_next,
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_malformed_ids_csv_fails_gracefully() {
        let response = api(vec![sample_event(5)], vec![])
            .process(request(EVENTS_PATH, &[("ids", ",,5,")]), never_next)
            .await
            .unwrap();

        assert_eq!(response.status(), 200);

        let json = body_json(&response);
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["5"]["eventId"], 5);
    }

    #[tokio::test]
    async fn test_empty_ids_value_yields_empty_map() {
        let response = api(vec![sample_event(5)], vec![])
            .process(request(EVENTS_PATH, &[("ids", "")]), never_next)
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response), serde_json::json!({}));
    }
}
