//! Calendar Link Lambda - builds Google Calendar deep links for events.
//!
//! Endpoint:
//! - GET /api/surfcamp-events/get-calendar-link?id=<uid>&timezone=<optional>
//!
//! Without an explicit timezone the link uses the event's own canonical zone.

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shared::calendar::google_calendar_url;
use shared::http::{error_response, json_response, ApiResponse};
use shared::repository::{EventLookup, PgEventLookup};
use shared::timezone::parse_timezone;
use shared::{db, secrets, Config};

const CALENDAR_LINK_PATH: &str = "/api/surfcamp-events/get-calendar-link";

/// Application state
struct AppState<E> {
    events: E,
}

async fn handler<E: EventLookup>(
    state: Arc<AppState<E>>,
    event: Request,
) -> Result<Response<Body>, Error> {
    if event.uri().path() != CALENDAR_LINK_PATH {
        return error_response(404, "Not found");
    }

    let params = event.query_string_parameters();

    let Some(id) = params.first("id") else {
        let err = shared::Error::MissingParameter("id".to_string());
        return error_response(err.status_code(), err.to_string());
    };

    let records = state.events.find_by_ids(&[id.to_string()]).await?;
    let Some(record) = records.into_iter().next() else {
        let err = shared::Error::NotFound(format!("event {}", id));
        return error_response(err.status_code(), err.to_string());
    };

    let target_name = params
        .first("timezone")
        .filter(|tz| !tz.is_empty())
        .unwrap_or(&record.timezone);

    let target = match parse_timezone(target_name) {
        Ok(target) => target,
        Err(e) => return error_response(e.status_code(), e.to_string()),
    };

    let url = match google_calendar_url(&record, target) {
        Ok(url) => url,
        Err(e) => return error_response(e.status_code(), e.to_string()),
    };

    info!("Built calendar link for event {}", record.uid);

    json_response(
        200,
        &ApiResponse::success(serde_json::json!({
            "eventId": record.uid,
            "url": url,
        })),
    )
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env().map_err(|e| shared::Error::Config(e.to_string()))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

    let credentials =
        secrets::get_database_credentials(&secrets_client, &config.db_secret_arn).await?;
    let pool = db::create_pool(&config, &credentials).await?;

    let state = Arc::new(AppState {
        events: PgEventLookup::new(pool),
    });

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
