use crate::clock::{self, Clock, SystemClock};
use crate::db::ReadingStore;
use crate::errors::Error;
use crate::metrics::{
    DB_FAILURES_TOTAL, INGEST_LATENCY_SECONDS, QUERIES_TOTAL, QUERY_LATENCY_SECONDS,
    READINGS_INGESTED_TOTAL, READINGS_REJECTED_TOTAL,
};
use crate::model::{ErrorResponse, IngestForm, ReadingsResponse};
use crate::validate::validate;
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Form, Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

pub const INGEST_PATH: &str = "/api/v1/readings/ingest";
pub const QUERY_PATH: &str = "/api/v1/readings";
// Legacy paths still used by deployed devices.
pub const LEGACY_INGEST_PATH: &str = "/post_reading.php";
pub const LEGACY_QUERY_PATH: &str = "/get_readings.php";

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed.";

#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub clock: Arc<dyn Clock>,
}

impl<S: ReadingStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

pub fn create_router<S: ReadingStore>(state: AppState<S>) -> Router {
    Router::new()
        .route(INGEST_PATH, ingest_route())
        .route(LEGACY_INGEST_PATH, ingest_route())
        .route(QUERY_PATH, query_route())
        .route(LEGACY_QUERY_PATH, query_route())
        .with_state(state)
}

fn ingest_route<S: ReadingStore>() -> MethodRouter<AppState<S>> {
    post(ingest_reading::<S>).fallback(ingest_method_not_allowed)
}

fn query_route<S: ReadingStore>() -> MethodRouter<AppState<S>> {
    get(recent_readings::<S>).fallback(query_method_not_allowed)
}

async fn ingest_reading<S: ReadingStore>(
    State(state): State<AppState<S>>,
    form: Result<Form<IngestForm>, FormRejection>,
) -> Result<&'static str, AppError> {
    // An unreadable body has no usable fields, so it fails the presence check.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("Unreadable ingest body: {}", rejection);
            IngestForm::default()
        }
    };

    let reading = validate(form).inspect_err(|e| {
        debug!("Rejected submission: {}", e);
        READINGS_REJECTED_TOTAL.inc();
    })?;

    let created_at = clock::bucket_start(state.clock.now())?;

    let start = Instant::now();
    state
        .store
        .upsert(&reading, created_at)
        .await
        .inspect_err(|e| {
            DB_FAILURES_TOTAL.inc();
            error!("Failed to store reading for {}: {}", reading.device_id, e);
        })?;
    INGEST_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());
    READINGS_INGESTED_TOTAL.inc();

    debug!(
        "Stored reading for {} in bucket {}",
        reading.device_id,
        clock::format_timestamp(&created_at)
    );

    Ok("OK")
}

async fn recent_readings<S: ReadingStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<ReadingsResponse>, AppError> {
    let window_start = clock::window_start(state.clock.now())?;

    let start = Instant::now();
    let readings = state.store.since(window_start).await.inspect_err(|e| {
        DB_FAILURES_TOTAL.inc();
        error!("Failed to fetch readings: {}", e);
    })?;
    QUERY_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());
    QUERIES_TOTAL.inc();

    Ok(Json(ReadingsResponse::success(readings)))
}

async fn ingest_method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}

async fn query_method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new(METHOD_NOT_ALLOWED)),
    )
}

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0.downcast_ref::<Error>() {
            Some(Error::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()).into_response(),
            _ => {
                error!("API error: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(self.0.to_string())),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
