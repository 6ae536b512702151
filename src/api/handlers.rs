//! HTTP request handlers for the pairing API
//!
//! Each handler delegates one load-mutate-save cycle to `RosterService` and
//! maps the outcome to JSON. Failures render as `{"error": "..."}`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task;
use tracing::{error, warn};

use crate::core::{AppState, Error};
use crate::pairing::RosterService;
use crate::storage::StorageImpl;
use crate::types::document::iso_millis;
use crate::types::Pair;

/// Success message for `POST /users`
pub const USER_ADDED: &str = "User added successfully.";
/// Success message for `DELETE /users/{name}`
pub const USER_REMOVED: &str = "User removed successfully.";
/// Success message for `POST /pairs/reset`
pub const PAIRS_RESET: &str = "Pairs reset successfully.";
/// Body parsed as JSON but held the wrong shape
pub const INVALID_JSON_DATA: &str = "Invalid JSON data";

// Response types

/// Error body for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// `GET /pairs` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairsResponse {
    /// Current pairs
    pub pairs: Vec<Pair>,
    /// Time of the last rotation
    #[serde(with = "iso_millis")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// `GET /users` response
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    /// All users in insertion order
    pub users: Vec<String>,
}

/// Response for user additions and removals
#[derive(Debug, Serialize)]
pub struct UserChangeResponse {
    /// Human-readable outcome
    pub message: String,
    /// Users after the change
    pub users: Vec<String>,
}

/// `POST /pairs/reset` response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Human-readable outcome
    pub message: String,
    /// Freshly generated pairs
    pub pairs: Vec<Pair>,
}

/// System health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current system status
    pub status: String,
    /// Service version
    pub version: String,
}

/// `POST /users` body
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    /// Name to add, kept raw so falsy values can be told apart from bad types
    pub name: Option<Value>,
}

impl CreateUserRequest {
    /// The requested name. `null`, `false`, `0` and absence read as missing;
    /// any other non-string is rejected.
    pub fn into_name(self) -> Result<Option<String>, ApiError> {
        match self.name {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v == 0.0) => Ok(None),
            Some(Value::String(name)) => Ok(Some(name)),
            Some(_) => Err(ApiError::bad_request(INVALID_JSON_DATA)),
        }
    }
}

/// Failed request, rendered as `{"error": ...}` with a mapped status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// A 400 with `message`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// HTTP status of the error
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            // Duplicates answer 400, as clients of this API expect
            Error::Validation(_) | Error::Conflict(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if err.is_client_error() {
            Self {
                status,
                message: err.to_string(),
            }
        } else {
            error!(error = %err, "Request failed");
            Self {
                status,
                message: "Internal server error.".to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Convert a service error and count it
fn reject<S: StorageImpl>(app_state: &AppState<S>, err: Error) -> ApiError {
    app_state.metrics.request_errors.inc();
    ApiError::from(err)
}

/// Run a roster operation on the blocking pool.
///
/// Store access does synchronous file I/O under a mutex, so it stays off the
/// async workers. Failures are counted before being returned.
async fn with_roster<S, T, F>(app_state: &Arc<AppState<S>>, op: F) -> Result<T, ApiError>
where
    S: StorageImpl,
    T: Send + 'static,
    F: FnOnce(&RosterService<S>) -> crate::core::Result<T> + Send + 'static,
{
    let state = Arc::clone(app_state);
    task::spawn_blocking(move || op(&state.roster))
        .await
        .map_err(Error::from)
        .and_then(|result| result)
        .map_err(|e| reject(app_state, e))
}

/// Lenient JSON extractor.
///
/// A body that is empty or not declared as JSON yields `T::default()`, so a
/// bare `POST /users` reports the missing name instead of a content-type
/// error. A JSON body that fails to parse is a 400.
pub struct JsonRequest<T>(pub T);

impl<T, S> FromRequest<S> for JsonRequest<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|ct| ct.starts_with("application/json") || ct.contains("+json"))
            .unwrap_or(false);

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            warn!(error = %rejection, "Failed to read request body");
            ApiError::bad_request("Failed to read request body")
        })?;

        if !is_json || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonRequest(T::default()));
        }

        serde_json::from_slice(&body).map(JsonRequest).map_err(|err| {
            warn!(error = %err, "JSON parsing error");
            if err.is_data() {
                ApiError::bad_request(INVALID_JSON_DATA)
            } else {
                ApiError::bad_request("Malformed JSON")
            }
        })
    }
}

/// `GET /pairs` - current pairs, rotating first when a week has passed
pub async fn get_pairs<S: StorageImpl>(
    State(app_state): State<Arc<AppState<S>>>,
) -> Result<Json<PairsResponse>, ApiError> {
    let snapshot = with_roster(&app_state, |roster| roster.current_pairs()).await?;

    if snapshot.rotated {
        app_state.metrics.rotations.inc();
    }

    Ok(Json(PairsResponse {
        pairs: snapshot.pairs,
        last_updated: snapshot.last_updated,
    }))
}

/// `POST /pairs/reset` - regenerate pairs unconditionally
pub async fn reset_pairs<S: StorageImpl>(
    State(app_state): State<Arc<AppState<S>>>,
) -> Result<Json<ResetResponse>, ApiError> {
    let pairs = with_roster(&app_state, |roster| roster.reset_pairs()).await?;
    app_state.metrics.resets.inc();

    Ok(Json(ResetResponse {
        message: PAIRS_RESET.to_string(),
        pairs,
    }))
}

/// `GET /users`
pub async fn list_users<S: StorageImpl>(
    State(app_state): State<Arc<AppState<S>>>,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = with_roster(&app_state, |roster| roster.list_users()).await?;
    Ok(Json(UsersResponse { users }))
}

/// `POST /users` - append a user
pub async fn add_user<S: StorageImpl>(
    State(app_state): State<Arc<AppState<S>>>,
    request: Result<JsonRequest<CreateUserRequest>, ApiError>,
) -> Result<(StatusCode, Json<UserChangeResponse>), ApiError> {
    let name = request
        .and_then(|JsonRequest(body)| body.into_name())
        .inspect_err(|_| app_state.metrics.request_errors.inc())?;
    let users = with_roster(&app_state, move |roster| roster.add_user(name.as_deref())).await?;
    app_state.metrics.users_added.inc();

    Ok((
        StatusCode::CREATED,
        Json(UserChangeResponse {
            message: USER_ADDED.to_string(),
            users,
        }),
    ))
}

/// `DELETE /users/{name}` - remove a user
pub async fn remove_user<S: StorageImpl>(
    State(app_state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Result<Json<UserChangeResponse>, ApiError> {
    let users = with_roster(&app_state, move |roster| roster.remove_user(&name)).await?;
    app_state.metrics.users_removed.inc();

    Ok(Json(UserChangeResponse {
        message: USER_REMOVED.to_string(),
        users,
    }))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Prometheus exposition endpoint
pub async fn metrics<S: StorageImpl>(
    State(app_state): State<Arc<AppState<S>>>,
) -> Result<Response, ApiError> {
    let body = app_state.metrics.render().map_err(ApiError::from)?;
    Ok((
        [(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )],
        body,
    )
        .into_response())
}

/// Root API endpoint
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": crate::NAME,
        "version": crate::VERSION,
        "status": "operational",
        "endpoints": {
            "pairs": "/pairs",
            "reset": "/pairs/reset",
            "users": "/users",
            "health": "/health",
            "metrics": "/metrics"
        }
    }))
}
