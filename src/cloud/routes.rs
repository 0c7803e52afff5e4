//! HTTP route glue
//!
//! Thin axum shims over the typed handlers: extract arguments, resolve the
//! tenant, delegate, convert. No request logic lives here.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::Error;

use super::auth::{authenticate, API_KEY_HEADER};
use super::handlers::{self, AppState, HistoryResponse, StatusResponse, TransformResponse};

/// All API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/transform", post(transform))
        .route("/status/{job_id}", get(status))
        .route("/download/{artifact}", get(download))
        .route("/transforms", get(history))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Resolve the request's tenant from the API key header
fn tenant_of(state: &AppState, headers: &HeaderMap) -> Result<String, Error> {
    let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    authenticate(&state.config.valid_api_keys(), key)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "InkSight Cloud API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn transform(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<TransformResponse>, Error> {
    let tenant = tenant_of(&state, &headers)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut preset = "medium".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::BadRequest(format!("could not read upload: {}", e)))?;
                file = Some((filename, data.to_vec()));
            }
            Some("preset") => {
                preset = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(format!("could not read preset: {}", e)))?;
            }
            _ => {}
        }
    }

    let (filename, content) =
        file.ok_or_else(|| Error::BadRequest("missing 'file' field".into()))?;

    let response = handlers::submit_transform(&state, &tenant, &filename, &content, &preset)?;
    Ok(Json(response))
}

async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, Error> {
    let tenant = tenant_of(&state, &headers)?;
    Ok(Json(handlers::job_status(&state, &tenant, job_id)?))
}

async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(artifact): Path<String>,
) -> Result<Response, Error> {
    let tenant = tenant_of(&state, &headers)?;

    // Artifact names look like "{job_id}.rm"
    let job_id = artifact
        .strip_suffix(".rm")
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| Error::NotFound(format!("artifact {}", artifact)))?;

    let payload = handlers::download(&state, &tenant, job_id)?;
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", payload.filename),
        ),
    ];
    Ok((headers, payload.content).into_response())
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<i64>,
}

async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, Error> {
    let tenant = tenant_of(&state, &headers)?;
    let limit = params.limit.unwrap_or(100);
    Ok(Json(handlers::list_transforms(&state, &tenant, limit)?))
}
