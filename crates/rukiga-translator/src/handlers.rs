use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rukiga_types::{Direction, Language};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::translator::{Translation, Translator, UNAVAILABLE_MESSAGE};

const UNSUPPORTED_PAIR: &str =
    "Only English <-> Runyankore/Rukiga translations are currently supported.";

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<Translator>,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct TranslateQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    direction: &'static str,
    query: String,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<EntryView>>,
}

#[derive(Serialize)]
struct EntryView {
    headword: String,
    definition: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/status", get(status))
        .route("/v1/translate", get(translate))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.translator.status())
}

async fn translate(
    State(state): State<AppState>,
    Query(params): Query<TranslateQuery>,
) -> Result<Response, ApiError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::bad_request("q is required"));
    }
    let from = parse_language("from", params.from.as_deref())?;
    let to = parse_language("to", params.to.as_deref())?;
    let direction =
        Direction::between(from, to).ok_or_else(|| ApiError::bad_request(UNSUPPORTED_PAIR))?;

    // The first query may block on the one-time dictionary load.
    let translator = Arc::clone(&state.translator);
    let lookup_query = query.clone();
    let translation =
        tokio::task::spawn_blocking(move || translator.translate(direction, &lookup_query))
            .await
            .map_err(|err| {
                error!("lookup task failed: {err}");
                ApiError::Internal
            })?
            .map_err(|err| {
                error!("dictionary unavailable: {err}");
                ApiError::Unavailable
            })?;

    let found = translation.is_found();
    let (text, entries) = match translation {
        Translation::ToEnglish(lookup) => (Some(lookup.to_string()), None),
        Translation::ToRukiga(entries) => (
            None,
            Some(
                entries
                    .into_iter()
                    .map(|e| EntryView {
                        headword: e.display_headword().to_string(),
                        definition: e.definition().to_string(),
                    })
                    .collect(),
            ),
        ),
    };

    let response = TranslateResponse {
        direction: direction.as_str(),
        query,
        found,
        text,
        entries,
    };

    if state.disable_cache {
        Ok(Json(response).into_response())
    } else {
        Ok((
            [(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=300"),
            )],
            Json(response),
        )
            .into_response())
    }
}

fn parse_language(param: &str, raw: Option<&str>) -> Result<Language, ApiError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ApiError::bad_request(format!("{param} is required")));
    }
    Language::from_name(raw)
        .ok_or_else(|| ApiError::bad_request(format!("unknown language for {param}: {raw}")))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("dictionary not available")]
    Unavailable,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Unavailable => {
                let body = Json(json!({ "error": UNAVAILABLE_MESSAGE }));
                (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
