//! HTTP surface: `POST /api/summarize` and `GET /api/health`.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use super::config::ServerConfig;
use crate::input::{InputLimits, extract_pdf_text_blocking};
use crate::types::SummarizeRequest;
use crate::version::BuildInfo;
use crate::{Summarizer, TermsumError};

/// Caller-facing text for a body that could not be decoded at all.
pub const MALFORMED_REQUEST_MESSAGE: &str = "Pedido inválido.";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
    pub limits: InputLimits,
}

impl AppState {
    pub fn new(summarizer: Arc<Summarizer>, limits: InputLimits) -> Self {
        Self { summarizer, limits }
    }
}

/// Form, JSON and multipart text fields of a summarize request.
#[derive(Debug, Default, Deserialize)]
struct SummarizeFields {
    #[serde(default)]
    terms_text: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    custom_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummaryBody {
    summary: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    version: String,
    commit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    built_at: Option<&'static str>,
}

impl IntoResponse for TermsumError {
    fn into_response(self) -> Response {
        let status = match &self {
            TermsumError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/api/summarize", post(summarize))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    if config.cors {
        router.layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn health() -> Json<HealthBody> {
    let build = BuildInfo::current();
    Json(HealthBody {
        status: "ok",
        version: build.to_string(),
        commit: build.short_commit(),
        built_at: build.built_at,
    })
}

async fn summarize(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<SummaryBody>, TermsumError> {
    let request = read_request(&state, request).await?;
    match state.summarizer.summarize_request(&request).await {
        Ok(summary) => Ok(Json(SummaryBody { summary })),
        Err(e) => {
            if let TermsumError::InvalidInput(msg) = &e {
                debug!(reason = %msg, "rejected summarize request");
            }
            Err(e)
        }
    }
}

/// Decode the body according to its content type and acquire the text.
///
/// A `file` part with a non-empty filename takes precedence over
/// `terms_text`.
async fn read_request(state: &AppState, request: Request) -> Result<SummarizeRequest, TermsumError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let (fields, pdf) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(malformed)?;
        read_multipart(multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(fields) = Json::<SummarizeFields>::from_request(request, state)
            .await
            .map_err(malformed)?;
        (fields, None)
    } else {
        let Form(fields) = Form::<SummarizeFields>::from_request(request, state)
            .await
            .map_err(malformed)?;
        (fields, None)
    };

    let text = match pdf {
        Some(bytes) => extract_pdf_text_blocking(bytes, state.limits.max_pdf_pages).await?,
        None => fields.terms_text.unwrap_or_default(),
    };

    Ok(SummarizeRequest {
        text,
        style: fields.style,
        custom_instruction: fields.custom_prompt,
    })
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(SummarizeFields, Option<Vec<u8>>), TermsumError> {
    let mut fields = SummarizeFields::default();
    let mut pdf = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let named = field.file_name().is_some_and(|n| !n.is_empty());
                let bytes = field.bytes().await.map_err(malformed)?;
                if named {
                    pdf = Some(bytes.to_vec());
                }
            }
            "terms_text" => fields.terms_text = Some(field.text().await.map_err(malformed)?),
            "style" => fields.style = Some(field.text().await.map_err(malformed)?),
            "custom_prompt" => fields.custom_prompt = Some(field.text().await.map_err(malformed)?),
            _ => {}
        }
    }

    Ok((fields, pdf))
}

fn malformed(err: impl std::fmt::Display) -> TermsumError {
    warn!(error = %err, "could not decode request body");
    TermsumError::InvalidInput(MALFORMED_REQUEST_MESSAGE.to_string())
}

/// Serve `router` on `listener` until the process is stopped.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router).await.inspect_err(|e| {
        error!(error = %e, "server stopped");
    })
}
