//! HTTP API server for a presentation shell.
//!
//! Exposes the stage entry operations as JSON endpoints. Stage calls are
//! serialized so only one runs at a time.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::VaaniError;
use crate::language::Language;
use crate::pipeline::Pipeline;
use crate::translation::TranslatedDocument;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
    /// Held for the duration of every stage call.
    stage_lock: Mutex<()>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        pipeline: Pipeline::new(settings)?,
        stage_lock: Mutex::new(()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/languages", get(languages))
        .route("/transcribe", post(transcribe))
        .route("/translate", post(translate))
        .route("/ask", post(ask))
        .route("/synthesize", post(synthesize))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Vaani API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Languages", "GET  /languages");
    Output::kv("Transcribe", "POST /transcribe");
    Output::kv("Translate", "POST /translate");
    Output::kv("Ask", "POST /ask");
    Output::kv("Synthesize", "POST /synthesize");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscribeRequest {
    /// Video URL or local file path
    input: String,
}

#[derive(Serialize)]
struct TranscribeResponse {
    path: PathBuf,
    media_id: String,
    title: String,
    recognizer: String,
    duration_seconds: f64,
    segments: usize,
}

#[derive(Deserialize)]
struct TranslateRequest {
    language: String,
    /// Transcript file; the newest one when omitted
    #[serde(default)]
    transcript: Option<PathBuf>,
}

#[derive(Serialize)]
struct TranslateResponse {
    path: PathBuf,
    document: TranslatedDocument,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    translation: Option<PathBuf>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Deserialize)]
struct SynthesizeRequest {
    #[serde(default)]
    translation: Option<PathBuf>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Serialize)]
struct LanguageInfo {
    name: &'static str,
    code: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a library error onto an HTTP status.
fn status_for(error: &VaaniError) -> StatusCode {
    match error {
        VaaniError::InvalidInput(_) | VaaniError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
        VaaniError::Download(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VaaniError::Recognition(_)
        | VaaniError::Translation { .. }
        | VaaniError::Chat(_)
        | VaaniError::Synthesis(_)
        | VaaniError::OpenAI(_)
        | VaaniError::Service(_)
        | VaaniError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: VaaniError) -> Response {
    (
        status_for(&error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn parse_optional_language(value: Option<&str>) -> Result<Option<Language>, VaaniError> {
    value.map(str::parse::<Language>).transpose()
}

fn language_list() -> Vec<LanguageInfo> {
    Language::all()
        .iter()
        .map(|l| LanguageInfo {
            name: l.name(),
            code: l.code(),
            label: l.label(),
        })
        .collect()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn languages() -> impl IntoResponse {
    Json(language_list())
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscribeRequest>,
) -> Response {
    let _guard = state.stage_lock.lock().await;
    match state.pipeline.transcribe(&req.input).await {
        Ok(saved) => Json(TranscribeResponse {
            path: saved.path,
            media_id: saved.document.media_id,
            title: saved.document.title,
            recognizer: saved.document.recognizer,
            duration_seconds: saved.document.duration_seconds,
            segments: saved.document.segments.len(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> Response {
    let language = match req.language.parse::<Language>() {
        Ok(l) => l,
        Err(e) => return error_response(e),
    };

    let _guard = state.stage_lock.lock().await;
    match state
        .pipeline
        .translate(req.transcript.as_deref(), language)
        .await
    {
        Ok(saved) => Json(TranslateResponse {
            path: saved.path,
            document: saved.document,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let language = match parse_optional_language(req.language.as_deref()) {
        Ok(l) => l,
        Err(e) => return error_response(e),
    };

    let _guard = state.stage_lock.lock().await;
    match state
        .pipeline
        .ask(req.translation.as_deref(), language, &req.question)
        .await
    {
        Ok(answer) => Json(AskResponse { answer }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Response {
    let language = match parse_optional_language(req.language.as_deref()) {
        Ok(l) => l,
        Err(e) => return error_response(e),
    };

    let _guard = state.stage_lock.lock().await;
    let translation: Option<&Path> = req.translation.as_deref();
    match state.pipeline.synthesize(translation, language).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&VaaniError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&VaaniError::UnsupportedLanguage("xx".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&VaaniError::Translation {
                batch: 2,
                message: "quota".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&VaaniError::ToolNotFound("ffmpeg".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_optional_language() {
        assert_eq!(parse_optional_language(None).unwrap(), None);
        assert_eq!(
            parse_optional_language(Some("te")).unwrap(),
            Some(Language::Telugu)
        );
        assert!(parse_optional_language(Some("french")).is_err());
    }

    #[test]
    fn test_language_list_covers_all() {
        let list = language_list();
        assert_eq!(list.len(), Language::all().len());
        assert!(list.iter().any(|l| l.code == "hi" && l.label == "Hindi"));
    }
}
