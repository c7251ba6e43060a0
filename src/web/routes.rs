//! REST API routes for the web server
//!
//! Provides endpoints for health checks, template listing, user template
//! upload and Markdown conversion.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::AppError;
use crate::config::Settings;
use crate::convert::{Converter, ConverterStatus, DOCX_MIME};
use crate::templates::{self, TemplateDescriptor, TemplateRegistry, UserTemplateStore};

/// Multipart field carrying the uploaded template
pub const UPLOAD_FIELD: &str = "template";

/// Application state shared across handlers
pub struct AppState {
    pub registry: TemplateRegistry,
    pub user_store: UserTemplateStore,
    pub converter: Converter,
    pub version: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        registry: TemplateRegistry,
        user_store: UserTemplateStore,
        converter: Converter,
    ) -> Self {
        Self {
            registry,
            user_store,
            converter,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            TemplateRegistry::new(&settings.templates_dir),
            UserTemplateStore::new(&settings.user_templates_dir),
            Converter::new(&settings.converter_path, &settings.temp_dir)
                .with_timeout(settings.convert_timeout),
        )
    }
}

/// Build the API router
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/templates", get(list_templates))
        .route("/upload-template", post(upload_template))
        .route("/convert", post(convert_markdown))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub started_at: String,
    pub converter: ConverterStatus,
}

/// Health check endpoint; always 200
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "API is online".to_string(),
        version: state.version.clone(),
        started_at: state.started_at.to_rfc3339(),
        converter: state.converter.probe(),
    })
}

/// List built-in templates
async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemplateDescriptor>>, AppError> {
    let templates = tokio::task::spawn_blocking(move || state.registry.list()).await??;
    Ok(Json(templates))
}

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

/// Replace the user template with the uploaded file
async fn upload_template(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or(templates::TemplateError::MissingFile)?;

    let store_state = state.clone();
    let stored = tokio::task::spawn_blocking(move || {
        store_state.user_store.upload(&data, &filename)
    })
    .await??;

    Ok(Json(UploadResponse {
        message: "Template uploaded successfully".to_string(),
        filename: stored,
    }))
}

/// Conversion request body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConvertRequest {
    pub markdown: Option<String>,
    pub template_id: Option<String>,
}

/// Convert Markdown into a Word document styled by the chosen template
async fn convert_markdown(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<DocxDownload, AppError> {
    let Json(request) = payload?;

    let markdown = request.markdown.unwrap_or_default();
    if markdown.is_empty() {
        return Err(AppError::BadRequest("No Markdown content found".to_string()));
    }
    let template_id = request.template_id.unwrap_or_default();
    if template_id.is_empty() {
        return Err(AppError::BadRequest("No template ID provided".to_string()));
    }

    let lookup = state.clone();
    let template = tokio::task::spawn_blocking(move || {
        templates::resolve(&lookup.registry, &lookup.user_store, &template_id)
    })
    .await??;

    let data = state
        .converter
        .convert_to_bytes(&markdown, &template.path)
        .await?;

    Ok(DocxDownload {
        data,
        filename: format!("{}.docx", template.description),
    })
}

/// Word document attachment response
#[derive(Debug)]
pub struct DocxDownload {
    data: Vec<u8>,
    filename: String,
}

impl IntoResponse for DocxDownload {
    fn into_response(self) -> axum::response::Response {
        let disposition = HeaderValue::from_str(&content_disposition(&self.filename))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(DOCX_MIME)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.data,
        )
            .into_response()
    }
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 name
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_app_state_from_settings() {
        let settings = Settings::default();
        let state = AppState::from_settings(&settings);
        assert!(!state.version.is_empty());
        assert_eq!(state.registry.dir(), settings.templates_dir.as_path());
        assert_eq!(state.converter.timeout(), settings.convert_timeout);
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "ok".to_string(),
            message: "API is online".to_string(),
            version: "0.1.0".to_string(),
            started_at: "2024-01-01T00:00:00+00:00".to_string(),
            converter: ConverterStatus {
                path: PathBuf::from("pandoc/pandoc"),
                exists: true,
                executable: false,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"exists\":true"));
        assert!(json.contains("\"executable\":false"));
    }

    #[test]
    fn test_convert_request_defaults() {
        let request: ConvertRequest = serde_json::from_str("{}").unwrap();
        assert!(request.markdown.is_none());
        assert!(request.template_id.is_none());

        let request: ConvertRequest =
            serde_json::from_str(r#"{"markdown": null, "template_id": "report"}"#).unwrap();
        assert!(request.markdown.is_none());
        assert_eq!(request.template_id.as_deref(), Some("report"));
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("Report Template.docx"),
            "attachment; filename=\"Report Template.docx\"; filename*=UTF-8''Report%20Template.docx"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        let value = content_disposition("Geschäftsbrief.docx");
        assert!(value.contains("filename=\"Gesch_ftsbrief.docx\""));
        assert!(value.contains("filename*=UTF-8''Gesch%C3%A4ftsbrief.docx"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn test_content_disposition_quotes() {
        let value = content_disposition("a\"b.docx");
        assert!(value.contains("filename=\"a_b.docx\""));
        assert!(value.contains("a%22b.docx"));
    }

    #[test]
    fn test_docx_download_headers() {
        let response = DocxDownload {
            data: b"PK".to_vec(),
            filename: "Report Template.docx".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static(DOCX_MIME)
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap();
        assert!(disposition.contains("Report Template.docx"));
    }
}
