use crate::dtos::LogoUploadResponse;
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use metrics::counter;
use service_core::error::AppError;
use uuid::Uuid;

pub const LOGO_FIELD: &str = "logo";

pub async fn upload_logo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_bytes = state.config.upload.max_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, max_bytes))?
    {
        if field.name() != Some(LOGO_FIELD) {
            continue;
        }
        let response = store_logo(&state, field).await?;
        return Ok((StatusCode::CREATED, Json(response)));
    }

    Err(AppError::BadRequest(anyhow::anyhow!("No file selected")))
}

async fn store_logo(state: &AppState, field: Field<'_>) -> Result<LogoUploadResponse, AppError> {
    let max_bytes = state.config.upload.max_bytes;

    let original_name = field.file_name().unwrap_or_default().to_string();
    if original_name.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("No file selected")));
    }

    // Reject by name before any bytes are read.
    let (stem, extension) = split_extension(&original_name)
        .filter(|(_, ext)| state.config.upload.is_allowed(ext))
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid file type")))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| read_error(e, max_bytes))?
        .to_vec();

    if data.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("Uploaded file is empty")));
    }
    if data.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    let filename = stored_name(&stem, &extension);
    state.uploads.upload(&filename, data).await.map_err(|e| {
        tracing::error!("Failed to store logo {}: {}", filename, e);
        e
    })?;

    counter!("logo_uploads_total").increment(1);
    tracing::info!(
        filename = %filename,
        original_name = %original_name,
        "Logo uploaded"
    );

    Ok(LogoUploadResponse {
        url: format!("/uploads/{}", filename),
        filename,
    })
}

fn read_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes)
    } else {
        AppError::BadRequest(anyhow::anyhow!("Failed to read upload: {}", e.body_text()))
    }
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(anyhow::anyhow!(
        "File too large (max {} MB)",
        max_bytes.div_ceil(1024 * 1024)
    ))
}

/// Split `name.ext` into a sanitized stem and the lowercase extension.
fn split_extension(original: &str) -> Option<(String, String)> {
    // Browsers on Windows may send a full path.
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let (stem, ext) = base.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some((sanitize_stem(stem), ext.to_ascii_lowercase()))
}

/// Keep ASCII letters, digits, `-` and `_`; whitespace becomes `_`.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "logo".to_string()
    } else {
        trimmed.chars().take(64).collect()
    }
}

fn stored_name(stem: &str, extension: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}.{}",
        stem,
        Utc::now().timestamp(),
        &suffix[..8],
        extension
    )
}
