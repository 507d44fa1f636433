use axum::{
    body::to_bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use receipt_form::settings::SETTINGS_FILENAME;
use receipt_form::{BusinessProfile, BusinessSettings};
use service_core::error::AppError;

pub const SETTINGS_FIELD: &str = "settings";

/// Settings files are a handful of short strings.
const SETTINGS_MAX_BYTES: usize = 256 * 1024;

pub async fn export_settings(
    Json(settings): Json<BusinessSettings>,
) -> Result<impl IntoResponse, AppError> {
    let body = settings
        .to_json_pretty()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    tracing::info!(business_name = %settings.business_name, "Business settings exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", SETTINGS_FILENAME),
            ),
        ],
        body,
    ))
}

/// Accepts either a multipart upload (field `settings`) or a raw JSON body.
pub async fn import_settings(request: Request) -> Result<Json<BusinessProfile>, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let raw = if is_multipart {
        read_settings_field(request).await?
    } else {
        to_bytes(request.into_body(), SETTINGS_MAX_BYTES)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read body: {}", e)))?
            .to_vec()
    };

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest(anyhow::anyhow!("No settings file provided")));
    }

    let settings = BusinessSettings::from_json(&raw).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed settings file");
        AppError::BadRequest(anyhow::anyhow!("Invalid settings file: {}", e))
    })?;

    tracing::info!(business_name = %settings.business_name, "Business settings imported");
    Ok(Json(settings.into()))
}

async fn read_settings_field(request: Request) -> Result<Vec<u8>, AppError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid multipart body: {}", e)))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some(SETTINGS_FIELD) {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read upload: {}", e)))?;
        if data.len() > SETTINGS_MAX_BYTES {
            return Err(AppError::PayloadTooLarge(anyhow::anyhow!(
                "Settings file too large"
            )));
        }
        return Ok(data.to_vec());
    }

    Err(AppError::BadRequest(anyhow::anyhow!("No settings file provided")))
}
