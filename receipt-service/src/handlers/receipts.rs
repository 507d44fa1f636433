use crate::dtos::GenerateReceiptResponse;
use crate::services::qr::receipt_qr_data_uri;
use crate::services::renderer::render_receipt_html;
use crate::services::storage::is_safe_key;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use metrics::counter;
use receipt_form::ReceiptRecord;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use uuid::Uuid;
use validator::Validate;

pub async fn generate_receipt(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<ReceiptRecord>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut record) = payload
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid receipt data: {}", e.body_text())))?;

    record.validate()?;

    if let Some(signature) = record.signature.as_deref() {
        if !signature.starts_with("data:image/") {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Signature must be an image data URI"
            )));
        }
    }

    let carried_total = record.grand_total;
    let mismatch = record.reconcile_totals().map_err(|e| {
        tracing::warn!(receipt_id = %record.receipt_id, error = %e, "Rejected receipt totals");
        AppError::BadRequest(anyhow::anyhow!("Receipt amounts are too large to total"))
    })?;
    if mismatch {
        tracing::warn!(
            receipt_id = %record.receipt_id,
            submitted_total = %carried_total,
            computed_total = %record.grand_total,
            "Submitted totals did not match line items, using recomputed values"
        );
    }

    let file_id = receipt_file_id(&record.receipt_id);
    let qr_code = receipt_qr_data_uri(&record)
        .map_err(|e| generation_failed(&record.receipt_id, "qr", e))?;
    let logo = match record.business.logo_filename.as_deref() {
        Some(filename) => load_logo(&state, filename).await,
        None => None,
    };

    let html = render_receipt_html(&record, &qr_code, logo.as_deref())
        .map_err(|e| generation_failed(&record.receipt_id, "template", e))?;

    let pdf = state
        .converter
        .html_to_pdf(&html)
        .await
        .map_err(|e| generation_failed(&record.receipt_id, "convert", e))?;

    let key = format!("{}.pdf", file_id);
    state
        .receipts
        .upload(&key, pdf)
        .await
        .map_err(|e| generation_failed(&record.receipt_id, "store", e))?;

    let expires_at = state.retention.schedule(key);
    counter!("receipts_generated_total").increment(1);

    tracing::info!(
        receipt_id = %record.receipt_id,
        file_id = %file_id,
        request_id = %request_id,
        items = record.items.len(),
        "Receipt generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateReceiptResponse {
            success: true,
            download_url: format!("/receipts/{}", file_id),
            file_id,
            receipt_id: record.receipt_id,
            qr_code,
            expires_at: expires_at.to_rfc3339(),
        }),
    ))
}

pub async fn download_receipt(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_file_id(&file_id) {
        return Err(AppError::BadRequest(anyhow::anyhow!("Invalid receipt file id")));
    }

    let key = format!("{}.pdf", file_id);
    let data = state.receipts.download(&key).await.map_err(|e| match e {
        AppError::NotFound(_) => {
            AppError::NotFound(anyhow::anyhow!("Receipt file expired or missing"))
        }
        other => other,
    })?;

    tracing::info!(file_id = %file_id, size = data.len(), "Receipt downloaded");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", key),
            ),
        ],
        data,
    ))
}

fn generation_failed(receipt_id: &str, stage: &'static str, e: AppError) -> AppError {
    counter!("receipt_generation_failures_total", "stage" => stage).increment(1);
    tracing::error!(
        receipt_id = %receipt_id,
        stage = stage,
        error = %e,
        "Receipt generation failed"
    );
    e
}

/// `receipt_{id}_{8 hex}`; the suffix keeps repeated generations apart.
fn receipt_file_id(receipt_id: &str) -> String {
    let safe: String = receipt_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("receipt_{}_{}", safe, &suffix[..8])
}

fn is_valid_file_id(file_id: &str) -> bool {
    !file_id.is_empty()
        && file_id.len() <= 128
        && file_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn image_mime(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Inline a previously uploaded logo. A missing logo leaves the receipt without one.
async fn load_logo(state: &AppState, filename: &str) -> Option<String> {
    let mime = image_mime(filename).filter(|_| is_safe_key(filename))?;
    match state.uploads.download(filename).await {
        Ok(bytes) => Some(format!(
            "data:{};base64,{}",
            mime,
            general_purpose::STANDARD.encode(bytes)
        )),
        Err(e) => {
            tracing::warn!(logo = %filename, error = %e, "Logo not available, rendering without it");
            None
        }
    }
}
