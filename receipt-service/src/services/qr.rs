use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, Luma};
use qrcode::QrCode;
use receipt_form::totals::format_amount;
use receipt_form::ReceiptRecord;
use serde::Serialize;
use service_core::error::AppError;
use std::io::Cursor;

/// Receipt summary encoded into the QR code.
#[derive(Debug, Serialize)]
pub struct QrPayload<'a> {
    pub receipt_id: &'a str,
    pub business_name: &'a str,
    pub client_name: &'a str,
    pub total: String,
    pub date: String,
    pub status: &'static str,
}

impl<'a> From<&'a ReceiptRecord> for QrPayload<'a> {
    fn from(record: &'a ReceiptRecord) -> Self {
        Self {
            receipt_id: &record.receipt_id,
            business_name: &record.business.name,
            client_name: &record.client.name,
            total: format_amount(record.grand_total),
            date: record.issue_date.to_string(),
            status: record.payment_status.as_str(),
        }
    }
}

/// Encode `data` as a QR code PNG, base64-encoded.
pub fn generate_qr_base64(data: &str) -> Result<String, AppError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| {
        AppError::RenderError(anyhow::anyhow!("Failed to encode QR code: {}", e))
    })?;
    let image = code.render::<Luma<u8>>().quiet_zone(true).min_dimensions(200, 200).build();

    let dynamic_image = DynamicImage::ImageLuma8(image);
    let mut buffer = Cursor::new(Vec::new());
    dynamic_image
        .write_to(&mut buffer, image::ImageOutputFormat::Png)
        .map_err(|e| AppError::RenderError(anyhow::anyhow!("Failed to write QR image: {}", e)))?;

    Ok(general_purpose::STANDARD.encode(buffer.get_ref()))
}

/// QR code for a receipt as a `data:image/png;base64,...` URI.
pub fn receipt_qr_data_uri(record: &ReceiptRecord) -> Result<String, AppError> {
    let payload = serde_json::to_string(&QrPayload::from(record))
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
    Ok(format!("data:image/png;base64,{}", generate_qr_base64(&payload)?))
}
