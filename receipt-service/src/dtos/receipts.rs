use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateReceiptResponse {
    pub success: bool,
    pub file_id: String,
    pub receipt_id: String,
    pub download_url: String,
    /// QR code as a PNG data URI, for display next to the download link.
    pub qr_code: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoUploadResponse {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptIdResponse {
    pub receipt_id: String,
}
