pub mod receipts;

pub use receipts::{GenerateReceiptResponse, LogoUploadResponse, ReceiptIdResponse};
