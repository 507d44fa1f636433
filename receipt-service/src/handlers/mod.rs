pub mod health;
pub mod logos;
pub mod meta;
pub mod receipts;
pub mod settings;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use logos::upload_logo;
pub use meta::{list_currencies, new_receipt_id};
pub use receipts::{download_receipt, generate_receipt};
pub use settings::{export_settings, import_settings};
