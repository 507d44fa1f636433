#![allow(dead_code)]

use async_trait::async_trait;
use receipt_service::config::ReceiptConfig;
use receipt_service::services::{init_metrics, DocumentConverter};
use receipt_service::startup::Application;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const STUB_PDF: &[u8] = b"%PDF-1.4 stub receipt";

/// Stands in for wkhtmltopdf so tests do not need the binary installed.
pub struct StubConverter;

#[async_trait]
impl DocumentConverter for StubConverter {
    async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>, AppError> {
        assert!(html.contains("<html"), "converter received non-HTML input");
        Ok(STUB_PDF.to_vec())
    }
}

/// Stub converter that keeps every HTML document it was handed.
#[derive(Clone, Default)]
pub struct CapturingConverter {
    rendered: Arc<Mutex<Vec<String>>>,
}

impl CapturingConverter {
    pub fn last_html(&self) -> Option<String> {
        self.rendered.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DocumentConverter for CapturingConverter {
    async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>, AppError> {
        self.rendered.lock().unwrap().push(html.to_string());
        Ok(STUB_PDF.to_vec())
    }
}

pub struct FailingConverter;

#[async_trait]
impl DocumentConverter for FailingConverter {
    async fn html_to_pdf(&self, _html: &str) -> Result<Vec<u8>, AppError> {
        Err(AppError::RenderError(anyhow::anyhow!(
            "PDF converter 'wkhtmltopdf' is not installed or not on PATH"
        )))
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub output_path: String,
    pub upload_path: String,
    storage_root: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(StubConverter), |_| {}).await
    }

    pub async fn spawn_with(
        converter: Arc<dyn DocumentConverter>,
        customize: impl FnOnce(&mut ReceiptConfig),
    ) -> Self {
        init_metrics();

        let storage_root = format!("target/test-storage-{}", Uuid::new_v4());
        let mut config = ReceiptConfig::load().expect("Failed to load configuration");
        config.common.host = "127.0.0.1".to_string();
        config.common.port = 0; // Random port for testing
        config.storage.output_path = format!("{}/receipts", storage_root);
        config.storage.upload_path = format!("{}/uploads", storage_root);
        config.retention.window_secs = 1;
        customize(&mut config);

        let output_path = config.storage.output_path.clone();
        let upload_path = config.storage.upload_path.clone();

        let app = Application::build_with_converter(config, converter)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            client: reqwest::Client::new(),
            output_path,
            upload_path,
            storage_root,
        }
    }

    pub async fn metrics_text(&self) -> String {
        self.client
            .get(self.url("/metrics"))
            .send()
            .await
            .expect("Failed to execute request")
            .text()
            .await
            .expect("Failed to read metrics")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_receipt(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/receipts"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn upload_logo(&self, filename: &str, data: Vec<u8>) -> reqwest::Response {
        let form = reqwest::multipart::Form::new().part(
            "logo",
            reqwest::multipart::Part::bytes(data).file_name(filename.to_string()),
        );
        self.client
            .post(self.url("/logos"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Number of regular files in `dir`, ignoring the converter work directory.
    pub async fn file_count(dir: &str) -> usize {
        let mut count = 0;
        if let Ok(mut entries) = tokio::fs::read_dir(dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                    count += 1;
                }
            }
        }
        count
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.storage_root).await;
    }
}

pub fn receipt_payload(receipt_id: &str) -> Value {
    json!({
        "receipt_id": receipt_id,
        "issue_date": "2024-03-09",
        "currency": { "code": "EUR", "symbol": "€" },
        "tax_rate": "10",
        "discount": "5",
        "payment_status": "paid",
        "notes": "Thank you for your business",
        "business": {
            "name": "Acme Ltd",
            "address": "1 Main St",
            "email": "billing@acme.test",
            "phone": "+1 555 0100"
        },
        "client": { "name": "Jane Doe", "email": "jane@example.test" },
        "items": [
            { "name": "Design", "quantity": "2", "unit_price": "10" }
        ],
        "subtotal": "20",
        "tax_amount": "2",
        "grand_total": "17"
    })
}
