use serde::Deserialize;
use service_core::config::{self as core_config, get_env, get_env_parsed};
use service_core::error::AppError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RETENTION_SECS: u64 = 60;
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub retention: RetentionConfig,
    pub renderer: RendererConfig,
    pub upload: UploadConfig,
    pub currencies_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Generated PDFs, deleted after the retention window.
    pub output_path: String,
    /// Uploaded logos, served under `/uploads`.
    pub upload_path: String,
}

impl StorageConfig {
    /// Scratch directory for converter input and output files.
    pub fn work_path(&self) -> PathBuf {
        PathBuf::from(&self.output_path).join(".work")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    pub window_secs: u64,
}

impl RetentionConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    pub binary: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    pub fn is_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

impl ReceiptConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = common_config.is_production();

        Ok(ReceiptConfig {
            storage: StorageConfig {
                output_path: get_env("STORAGE_OUTPUT_PATH", Some("storage/receipts"), is_prod)?,
                upload_path: get_env("STORAGE_UPLOAD_PATH", Some("storage/uploads"), is_prod)?,
            },
            retention: RetentionConfig {
                window_secs: get_env_parsed(
                    "RETENTION_WINDOW_SECS",
                    &DEFAULT_RETENTION_SECS.to_string(),
                    is_prod,
                )?,
            },
            renderer: RendererConfig {
                binary: get_env("RENDERER_BINARY", Some("wkhtmltopdf"), is_prod)?,
                timeout_secs: get_env_parsed("RENDERER_TIMEOUT_SECS", "30", is_prod)?,
            },
            upload: UploadConfig {
                max_bytes: get_env_parsed(
                    "UPLOAD_MAX_BYTES",
                    &DEFAULT_UPLOAD_MAX_BYTES.to_string(),
                    is_prod,
                )?,
                allowed_extensions: ["png", "jpg", "jpeg", "gif", "svg"]
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            },
            currencies_path: get_env(
                "CURRENCIES_PATH",
                Some("static/currencies.json"),
                is_prod,
            )?,
            common: common_config,
        })
    }
}
