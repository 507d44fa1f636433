//! HTML to PDF conversion through an external command-line tool.

use async_trait::async_trait;
use service_core::error::AppError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert a complete HTML document into PDF bytes.
    async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>, AppError>;
}

#[derive(Clone)]
pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `program` to completion. A missing binary, a timeout and a
    /// non-zero exit all surface as [`AppError::RenderError`].
    pub async fn execute(&self, program: &str, args: &[&str]) -> Result<Output, AppError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %program,
            args = ?args,
            timeout_secs = %self.timeout.as_secs(),
            "Executing command"
        );

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                AppError::RenderError(anyhow::anyhow!(
                    "{} timed out after {} seconds",
                    program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    AppError::RenderError(anyhow::anyhow!(
                        "PDF converter '{}' is not installed or not on PATH",
                        program
                    ))
                } else {
                    AppError::RenderError(anyhow::anyhow!("Failed to start {}: {}", program, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                program = %program,
                args = ?args,
                status = ?output.status.code(),
                stderr = %stderr,
                "Command failed"
            );
            return Err(AppError::RenderError(anyhow::anyhow!(
                "{} exited with status {:?}",
                program,
                output.status.code()
            )));
        }

        tracing::debug!(
            program = %program,
            output_size = output.stdout.len(),
            "Command succeeded"
        );

        Ok(output)
    }
}

pub struct WkhtmltopdfConverter {
    binary: String,
    executor: CommandExecutor,
    work_dir: PathBuf,
}

impl WkhtmltopdfConverter {
    pub async fn new(
        binary: impl Into<String>,
        timeout: Duration,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let work_dir = work_dir.into();
        fs::create_dir_all(&work_dir).await?;
        Ok(Self {
            binary: binary.into(),
            executor: CommandExecutor::new(timeout),
            work_dir,
        })
    }

    fn args<'a>(input: &'a str, output: &'a str) -> Vec<&'a str> {
        vec![
            "--quiet",
            "--page-size",
            "A4",
            "--margin-top",
            "0.75in",
            "--margin-right",
            "0.75in",
            "--margin-bottom",
            "0.75in",
            "--margin-left",
            "0.75in",
            "--encoding",
            "UTF-8",
            "--no-outline",
            input,
            output,
        ]
    }

    async fn convert(&self, input: &Path, output: &Path, html: &str) -> Result<Vec<u8>, AppError> {
        fs::write(input, html).await?;

        let input_arg = path_arg(input)?;
        let output_arg = path_arg(output)?;
        self.executor
            .execute(&self.binary, &Self::args(input_arg, output_arg))
            .await?;

        let pdf = fs::read(output).await.map_err(|e| {
            AppError::RenderError(anyhow::anyhow!("Converter produced no output: {}", e))
        })?;
        if !pdf.starts_with(b"%PDF") {
            return Err(AppError::RenderError(anyhow::anyhow!(
                "Converter output is not a PDF document"
            )));
        }
        Ok(pdf)
    }
}

fn path_arg(path: &Path) -> Result<&str, AppError> {
    path.to_str().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("Non UTF-8 path: {}", path.display()))
    })
}

#[async_trait]
impl DocumentConverter for WkhtmltopdfConverter {
    async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let job = Uuid::new_v4().simple().to_string();
        let input = self.work_dir.join(format!("{}.html", job));
        let output = self.work_dir.join(format!("{}.pdf", job));

        let result = self.convert(&input, &output, html).await;

        let _ = fs::remove_file(&input).await;
        let _ = fs::remove_file(&output).await;

        result
    }
}
