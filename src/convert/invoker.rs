//! External converter invocation
//!
//! Wraps the converter binary (pandoc-compatible command line): checks that
//! it is present and executable, runs it against a per-request job and
//! surfaces its outcome.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use super::job::{ConversionJob, JobState};
use super::types::{ConvertError, ConverterStatus, Result, SOURCE_FORMAT, TARGET_FORMAT};

/// Handle to the external converter
#[derive(Debug, Clone)]
pub struct Converter {
    binary: PathBuf,
    temp_dir: PathBuf,
    timeout: Option<Duration>,
}

impl Converter {
    /// Create a converter for `binary`, staging files under `temp_dir`
    pub fn new(binary: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            temp_dir: temp_dir.into(),
            timeout: None,
        }
    }

    /// Set the subprocess timeout (`None` waits indefinitely)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Report converter availability without changing anything
    pub fn probe(&self) -> ConverterStatus {
        let metadata = std::fs::metadata(&self.binary).ok();
        ConverterStatus {
            path: self.binary.clone(),
            exists: metadata.is_some(),
            executable: metadata.as_ref().is_some_and(is_executable),
        }
    }

    /// Check the converter is runnable, marking it executable if needed
    pub fn ensure_available(&self) -> Result<()> {
        let unavailable = |reason: String| ConvertError::ToolUnavailable {
            path: self.binary.clone(),
            reason,
        };

        let metadata = std::fs::metadata(&self.binary).map_err(|e| unavailable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(unavailable("not a regular file".to_string()));
        }
        if is_executable(&metadata) {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut permissions = metadata.permissions();
            permissions.set_mode(permissions.mode() | 0o755);
            std::fs::set_permissions(&self.binary, permissions)
                .map_err(|e| unavailable(format!("not executable and chmod failed: {}", e)))?;
            tracing::info!(path = %self.binary.display(), "marked converter executable");
        }

        Ok(())
    }

    /// Argument list for one conversion
    pub fn build_args(input: &Path, reference: &Path, output: &Path) -> Vec<OsString> {
        vec![
            input.into(),
            "--from".into(),
            SOURCE_FORMAT.into(),
            "--to".into(),
            TARGET_FORMAT.into(),
            "--reference-doc".into(),
            reference.into(),
            "--output".into(),
            output.into(),
        ]
    }

    /// Convert `markdown` using `reference` as the style document
    ///
    /// On success the returned job holds the produced document at
    /// [`ConversionJob::output_path`]; dropping it removes the temp files.
    /// On failure the temp files are already gone.
    pub async fn convert(&self, markdown: &str, reference: &Path) -> Result<ConversionJob> {
        tokio::fs::create_dir_all(&self.temp_dir).await?;

        let mut job = ConversionJob::new(&self.temp_dir, reference);
        let result = match job.write_input(markdown).await {
            Ok(()) => match self.check_available().await {
                Ok(()) => self.run(&mut job).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                job.mark(JobState::Succeeded);
                Ok(job)
            }
            Err(e) => {
                job.mark(JobState::Failed);
                tracing::warn!(job_id = %job.id(), error = %e, "conversion failed");
                job.cleanup_async().await;
                Err(e)
            }
        }
    }

    /// Convert and return the produced document bytes
    pub async fn convert_to_bytes(&self, markdown: &str, reference: &Path) -> Result<Vec<u8>> {
        let mut job = self.convert(markdown, reference).await?;
        let data = job.read_output().await;
        job.cleanup_async().await;
        Ok(data?)
    }

    /// [`Converter::ensure_available`] on the blocking pool
    pub async fn check_available(&self) -> Result<()> {
        let converter = self.clone();
        tokio::task::spawn_blocking(move || converter.ensure_available())
            .await
            .map_err(|e| ConvertError::IoError(std::io::Error::other(e)))?
    }

    async fn run(&self, job: &mut ConversionJob) -> Result<()> {
        let args = Self::build_args(job.input_path(), job.template_path(), job.output_path());

        let mut command = tokio::process::Command::new(&self.binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        job.mark(JobState::ToolInvoked);
        tracing::debug!(job_id = %job.id(), converter = %self.binary.display(), ?args, "invoking converter");
        let started = Instant::now();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| ConvertError::Timeout(limit))?,
            None => command.output().await,
        }
        .map_err(|e| ConvertError::ToolUnavailable {
            path: self.binary.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("converter exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ConvertError::ConversionFailed(message));
        }

        let produced = tokio::fs::metadata(job.output_path())
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !produced {
            return Err(ConvertError::ConversionFailed(
                "converter produced no output file".to_string(),
            ));
        }

        tracing::info!(
            job_id = %job.id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "conversion succeeded"
        );
        Ok(())
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    metadata.is_file()
}
