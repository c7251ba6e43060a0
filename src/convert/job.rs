//! Per-request conversion job
//!
//! A [`ConversionJob`] owns the temporary input and output paths of one
//! conversion. Dropping the job removes both files, so cleanup runs on every
//! exit path of the request that created it.

use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Lifecycle of a single conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    InputWritten,
    ToolInvoked,
    Succeeded,
    Failed,
    Cleaned,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Created => "created",
            JobState::InputWritten => "input_written",
            JobState::ToolInvoked => "tool_invoked",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cleaned => "cleaned",
        };
        f.write_str(s)
    }
}

/// Temporary artifacts of one conversion request
#[derive(Debug)]
pub struct ConversionJob {
    id: Uuid,
    input_path: PathBuf,
    output_path: PathBuf,
    template_path: PathBuf,
    state: JobState,
}

impl ConversionJob {
    /// Allocate unique temp paths under `temp_dir`
    pub fn new(temp_dir: &Path, template_path: &Path) -> Self {
        let id = Uuid::new_v4();
        let job = Self {
            id,
            input_path: temp_dir.join(format!("md2docx-input-{}.md", id)),
            output_path: temp_dir.join(format!("md2docx-output-{}.docx", id)),
            template_path: template_path.to_path_buf(),
            state: JobState::Created,
        };
        tracing::debug!(job_id = %id, "conversion job created");
        job
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Write the Markdown source to the input path
    pub async fn write_input(&mut self, markdown: &str) -> std::io::Result<()> {
        tokio::fs::write(&self.input_path, markdown).await?;
        self.state = JobState::InputWritten;
        Ok(())
    }

    pub(crate) fn mark(&mut self, state: JobState) {
        self.state = state;
    }

    /// Read the produced document
    pub async fn read_output(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.output_path).await
    }

    /// Remove both temp files; failures are logged, never returned
    ///
    /// Blocking variant used by `Drop`, which covers cancelled requests.
    pub fn cleanup(&mut self) {
        if self.state == JobState::Cleaned {
            return;
        }
        for path in [&self.input_path, &self.output_path] {
            self.log_removal(path, std::fs::remove_file(path));
        }
        self.finish_cleanup();
    }

    /// Remove both temp files on the async runtime
    pub async fn cleanup_async(&mut self) {
        if self.state == JobState::Cleaned {
            return;
        }
        for path in [&self.input_path, &self.output_path] {
            self.log_removal(path, tokio::fs::remove_file(path).await);
        }
        self.finish_cleanup();
    }

    fn log_removal(&self, path: &Path, result: std::io::Result<()>) {
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(job_id = %self.id, path = %path.display(), error = %e, "failed to remove temp file");
            }
        }
    }

    fn finish_cleanup(&mut self) {
        tracing::debug!(job_id = %self.id, previous = %self.state, "conversion job cleaned");
        self.state = JobState::Cleaned;
    }
}

impl Drop for ConversionJob {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unique_paths() {
        let dir = TempDir::new().unwrap();
        let a = ConversionJob::new(dir.path(), Path::new("ref.docx"));
        let b = ConversionJob::new(dir.path(), Path::new("ref.docx"));
        assert_ne!(a.id(), b.id());
        assert_ne!(a.input_path(), b.input_path());
        assert_ne!(a.output_path(), b.output_path());
        assert!(a
            .input_path()
            .to_string_lossy()
            .contains(&a.id().to_string()));
        assert!(a
            .output_path()
            .to_string_lossy()
            .contains(&a.id().to_string()));
        assert_eq!(a.state(), JobState::Created);
        assert_eq!(a.template_path(), Path::new("ref.docx"));
    }

    #[tokio::test]
    async fn test_drop_removes_files() {
        let dir = TempDir::new().unwrap();
        let mut job = ConversionJob::new(dir.path(), Path::new("ref.docx"));
        job.write_input("# Hi").await.unwrap();
        assert_eq!(job.state(), JobState::InputWritten);
        std::fs::write(job.output_path(), b"PK").unwrap();

        let input = job.input_path().to_path_buf();
        let output = job.output_path().to_path_buf();
        assert!(input.exists() && output.exists());

        drop(job);
        assert!(!input.exists());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_cleanup_async_removes_files() {
        let dir = TempDir::new().unwrap();
        let mut job = ConversionJob::new(dir.path(), Path::new("ref.docx"));
        job.write_input("# Hi").await.unwrap();
        std::fs::write(job.output_path(), b"PK").unwrap();

        job.cleanup_async().await;
        assert_eq!(job.state(), JobState::Cleaned);
        assert!(!job.input_path().exists());
        assert!(!job.output_path().exists());

        std::fs::write(job.input_path(), b"recreated").unwrap();
        drop(job);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_cleanup_tolerates_missing_files() {
        let dir = TempDir::new().unwrap();
        let mut job = ConversionJob::new(dir.path(), Path::new("ref.docx"));
        job.cleanup();
        assert_eq!(job.state(), JobState::Cleaned);
        job.cleanup();
        assert_eq!(job.state(), JobState::Cleaned);
    }

    #[tokio::test]
    async fn test_read_output() {
        let dir = TempDir::new().unwrap();
        let job = ConversionJob::new(dir.path(), Path::new("ref.docx"));
        std::fs::write(job.output_path(), b"document").unwrap();
        assert_eq!(job.read_output().await.unwrap(), b"document");
    }
}
