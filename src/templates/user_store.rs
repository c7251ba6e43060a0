//! Single-slot store for the user-uploaded template
//!
//! The slot holds at most one reference document once an upload completes.
//! A replace stages the new file inside the store directory, renames it into
//! place and only then removes the previous file, so a concurrent reader
//! always finds a template. Readers pick the newest file, which makes the
//! brief two-file window resolve to the new upload.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use super::types::{
    accepted_extension, ResolvedTemplate, Result, TemplateError, CUSTOM_TEMPLATE_DESCRIPTION,
};

/// Store for the uploaded user template
#[derive(Debug)]
pub struct UserTemplateStore {
    dir: PathBuf,
    upload_lock: Mutex<()>,
}

impl UserTemplateStore {
    /// Create a store over the given directory (created lazily on upload)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            upload_lock: Mutex::new(()),
        }
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replace the stored template with `bytes`
    ///
    /// Returns the sanitized filename the template was stored under.
    pub fn upload(&self, bytes: &[u8], original_filename: &str) -> Result<String> {
        if original_filename.trim().is_empty() {
            return Err(TemplateError::MissingFile);
        }
        let ext = accepted_extension(Path::new(original_filename))
            .ok_or_else(|| TemplateError::InvalidExtension(original_filename.to_string()))?;
        let filename = stored_filename(original_filename, &ext);

        let _guard = self
            .upload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        std::fs::create_dir_all(&self.dir)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;

        let target = self.dir.join(&filename);
        staged.persist(&target).map_err(|e| e.error)?;

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path == target {
                continue;
            }
            let removed = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            if let Err(e) = removed {
                tracing::warn!(path = %path.display(), error = %e, "failed to discard previous user template");
            }
        }

        tracing::info!(filename = %filename, size = bytes.len(), "user template replaced");
        Ok(filename)
    }

    /// Resolve the currently stored user template
    pub fn resolve_custom(&self) -> Result<ResolvedTemplate> {
        let path = self
            .newest_template()?
            .ok_or(TemplateError::NoUserTemplate)?;
        Ok(ResolvedTemplate {
            path: std::path::absolute(path)?,
            description: CUSTOM_TEMPLATE_DESCRIPTION.to_string(),
        })
    }

    /// Accepted template files currently in the store
    pub fn stored_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && accepted_extension(&path).is_some() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn newest_template(&self) -> Result<Option<PathBuf>> {
        let newest = self
            .stored_files()?
            .into_iter()
            .map(|path| {
                let modified = std::fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, path)
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
            .map(|(_, path)| path);
        Ok(newest)
    }
}

/// Strip path separators and unsafe characters from an uploaded filename
///
/// Separators become whitespace, whitespace runs collapse into `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing dots and
/// underscores are trimmed. The result may be empty.
pub fn sanitize_filename(original: &str) -> String {
    let spaced: String = original
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .filter(char::is_ascii)
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn stored_filename(original: &str, ext: &str) -> String {
    let sanitized = sanitize_filename(original);
    if accepted_extension(Path::new(&sanitized)).is_some()
        && Path::new(&sanitized).file_stem().is_some_and(|s| !s.is_empty())
    {
        sanitized
    } else {
        format!("template.{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, UserTemplateStore) {
        let dir = TempDir::new().unwrap();
        let store = UserTemplateStore::new(dir.path().join("user-templates"));
        (dir, store)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Template.docx"), "My_Template.docx");
        assert_eq!(sanitize_filename("../../etc/passwd.docx"), "etc_passwd.docx");
        assert_eq!(sanitize_filename("a\\b\\c.doc"), "a_b_c.doc");
        assert_eq!(sanitize_filename("über vorlage.docx"), "ber_vorlage.docx");
        assert_eq!(sanitize_filename("x;rm -rf$.docx"), "xrm_-rf.docx");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn test_stored_filename_fallback() {
        assert_eq!(stored_filename("report.docx", "docx"), "report.docx");
        assert_eq!(stored_filename("日本.docx", "docx"), "template.docx");
        assert_eq!(stored_filename("日本.DOC", "doc"), "template.doc");
    }

    #[test]
    fn test_resolve_custom_without_store_dir() {
        let (_dir, store) = store();
        assert!(matches!(
            store.resolve_custom(),
            Err(TemplateError::NoUserTemplate)
        ));
    }

    #[test]
    fn test_resolve_custom_ignores_other_files() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join("notes.txt"), b"x").unwrap();
        assert!(matches!(
            store.resolve_custom(),
            Err(TemplateError::NoUserTemplate)
        ));
    }

    #[test]
    fn test_upload_then_resolve() {
        let (_dir, store) = store();
        let name = store.upload(b"PK first", "Corporate Style.DOCX").unwrap();
        assert_eq!(name, "Corporate_Style.DOCX");

        let resolved = store.resolve_custom().unwrap();
        assert!(resolved.path.is_absolute());
        assert!(resolved.path.ends_with("Corporate_Style.DOCX"));
        assert_eq!(resolved.description, CUSTOM_TEMPLATE_DESCRIPTION);
        assert_eq!(std::fs::read(&resolved.path).unwrap(), b"PK first");
    }

    #[test]
    fn test_second_upload_replaces_first() {
        let (_dir, store) = store();
        store.upload(b"first", "first.docx").unwrap();
        store.upload(b"second", "second.doc").unwrap();

        let files = store.stored_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("second.doc"));

        let all: Vec<_> = std::fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(all.len(), 1);

        let resolved = store.resolve_custom().unwrap();
        assert_eq!(std::fs::read(resolved.path).unwrap(), b"second");
    }

    #[test]
    fn test_reupload_same_name_overwrites() {
        let (_dir, store) = store();
        store.upload(b"old", "style.docx").unwrap();
        store.upload(b"new", "style.docx").unwrap();
        let files = store.stored_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(std::fs::read(&files[0]).unwrap(), b"new");
    }

    #[test]
    fn test_bad_extension_leaves_store_unchanged() {
        let (_dir, store) = store();
        store.upload(b"keep", "keep.docx").unwrap();

        let err = store.upload(b"text", "notes.txt").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidExtension(_)));

        let files = store.stored_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.docx"));
    }

    #[test]
    fn test_empty_filename_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.upload(b"x", "  "),
            Err(TemplateError::MissingFile)
        ));
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_upload_clears_stray_entries() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir().join("nested")).unwrap();
        std::fs::write(store.dir().join("leftover.txt"), b"x").unwrap();

        store.upload(b"PK", "fresh.docx").unwrap();

        let names: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["fresh.docx"]);
    }
}
