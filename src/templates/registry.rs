//! Built-in template registry backed by the JSON manifest

use std::path::{Path, PathBuf};

use super::types::{
    template_id, ManifestEntry, ResolvedTemplate, Result, TemplateDescriptor, TemplateError,
    MANIFEST_FILE,
};

/// Read-only view over the templates directory
///
/// The manifest is re-read on every call so edits on disk are picked up
/// without a restart.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    dir: PathBuf,
}

impl TemplateRegistry {
    /// Create a registry over the given templates directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Templates directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    fn load_manifest(&self) -> Result<Vec<ManifestEntry>> {
        let path = self.manifest_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TemplateError::ManifestNotFound(path));
            }
            Err(e) => return Err(TemplateError::IoError(e)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// List templates in manifest order
    pub fn list(&self) -> Result<Vec<TemplateDescriptor>> {
        Ok(self
            .load_manifest()?
            .into_iter()
            .map(TemplateDescriptor::from)
            .collect())
    }

    /// Resolve a template id to its reference document
    pub fn resolve(&self, id: &str) -> Result<ResolvedTemplate> {
        let entry = self
            .load_manifest()?
            .into_iter()
            .find(|entry| template_id(&entry.filename) == id)
            .ok_or_else(|| TemplateError::UnknownTemplate(id.to_string()))?;

        let path = std::path::absolute(self.dir.join(&entry.filename))?;
        if !path.is_file() {
            return Err(TemplateError::FileMissing(path));
        }

        tracing::debug!(template = id, path = %path.display(), "resolved template");
        Ok(ResolvedTemplate {
            path,
            description: entry.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_with(manifest: &str, files: &[&str]) -> (TempDir, TemplateRegistry) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
        for file in files {
            std::fs::write(dir.path().join(file), b"PK").unwrap();
        }
        let registry = TemplateRegistry::new(dir.path());
        (dir, registry)
    }

    const MANIFEST: &str = r#"[
        {"filename": "report.docx", "description": "Report Template"},
        {"filename": "letter.docx", "description": "Letter"}
    ]"#;

    #[test]
    fn test_list_preserves_manifest_order() {
        let (_dir, registry) = registry_with(MANIFEST, &[]);
        let templates = registry.list().unwrap();
        let ids: Vec<_> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["report", "letter"]);
        assert_eq!(templates[0].description, "Report Template");
    }

    #[test]
    fn test_list_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let registry = TemplateRegistry::new(dir.path());
        assert!(matches!(
            registry.list(),
            Err(TemplateError::ManifestNotFound(_))
        ));
    }

    #[test]
    fn test_list_malformed_manifest() {
        let (_dir, registry) = registry_with("{ not json", &[]);
        assert!(matches!(registry.list(), Err(TemplateError::ManifestParse(_))));
    }

    #[test]
    fn test_resolve_existing_template() {
        let (dir, registry) = registry_with(MANIFEST, &["report.docx"]);
        let resolved = registry.resolve("report").unwrap();
        assert!(resolved.path.is_absolute());
        assert!(resolved.path.ends_with("report.docx"));
        assert!(resolved.path.starts_with(std::path::absolute(dir.path()).unwrap()));
        assert_eq!(resolved.description, "Report Template");
    }

    #[test]
    fn test_resolve_unknown_id() {
        let (_dir, registry) = registry_with(MANIFEST, &["report.docx"]);
        assert!(matches!(
            registry.resolve("invoice"),
            Err(TemplateError::UnknownTemplate(id)) if id == "invoice"
        ));
    }

    #[test]
    fn test_resolve_requires_file_on_disk() {
        let (_dir, registry) = registry_with(MANIFEST, &["report.docx"]);
        assert!(matches!(
            registry.resolve("letter"),
            Err(TemplateError::FileMissing(_))
        ));
    }

    #[test]
    fn test_resolve_does_not_match_full_filename() {
        let (_dir, registry) = registry_with(MANIFEST, &["report.docx"]);
        assert!(registry.resolve("report.docx").is_err());
    }
}
