//! Template resolution
//!
//! Maps template identifiers onto reference documents for the converter:
//!
//! - **Registry** ([`registry`]) - built-in templates listed in `index.json`
//! - **User store** ([`user_store`]) - the single uploaded user template,
//!   selected with the [`CUSTOM_TEMPLATE_ID`] sentinel

pub mod registry;
pub mod user_store;
mod types;

// Re-export public API
pub use registry::TemplateRegistry;
pub use user_store::{sanitize_filename, UserTemplateStore};
pub use types::{
    accepted_extension, template_id, ManifestEntry, ResolvedTemplate, TemplateDescriptor,
    TemplateError, ACCEPTED_EXTENSIONS, CUSTOM_TEMPLATE_DESCRIPTION, CUSTOM_TEMPLATE_ID,
    MANIFEST_FILE,
};

/// Resolve any template id, routing the sentinel to the user store
pub fn resolve(
    registry: &TemplateRegistry,
    user_store: &UserTemplateStore,
    id: &str,
) -> Result<ResolvedTemplate, TemplateError> {
    if id == CUSTOM_TEMPLATE_ID {
        user_store.resolve_custom()
    } else {
        registry.resolve(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_routes_sentinel_to_user_store() {
        let dir = TempDir::new().unwrap();
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(
            templates.join(MANIFEST_FILE),
            r#"[{"filename":"report.docx","description":"Report Template"}]"#,
        )
        .unwrap();
        std::fs::write(templates.join("report.docx"), b"PK").unwrap();

        let registry = TemplateRegistry::new(&templates);
        let store = UserTemplateStore::new(dir.path().join("user"));

        assert!(matches!(
            resolve(&registry, &store, CUSTOM_TEMPLATE_ID),
            Err(TemplateError::NoUserTemplate)
        ));

        store.upload(b"PK", "mine.docx").unwrap();
        let custom = resolve(&registry, &store, CUSTOM_TEMPLATE_ID).unwrap();
        assert_eq!(custom.description, CUSTOM_TEMPLATE_DESCRIPTION);

        let builtin = resolve(&registry, &store, "report").unwrap();
        assert_eq!(builtin.description, "Report Template");
    }
}
