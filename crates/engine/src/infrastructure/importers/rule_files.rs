//! JSON rule-content importer.
//!
//! Reads a catalog document (classes, feats, talents, Force powers, skills)
//! and an optional progression configuration from disk, then assembles the
//! `RuleContext` every use case receives. File content is merged over the
//! built-in core catalog: entries with a core id replace the core entry,
//! new ids extend it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sagaforge_domain::{
    core_catalog, CatalogDocument, ConfigurationError, ProgressionConfig, RuleCatalog,
    RuleContext, SpecialRuleRegistry,
};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Rule file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Importer for rule files on disk.
#[derive(Debug, Clone, Default)]
pub struct RuleFileImporter {
    catalog_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl RuleFileImporter {
    pub fn new(catalog_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            catalog_path,
            config_path,
        }
    }

    /// Core content merged with the catalog file, if one is configured.
    pub async fn import_catalog(&self) -> Result<RuleCatalog, ImportError> {
        let core = core_catalog()?;
        let Some(path) = &self.catalog_path else {
            return Ok(core);
        };
        let document: CatalogDocument = read_json(path).await?;
        let (classes, feats) = (document.classes.len(), document.feats.len());
        let merged = core.extended_with(document)?;

        tracing::info!(
            path = %path.display(),
            classes,
            feats,
            "Merged rule catalog file over core content"
        );
        Ok(merged)
    }

    /// Configuration file, or the defaults when none is configured.
    pub async fn import_config(&self) -> Result<ProgressionConfig, ImportError> {
        match &self.config_path {
            Some(path) => {
                let config: ProgressionConfig = read_json(path).await?;
                config.validate()?;
                Ok(config)
            }
            None => Ok(ProgressionConfig::default()),
        }
    }

    /// Build the context with the core special-rule predicates registered.
    ///
    /// Fails loudly on any dangling reference: a class naming a feat the
    /// catalog lacks, or content naming an unregistered special rule.
    pub async fn import_context(&self) -> Result<RuleContext, ImportError> {
        let catalog = self.import_catalog().await?;
        let config = self.import_config().await?;
        let context = RuleContext::new(
            Arc::new(catalog),
            Arc::new(SpecialRuleRegistry::new()?),
            config,
        )?;
        Ok(context)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).await.map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ImportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagaforge_domain::{ClassId, FeatId, RuleDataSource};
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn without_files_uses_core_content_and_defaults() {
        let importer = RuleFileImporter::default();
        let ctx = importer.import_context().await.unwrap();
        assert!(ctx
            .data()
            .class(&ClassId::new("jedi_knight").unwrap())
            .is_some());
        assert_eq!(ctx.config(), &ProgressionConfig::default());
    }

    #[tokio::test]
    async fn catalog_file_extends_core_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "extra.json",
            r#"{
                "feats": [
                    {
                        "id": "improved_toughness",
                        "name": "Improved Toughness",
                        "prerequisites": [{"type": "has_feat", "feat_id": "toughness"}]
                    }
                ]
            }"#,
        );
        let importer = RuleFileImporter::new(Some(path), None);
        let catalog = importer.import_catalog().await.unwrap();

        assert!(catalog
            .feat(&FeatId::new("improved_toughness").unwrap())
            .is_some());
        assert!(catalog.feat(&FeatId::new("toughness").unwrap()).is_some());
    }

    #[tokio::test]
    async fn config_file_overrides_selected_switches() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.json",
            r#"{"prestigeGrantsStartingFeats": true, "maxCharacterLevel": 10}"#,
        );
        let importer = RuleFileImporter::new(None, Some(path));
        let config = importer.import_config().await.unwrap();

        assert!(config.prestige_grants_starting_feats);
        assert_eq!(config.max_character_level, 10);
        assert_eq!(
            config.starting_feat_slots,
            ProgressionConfig::default().starting_feat_slots
        );
    }

    #[tokio::test]
    async fn dangling_feat_reference_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "broken.json",
            r#"{
                "feats": [
                    {
                        "id": "mighty_swing",
                        "name": "Mighty Swing",
                        "prerequisites": [{"type": "has_feat", "feat_id": "does_not_exist"}]
                    }
                ]
            }"#,
        );
        let err = RuleFileImporter::new(Some(path), None)
            .import_context()
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn missing_and_malformed_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = RuleFileImporter::new(Some(missing), None)
            .import_catalog()
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));

        let garbage = write_file(&dir, "garbage.json", "{ not json");
        let err = RuleFileImporter::new(None, Some(garbage))
            .import_config()
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Json { .. }));
    }
}
