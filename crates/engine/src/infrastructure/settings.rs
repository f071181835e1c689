//! Environment-driven engine settings.

use std::path::{Path, PathBuf};

use crate::infrastructure::importers::RuleFileImporter;

pub const RULES_PATH_VAR: &str = "SAGAFORGE_RULES_PATH";
pub const CONFIG_PATH_VAR: &str = "SAGAFORGE_CONFIG_PATH";
pub const LOG_VAR: &str = "SAGAFORGE_LOG";

const DEFAULT_LOG_FILTER: &str = "sagaforge_engine=info";

/// Where rule content comes from and how loudly to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Extra catalog merged over the core rules
    pub rules_path: Option<PathBuf>,
    /// Progression config replacing the defaults
    pub config_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rules_path: None,
            config_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineSettings {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            rules_path: value(RULES_PATH_VAR).map(PathBuf::from),
            config_path: value(CONFIG_PATH_VAR).map(PathBuf::from),
            log_filter: value(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn importer(&self) -> RuleFileImporter {
        RuleFileImporter::new(self.rules_path.clone(), self.config_path.clone())
    }
}

/// Load `.env.local` then `.env` from `dir`, earlier files winning.
///
/// Missing files are fine; variables already set in the process win over both.
/// Runs before logging is configured (the files may set the filter), so
/// unreadable files are returned for the caller to report.
pub fn load_dotenv_from(dir: &Path) -> Vec<(PathBuf, dotenvy::Error)> {
    let mut failures = Vec::new();
    for filename in [".env.local", ".env"] {
        let path = dir.join(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                failures.push((path, e));
            }
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = EngineSettings::from_lookup(lookup(&[]));
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.log_filter, "sagaforge_engine=info");
    }

    #[test]
    fn reads_paths_and_filter() {
        let settings = EngineSettings::from_lookup(lookup(&[
            (RULES_PATH_VAR, "/srv/rules/extra.json"),
            (CONFIG_PATH_VAR, " /srv/rules/config.json "),
            (LOG_VAR, "sagaforge_engine=debug"),
        ]));
        assert_eq!(settings.rules_path, Some(PathBuf::from("/srv/rules/extra.json")));
        assert_eq!(settings.config_path, Some(PathBuf::from("/srv/rules/config.json")));
        assert_eq!(settings.log_filter, "sagaforge_engine=debug");
    }

    #[test]
    fn blank_values_are_unset() {
        let settings = EngineSettings::from_lookup(lookup(&[(RULES_PATH_VAR, "   ")]));
        assert!(settings.rules_path.is_none());
    }

    #[test]
    fn dotenv_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "SAGAFORGE_TEST_DOTENV_ONLY=from-dotenv\n",
        )
        .unwrap();
        assert!(load_dotenv_from(dir.path()).is_empty());
        assert_eq!(
            std::env::var("SAGAFORGE_TEST_DOTENV_ONLY").ok().as_deref(),
            Some("from-dotenv")
        );
    }

    #[test]
    fn unreadable_dotenv_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env.local"),
            "SAGAFORGE_TEST_DOTENV_BROKEN=\"unterminated\n",
        )
        .unwrap();
        let failures = load_dotenv_from(dir.path());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, dir.path().join(".env.local"));
    }
}
