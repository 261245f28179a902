use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use core_types::{Tag, TagCorpus};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub schema_version: u32,
    /// Database file name, relative to the data dir.
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// The tag catalog offered for selection. Stands in for the external
    /// tag corpus source.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

fn default_database_file() -> String {
    "circle.db".to_owned()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            database_file: default_database_file(),
            tags: vec![
                Tag::corpus("1", "javascript", 892),
                Tag::corpus("2", "react", 634),
                Tag::corpus("3", "css", 421),
                Tag::corpus("4", "html", 389),
                Tag::corpus("5", "typescript", 356),
                Tag::corpus("6", "node.js", 310),
                Tag::corpus("7", "python", 287),
                Tag::corpus("8", "sql", 245),
                Tag::corpus("9", "api", 198),
                Tag::corpus("10", "flexbox", 154),
                Tag::corpus("11", "database", 132),
                Tag::corpus("12", "authentication", 87),
            ],
        }
    }
}

impl AppConfig {
    pub fn tag_corpus(&self) -> TagCorpus {
        TagCorpus::new(self.tags.clone())
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        self.migrate(&mut config);
        self.save(&config)?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );

        if config.tags.is_empty() {
            config.tags = AppConfig::default().tags;
        }
        config.schema_version = CURRENT_SCHEMA_VERSION;
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn seeds_a_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(!config.tags.is_empty());
        assert_eq!(config.database_file, "circle.db");
    }

    #[test]
    fn reloads_a_saved_config() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let mut config = store.load_or_init().expect("load default");
        config.tags.push(Tag::corpus("99", "webassembly", 12));
        store.save(&config).expect("save");

        let reloaded = store.load_or_init().expect("reload");
        assert!(reloaded.tags.iter().any(|tag| tag.name == "webassembly"));
    }

    #[test]
    fn migration_reseeds_an_empty_corpus() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::create_dir_all(dir.path()).expect("dir");
        fs::write(
            store.path(),
            r#"{"schema_version":0,"database_file":"circle.db","tags":[]}"#,
        )
        .expect("write stale config");

        let config = store.load_or_init().expect("migrate");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(!config.tags.is_empty());
    }

    #[test]
    fn exposes_the_corpus_for_suggestion() {
        let config = AppConfig::default();
        let corpus = config.tag_corpus();
        assert_eq!(corpus.len(), config.tags.len());
        assert!(corpus.iter().any(|tag| tag.name == "flexbox"));
    }
}
