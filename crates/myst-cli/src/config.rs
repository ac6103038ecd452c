use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{APP_DIR, CONFIG_FILE, INDEX_FILE, STORE_FILE};

#[derive(Debug, Serialize, Deserialize)]
pub struct MystConfig {
    pub security: SecuritySection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    /// `hex(key)-hex(salt)` digest of the master passphrase
    pub digested_passphrase: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<String>,
}

impl MystConfig {
    pub fn new(
        digested_passphrase: String,
        store_path: Option<PathBuf>,
        index_path: Option<PathBuf>,
    ) -> Self {
        Self {
            security: SecuritySection {
                digested_passphrase,
            },
            storage: StorageSection {
                store_path: store_path.map(|path| path.to_string_lossy().to_string()),
                index_path: index_path.map(|path| path.to_string_lossy().to_string()),
            },
        }
    }

    /// Secret store location, falling back to the data directory.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        match self.storage.store_path.as_deref() {
            Some(path) => expand_path(path),
            None => default_store_path(),
        }
    }

    /// Search index location, falling back to the data directory.
    pub fn index_path(&self) -> anyhow::Result<PathBuf> {
        match self.storage.index_path.as_deref() {
            Some(path) => expand_path(path),
            None => default_index_path(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join(CONFIG_FILE))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(STORE_FILE))
}

pub fn default_index_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(INDEX_FILE))
}

pub fn read_config(path: &Path) -> anyhow::Result<MystConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &MystConfig) -> anyhow::Result<()> {
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    myst_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))
}

/// Expand a leading `~/` and make relative paths absolute.
pub fn expand_path(value: &str) -> anyhow::Result<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("Path cannot be empty"));
    }
    let path = if trimmed == "~" {
        home_dir()?
    } else if let Some(rest) = trimmed.strip_prefix("~/") {
        home_dir()?.join(rest)
    } else {
        PathBuf::from(trimmed)
    };
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".config").join(APP_DIR))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join(APP_DIR))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip_omits_default_paths() {
        let config = MystConfig::new("aa-bb".to_string(), None, None);
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("digested_passphrase = \"aa-bb\""));
        assert!(!text.contains("store_path"));

        let parsed: MystConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.security.digested_passphrase, "aa-bb");
        assert!(parsed.storage.store_path.is_none());
    }

    #[test]
    fn test_storage_section_is_optional() {
        let parsed: MystConfig =
            toml::from_str("[security]\ndigested_passphrase = \"aa-bb\"\n").unwrap();
        assert!(parsed.storage.index_path.is_none());
    }

    #[test]
    fn test_configured_paths_win() {
        let config = MystConfig::new(
            "aa-bb".to_string(),
            Some(PathBuf::from("/var/myst/store.db")),
            Some(PathBuf::from("/var/myst/index.db")),
        );
        assert_eq!(
            config.store_path().unwrap(),
            PathBuf::from("/var/myst/store.db")
        );
        assert_eq!(
            config.index_path().unwrap(),
            PathBuf::from("/var/myst/index.db")
        );
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(
            expand_path("/abs/file.db").unwrap(),
            PathBuf::from("/abs/file.db")
        );
        assert!(expand_path("relative.db").unwrap().is_absolute());
        assert!(expand_path("  ").is_err());
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(
                expand_path("~/secrets.db").unwrap(),
                PathBuf::from(home).join("secrets.db")
            );
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("myst").join("config.toml");
        let config = MystConfig::new("aa-bb".to_string(), None, None);

        write_config(&path, &config).unwrap();
        let read = read_config(&path).unwrap();
        assert_eq!(read.security.digested_passphrase, "aa-bb");
    }
}
