use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inkdash_common::error::InkError;
use tracing::info;

use crate::config::AppConfig;

/// Dotfolder name under `$HOME`.
const DOTFOLDER: &str = ".inkdash";

const CONFIG_FILE: &str = "config.toml";

/// Resolve the root path: `$HOME/.inkdash/`.
pub fn root_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DOTFOLDER))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(root_dir()?.join(CONFIG_FILE))
}

/// Ensure `$HOME/.inkdash/config.toml` exists, seeding defaults if absent.
/// Idempotent, safe to call on every launch.
pub fn init_workspace() -> Result<()> {
    init_workspace_at(&root_dir()?)
}

pub fn init_workspace_at(root: &Path) -> Result<()> {
    if !root.exists() {
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;
        info!("created directory: {}", root.display());
    }

    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        save_config_to(&path, &AppConfig::default())?;
        info!("created default config: {}", path.display());
    }
    Ok(())
}

/// Load the config from disk and apply environment overrides.
pub fn load_config() -> Result<AppConfig> {
    let mut config = load_config_from(&config_path()?)?;
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Parse a config file. Fields missing from the file take defaults; a file
/// that does not parse at all is an `InvalidConfig` error.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = AppConfig::from_toml_str(&raw)
        .map_err(|e| InkError::InvalidConfig(format!("{}: {e}", path.display())))?;
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let toml_str = config
        .to_toml_string()
        .context("Failed to serialize config")?;
    fs::write(path, toml_str).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_dir_under_home() {
        let root = root_dir().unwrap();
        let home = dirs::home_dir().unwrap();
        assert_eq!(root, home.join(".inkdash"));
        assert!(config_path().unwrap().ends_with(".inkdash/config.toml"));
    }

    #[test]
    fn test_init_workspace_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ws");
        init_workspace_at(&root).unwrap();
        init_workspace_at(&root).unwrap();
        assert!(root.join(CONFIG_FILE).is_file());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[rankings]\ntop_n = 5\n").unwrap();
        init_workspace_at(dir.path()).unwrap();
        assert_eq!(load_config_from(&path).unwrap().rankings.top_n, Some(5));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = AppConfig::default();
        config.chain.name = "Base".into();
        config.chain.slug = "base".into();
        save_config_to(&path, &config).unwrap();
        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.chain.name, "Base");
        assert_eq!(reloaded.upstream.base_url, config.upstream.base_url);
    }

    #[test]
    fn test_unparseable_file_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "this is = = not toml").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<InkError>(), Some(InkError::InvalidConfig(_))));
    }
}
