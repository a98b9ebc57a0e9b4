use crate::config::settings::DigestConfig;
use crate::error::{DigestError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get XDG-compliant config directory
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "newsdigest")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| DigestError::Config("Could not determine config directory".to_string()))
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from the default location, creating it if missing
pub fn load_config() -> Result<DigestConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<DigestConfig> {
    if !path.exists() {
        let config = DigestConfig::default();
        save_config_to(&config, path)?;
        return Ok(config);
    }

    let content = fs::read_to_string(path)?;
    let config: DigestConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save config to the default location
pub fn save_config(config: &DigestConfig) -> Result<()> {
    save_config_to(config, &config_path()?)
}

pub fn save_config_to(config: &DigestConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Load config and apply environment overrides
pub fn load_config_with_env() -> Result<DigestConfig> {
    let mut config = load_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut DigestConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(key) = var("NEWSDIGEST_OPENAI_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
        config.llm.openai_api_key = Some(key);
    }
    if let Some(token) = var("NEWSDIGEST_GITHUB_TOKEN").or_else(|| var("GITHUB_TOKEN")) {
        config.github.token = Some(token);
    }
    if let Some(backend) = var("NEWSDIGEST_LLM_BACKEND") {
        config.llm.backend = backend;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_serializes() {
        let config = DigestConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[llm]"));
        assert!(toml.contains("[report]"));
        assert!(toml.contains("[hacker_news]"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.llm.backend, "openai");

        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.report.max_chunk_chars, config.report.max_chunk_chars);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm\nbackend = ").unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(DigestError::TomlParse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-fallback"),
            ("NEWSDIGEST_GITHUB_TOKEN", "ghp-token"),
            ("NEWSDIGEST_LLM_BACKEND", "ollama"),
        ]
        .into_iter()
        .collect();

        let mut config = DigestConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.llm.openai_api_key.as_deref(), Some("sk-fallback"));
        assert_eq!(config.github.token.as_deref(), Some("ghp-token"));
        assert_eq!(config.llm.backend, "ollama");
    }
}
