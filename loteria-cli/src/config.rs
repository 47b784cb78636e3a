use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use loteria_db::db;

pub const DEFAULT_CONFIG_FILE: &str = "loteria.json";
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub history_limit: u32,
    pub ai: AiConfig,
}

/// Paramètres de l'API de complétion (compatible OpenAI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Jamais lu depuis le fichier, uniquement depuis `OPENAI_API_KEY`.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            ai: AiConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Fichier explicite obligatoire s'il est donné, sinon `loteria.json` s'il existe,
    /// sinon valeurs par défaut. Les variables d'environnement s'appliquent ensuite.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    log::debug!("Pas de {DEFAULT_CONFIG_FILE}, configuration par défaut");
                    Self::default()
                }
            }
        };
        config.apply_overrides(
            std::env::var("LOTERIA_DB").ok(),
            std::env::var("OPENAI_API_KEY").ok(),
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&json)
            .with_context(|| format!("JSON invalide dans {}", path.display()))?;
        log::debug!("Configuration chargée depuis {}", path.display());
        Ok(config)
    }

    pub fn apply_overrides(&mut self, db_path: Option<String>, api_key: Option<String>) {
        if let Some(path) = db_path.filter(|p| !p.trim().is_empty()) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.ai.api_key = Some(key.trim().to_string());
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(db::db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.ai.model, "gpt-4o");
        assert!((config.ai.temperature - 0.7).abs() < 1e-6);
        assert_eq!(config.ai.max_tokens, 300);
        assert!(config.database_path().ends_with("data/loteria.db"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"history_limit": 20, "ai": {{"model": "gpt-4o-mini"}}}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.max_tokens, 300);
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn test_api_key_not_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ai": {{"api_key": "sk-fichier"}}}}"#).unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ai.api_key, None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ pas du json").unwrap();
        assert!(AppConfig::from_file(file.path()).is_err());
        assert!(AppConfig::load(Some(Path::new("/nonexistent/loteria.json"))).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("/tmp/autre.db".to_string()), Some(" sk-test ".to_string()));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/autre.db"));
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));

        let mut config = AppConfig::default();
        config.apply_overrides(Some(String::new()), Some("  ".to_string()));
        assert_eq!(config.db_path, None);
        assert_eq!(config.ai.api_key, None);
    }
}
