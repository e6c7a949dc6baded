use std::path::Path;
use serde::Deserialize;
use tracing::{debug, info};
use crate::application::validator::{ValidationPolicy, DEFAULT_PRICE};
use crate::domain::error::ImportError;

pub const ENV_API_URL: &str = "PRODUCT_API_URL";
pub const ENV_API_KEY: &str = "PRODUCT_API_KEY";
pub const ENV_TABLE: &str = "PRODUCT_TABLE";
pub const ENV_DEFAULT_PRICE: &str = "IMPORT_DEFAULT_PRICE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
    pub default_price: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            table: "products".to_string(),
            default_price: DEFAULT_PRICE,
        }
    }
}

impl AppConfig {
    /// YAML file (if any) first, then environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ImportError> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        info!(
            "Configuration loaded - table: {}, default price: {}, backend: {}",
            config.table,
            config.default_price,
            config.api_url.as_deref().unwrap_or("not set")
        );
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ImportError> {
        debug!("Reading configuration file {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ImportError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ImportError::Config(e.to_string()))?;
        config.validated()
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ImportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = Some(url);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(table) = lookup(ENV_TABLE) {
            self.table = table;
        }
        if let Some(price) = lookup(ENV_DEFAULT_PRICE) {
            self.default_price = price.trim().parse().map_err(|_| {
                ImportError::Config(format!("{} must be a number, got '{}'", ENV_DEFAULT_PRICE, price))
            })?;
        }
        self.validated()
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy { default_price: self.default_price }
    }

    fn validated(self) -> Result<Self, ImportError> {
        if !self.default_price.is_finite() || self.default_price <= 0.0 {
            return Err(ImportError::Config(format!(
                "default price must be positive, got {}",
                self.default_price
            )));
        }
        if self.table.trim().is_empty() {
            return Err(ImportError::Config("table name must not be empty".to_string()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_file_or_env() {
        let config = AppConfig::default().with_overrides(|_| None).unwrap();
        assert_eq!(config.table, "products");
        assert_eq!(config.default_price, 1000.0);
        assert!(config.api_url.is_none());
    }

    #[test]
    fn yaml_then_env_overrides() {
        let config = AppConfig::from_yaml_str(
            "api_url: https://yaml.example.com\ntable: gems\ndefault_price: 500\n",
        )
        .unwrap();
        assert_eq!(config.table, "gems");

        let env: HashMap<&str, &str> =
            [(ENV_API_URL, "https://env.example.com"), (ENV_DEFAULT_PRICE, "750")].into();
        let config = config
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.table, "gems");
        assert_eq!(config.validation_policy().default_price, 750.0);
    }

    #[test]
    fn rejects_bad_default_price() {
        let bad = AppConfig::default().with_overrides(|key| {
            (key == ENV_DEFAULT_PRICE).then(|| "free".to_string())
        });
        assert!(matches!(bad, Err(ImportError::Config(_))));

        assert!(AppConfig::from_yaml_str("default_price: 0\n").is_err());
    }

    #[test]
    fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.yaml");
        std::fs::write(&path, "api_key: secret\n").unwrap();

        let config = AppConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.table, "products");
    }
}
