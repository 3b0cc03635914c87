//! Process configuration from environment variables.
//!
//! | Variable           | Default                  |
//! |--------------------|--------------------------|
//! | `PORT`             | `3000`                   |
//! | `HVAC_SITE_URL`    | `https://hvaclocate.com` |
//! | `HVAC_DATA_SOURCE` | `sample`                 |
//! | `HVAC_TABLE_PATH`  | required for `table`     |

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SITE_URL: &str = "https://hvaclocate.com";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a port number, got '{0}'")]
    InvalidPort(String),

    #[error("HVAC_DATA_SOURCE must be 'sample' or 'table', got '{0}'")]
    UnknownDataSource(String),

    #[error("HVAC_TABLE_PATH is required when HVAC_DATA_SOURCE=table")]
    MissingTablePath,
}

/// Where listings come from. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceConfig {
    /// Fixed in-memory sample listings.
    Sample,
    /// DataFusion table over a Parquet or NDJSON file.
    Table { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Absolute site root used in canonical links, JSON-LD and the sitemap.
    pub site_url: String,
    pub data_source: DataSourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            site_url: DEFAULT_SITE_URL.to_string(),
            data_source: DataSourceConfig::Sample,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let site_url = get("HVAC_SITE_URL")
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let data_source = match get("HVAC_DATA_SOURCE").map(|s| s.to_ascii_lowercase()) {
            None => DataSourceConfig::Sample,
            Some(kind) if kind == "sample" => DataSourceConfig::Sample,
            Some(kind) if kind == "table" => {
                let path = get("HVAC_TABLE_PATH").ok_or(ConfigError::MissingTablePath)?;
                DataSourceConfig::Table {
                    path: PathBuf::from(path),
                }
            }
            Some(other) => return Err(ConfigError::UnknownDataSource(other)),
        };

        Ok(Self {
            port,
            site_url,
            data_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_sample_data() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn table_source_needs_a_path() {
        assert_eq!(
            config(&[("HVAC_DATA_SOURCE", "table")]),
            Err(ConfigError::MissingTablePath)
        );

        let cfg = config(&[
            ("HVAC_DATA_SOURCE", "TABLE"),
            ("HVAC_TABLE_PATH", "/data/businesses.parquet"),
        ])
        .unwrap();
        assert_eq!(
            cfg.data_source,
            DataSourceConfig::Table {
                path: PathBuf::from("/data/businesses.parquet")
            }
        );
    }

    #[test]
    fn rejects_unknown_source_and_bad_port() {
        assert_eq!(
            config(&[("HVAC_DATA_SOURCE", "supabase")]),
            Err(ConfigError::UnknownDataSource("supabase".to_string()))
        );
        assert_eq!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort("eighty".to_string()))
        );
    }

    #[test]
    fn site_url_loses_trailing_slash() {
        let cfg = config(&[("HVAC_SITE_URL", "https://example.com/"), ("PORT", "8080")]).unwrap();
        assert_eq!(cfg.site_url, "https://example.com");
        assert_eq!(cfg.port, 8080);
    }
}
