use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::EbdError;
use crate::metrics;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub weighted: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub engine: Option<Utf8PathBuf>,
    pub metric: Option<String>,
    pub weighted: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            engine: None,
            metric: None,
            weighted: false,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, EbdError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("ebd.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| EbdError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| EbdError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, EbdError> {
        let schema_version = config.schema_version.unwrap_or(1);

        if let Some(metric) = &config.metric {
            if !metrics::all_metrics().contains(metric.as_str()) {
                return Err(EbdError::UnknownMetric(metric.clone()));
            }
        }

        let engine = config
            .engine
            .map(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Err(EbdError::ConfigParse("engine path is empty".to_string()))
                } else {
                    Ok(Utf8PathBuf::from(trimmed))
                }
            })
            .transpose()?;

        Ok(ResolvedConfig {
            schema_version,
            engine,
            metric: config.metric,
            weighted: config.weighted.unwrap_or(false),
        })
    }
}
