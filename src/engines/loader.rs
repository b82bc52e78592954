//! Engine loader for initializing the configured engine

use super::traits::Engine;
use super::{brave, google};
use crate::config::SearchSettings;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Loader for initializing an engine from configuration
pub struct EngineLoader;

impl EngineLoader {
    /// Create, initialize and validate the engine named in settings
    pub fn load(config: &SearchSettings) -> Result<Arc<dyn Engine>> {
        let mut engine: Box<dyn Engine> = match config.engine.as_str() {
            "google" => Box::new(google::Google::new()),
            "brave" => Box::new(brave::Brave::new()),
            other => {
                return Err(anyhow::anyhow!(
                    "Unknown engine type: {} (available: {})",
                    other,
                    Self::available_engines().join(", ")
                ));
            }
        };

        engine.init(config)?;
        engine.validate()?;

        info!("Loaded search engine: {}", engine.name());
        Ok(Arc::from(engine))
    }

    /// Get list of available engine types
    pub fn available_engines() -> Vec<&'static str> {
        vec!["google", "brave"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_google_with_credentials() {
        let config = SearchSettings {
            api_key: Some("key".to_string()),
            engine_id: Some("cx".to_string()),
            ..Default::default()
        };
        let engine = EngineLoader::load(&config).unwrap();
        assert_eq!(engine.name(), "google");
        assert_eq!(engine.max_results(), 10);
    }

    #[test]
    fn test_load_fails_without_credentials() {
        let config = SearchSettings::default();
        assert!(EngineLoader::load(&config).is_err());
    }

    #[test]
    fn test_load_unknown_engine() {
        let config = SearchSettings {
            engine: "altavista".to_string(),
            ..Default::default()
        };
        let err = EngineLoader::load(&config).err().unwrap();
        assert!(err.to_string().contains("altavista"));
    }
}
