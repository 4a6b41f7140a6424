use std::path::{Path, PathBuf};

use battleball_render::RenderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Room to join at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub endpoint: String,
    pub room: String,
    pub player_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:2567".into(),
            room: "battle_ball".into(),
            player_name: "player".into(),
        }
    }
}

/// Top-level client settings, loaded from YAML. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub render: RenderConfig,
    pub session: SessionConfig,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ClientConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.session.room, "battle_ball");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let yaml = "
render:
  sphere:
    segments: 32
  max_consecutive_failures: 5
session:
  player_name: ana
";
        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.render.sphere.segments, 32);
        assert_eq!(config.render.sphere.radius, 0.5);
        assert_eq!(config.render.max_consecutive_failures, 5);
        assert_eq!(config.session.player_name, "ana");
        assert_eq!(config.session.room, "battle_ball");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ClientConfig::load(Path::new("/nonexistent/battleball.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("battleball-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "render: [not, a, map]").unwrap();
        let err = ClientConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
