use std::sync::LazyLock;

use glam::Vec3;
use rust_embed::Embed;
use serde::Deserialize;
use thiserror::Error;

use crate::choreography::IconSpec;
use crate::preload::PreloadConfig;

const SCENE_FILE: &str = "scene.json";

pub static SITE_CONFIG: LazyLock<SiteConfig> = LazyLock::new(|| match SiteConfig::load() {
    Ok(config) => config,
    Err(err) => {
        log::error!("falling back to default site config: {err}");
        SiteConfig::default()
    }
});

#[derive(Embed)]
#[folder = "config"]
struct ConfigAssets;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {0} is not embedded")]
    Missing(&'static str),
    #[error("couldn't parse site config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 25.0],
            fov: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Vertical field of view in radians.
    pub fn fov_radians(&self) -> f32 {
        self.fov.to_radians()
    }
}

/// Everything the scene and preloader read at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub camera: CameraConfig,
    pub preload: PreloadConfig,
    pub icons: Vec<IconSpec>,
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load() -> Result<Self, ConfigError> {
        let file = ConfigAssets::get(SCENE_FILE).ok_or(ConfigError::Missing(SCENE_FILE))?;
        Ok(serde_json::from_slice(&file.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config() {
        let config = SiteConfig::load().expect("embedded config should parse");
        assert_eq!(config.icons.len(), 8);
        assert_eq!(config.preload, PreloadConfig::default());
        assert_eq!(config.camera, CameraConfig::default());

        let statics = config.icons.iter().filter(|icon| icon.is_static()).count();
        assert_eq!(statics, 4);
    }

    #[test]
    fn test_reversed_window_rejected() {
        let json = r#"{
            "icons": [{
                "url": "/icons/broken.glb",
                "start_position": [0, 0, 0],
                "end_position": [1, 1, 1],
                "trigger_start": 0.8,
                "trigger_end": 0.2
            }]
        }"#;
        let err = SiteConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("empty or reversed"));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = SiteConfig::from_json("{}").expect("empty object is valid");
        assert!(config.icons.is_empty());
        assert_eq!(config.preload.ramp_tick_ms, 50);
        assert_eq!(config.camera.eye(), Vec3::new(0.0, 0.0, 25.0));
    }
}
