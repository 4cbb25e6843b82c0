use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use spritegrid_geometry::GridSize;

use crate::mode::Layout;

/// Errors from loading a scene configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Everything the renderer reads at startup.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub layout: Layout,
    pub grid: GridConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub textures: TextureConfig,
    pub shaders: ShaderConfig,
}

impl SceneConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Format::Yaml,
            Some("json") => Format::Json,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match format {
            Format::Yaml => serde_yaml::from_str(&text)?,
            Format::Json => serde_json::from_str(&text)?,
        };
        tracing::debug!(path = %path.display(), "loaded scene config");
        Ok(config)
    }
}

enum Format {
    Yaml,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: i32,
    pub cols: i32,
}

impl GridConfig {
    pub fn size(&self) -> GridSize {
        GridSize::new(self.rows, self.cols)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 3, cols: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position; the camera looks straight down -Z at `(eye.x, eye.y, 0)`.
    pub eye: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(1.5, 1.5, 3.0),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub center: Vec2,
    pub radius: f32,
    pub z: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            center: Vec2::new(1.5, 1.5),
            radius: 0.75,
            z: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub diffuse: PathBuf,
    pub normal_map: PathBuf,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            diffuse: PathBuf::from("assets/brick.png"),
            normal_map: PathBuf::from("assets/brick-n.png"),
        }
    }
}

/// Optional WGSL overrides; `None` selects the built-in stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: Option<PathBuf>,
    pub fragment: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_three_by_three_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.grid.size(), GridSize::new(3, 3));
        assert_eq!(config.layout, Layout::SideBySide);
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.light.radius, 0.75);
        assert_eq!(config.textures.diffuse, PathBuf::from("assets/brick.png"));
        assert!(config.shaders.vertex.is_none());
    }

    #[test]
    fn loads_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        std::fs::write(
            &path,
            "layout: single\ngrid:\n  rows: 2\nlight:\n  radius: 1.25\n",
        )
        .unwrap();

        let config = SceneConfig::load(&path).unwrap();
        assert_eq!(config.layout, Layout::Single);
        assert_eq!(config.grid, GridConfig { rows: 2, cols: 3 });
        assert_eq!(config.light.radius, 1.25);
        assert_eq!(config.light.center, Vec2::new(1.5, 1.5));
    }

    #[test]
    fn loads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(
            &path,
            r#"{ "camera": { "eye": [0.0, 0.0, 5.0] }, "shaders": { "vertex": "custom.wgsl" } }"#,
        )
        .unwrap();

        let config = SceneConfig::load(&path).unwrap();
        assert_eq!(config.camera.eye, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.shaders.vertex, Some(PathBuf::from("custom.wgsl")));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = SceneConfig::load("scene.toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn reports_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "grid: [unclosed").unwrap();
        assert!(matches!(
            SceneConfig::load(&path).unwrap_err(),
            ConfigError::Yaml(_)
        ));
    }
}
