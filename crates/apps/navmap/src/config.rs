use std::fs;
use std::path::{Path, PathBuf};

use foundation::bounds::Margins;
use foundation::math::Vec2;
use scene::CameraConfig;
use serde::{Deserialize, Serialize};
use streaming::{FacilitySearchConfig, FacilityVisibility};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which nearest-search results start out visible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub large_airports: bool,
    pub medium_airports: bool,
    pub small_airports: bool,
    pub vors: bool,
    pub ndbs: bool,
    pub intersections: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            large_airports: true,
            medium_airports: true,
            small_airports: false,
            vors: true,
            ndbs: true,
            intersections: false,
        }
    }
}

impl VisibilityConfig {
    pub fn flags(&self) -> FacilityVisibility {
        let mut flags = FacilityVisibility::empty();
        flags.set(FacilityVisibility::AIRPORT_LARGE, self.large_airports);
        flags.set(FacilityVisibility::AIRPORT_MEDIUM, self.medium_airports);
        flags.set(FacilityVisibility::AIRPORT_SMALL, self.small_airports);
        flags.set(FacilityVisibility::VOR, self.vors);
        flags.set(FacilityVisibility::NDB, self.ndbs);
        flags.set(FacilityVisibility::INTERSECTION, self.intersections);
        flags
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
    pub dead_zone: Margins,
    pub camera: CameraConfig,
    pub search: FacilitySearchConfig,
    pub visibility: VisibilityConfig,
    pub label_culling: bool,
    /// Multiplier applied to every icon and label size.
    pub symbol_scale: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 876.0,
            height: 678.0,
            dead_zone: Margins::ZERO,
            camera: CameraConfig::default(),
            search: FacilitySearchConfig::default(),
            visibility: VisibilityConfig::default(),
            label_culling: true,
            symbol_scale: 1.0,
        }
    }
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn projected_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scene::{MapOrientation, ViewKind};

    #[test]
    fn empty_object_is_default() {
        let config = MapConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.camera.ranges.len(), 26);
        assert_eq!(config.search.vor_max_items, 250);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = MapConfig::from_json_str(
            r#"{
                "width": 400,
                "dead_zone": { "left": 0, "top": 40, "right": 0, "bottom": 0 },
                "camera": { "view": "traffic", "orientation": "north_up" },
                "search": { "debounce_ms": 250 },
                "visibility": { "intersections": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.width, 400.0);
        assert_eq!(config.height, 678.0);
        assert_eq!(config.dead_zone.top, 40.0);
        assert_eq!(config.camera.view, ViewKind::Traffic);
        assert_eq!(config.camera.orientation, MapOrientation::NorthUp);
        assert_eq!(config.search.debounce_ms, 250.0);
        assert_eq!(config.search.airport_max_items, 500);
        assert!(config.visibility.flags().contains(FacilityVisibility::INTERSECTION));
        assert!(config.visibility.flags().contains(FacilityVisibility::VOR));
    }

    #[test]
    fn empty_range_table_is_rejected() {
        let err = MapConfig::from_json_str(r#"{ "camera": { "ranges": [] } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MapConfig::from_path("/nonexistent/navmap.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/navmap.json"));
    }
}
