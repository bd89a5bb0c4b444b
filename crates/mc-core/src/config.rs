//! Tunable engine constants.
//!
//! Every field has a default; a host can override any subset through
//! JSON (`EngineConfig::from_json`).

use crate::error::{CanvasError, Result};
use crate::geometry::ButtonMetrics;
use crate::view::Camera;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom multiplier per wheel notch.
    pub wheel_zoom_factor: f32,
    /// Zoom used by `center_on_block`.
    pub center_zoom: f32,

    pub min_block_width: f32,
    pub min_block_height: f32,
    pub default_block_width: f32,
    pub default_block_height: f32,

    /// Below this zoom blocks render as glowing points.
    pub constellation_below: f32,
    /// Below this zoom blocks render as flat silhouettes.
    pub minimal_below: f32,
    /// Alpha applied to items outside the search result.
    pub search_dim_alpha: f32,

    /// Screen-pixel tolerance when picking a link curve.
    pub link_hit_tolerance: f32,
    pub link_hit_samples: usize,
    pub connector_hit_radius: f32,
    pub border_hit_width: f32,
    pub shape_button: ButtonMetrics,

    /// Flow-dash advance, screen pixels per second.
    pub flow_speed: f32,

    /// Inactivity before a committed move/resize reaches the sink.
    pub persist_debounce_ms: f64,
    pub legend_duration_ms: f64,
    pub legend_fade_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            wheel_zoom_factor: 1.08,
            center_zoom: 1.2,
            min_block_width: 80.0,
            min_block_height: 50.0,
            default_block_width: 200.0,
            default_block_height: 120.0,
            constellation_below: 0.4,
            minimal_below: 0.7,
            search_dim_alpha: 0.18,
            link_hit_tolerance: 12.0,
            link_hit_samples: 30,
            connector_hit_radius: 12.0,
            border_hit_width: 8.0,
            shape_button: ButtonMetrics::default(),
            flow_speed: 30.0,
            persist_debounce_ms: 300.0,
            legend_duration_ms: 2000.0,
            legend_fade_ms: 500.0,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| CanvasError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(CanvasError::InvalidConfig(format!(
                "zoom range [{}, {}] is empty or non-positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.wheel_zoom_factor <= 1.0 {
            return Err(CanvasError::InvalidConfig(
                "wheel_zoom_factor must be greater than 1".into(),
            ));
        }
        if self.constellation_below > self.minimal_below {
            return Err(CanvasError::InvalidConfig(
                "constellation threshold above minimal threshold".into(),
            ));
        }
        if self.min_block_width <= 0.0 || self.min_block_height <= 0.0 {
            return Err(CanvasError::InvalidConfig(
                "minimum block size must be positive".into(),
            ));
        }
        if self.link_hit_samples == 0 {
            return Err(CanvasError::InvalidConfig(
                "link_hit_samples must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.min_zoom, self.max_zoom)
    }
}

/// Rendering fidelity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    Constellation,
    Minimal,
    Full,
}

impl EngineConfig {
    /// Tier for the current zoom; depends on nothing else.
    pub fn lod(&self, zoom: f32) -> Lod {
        if zoom < self.constellation_below {
            Lod::Constellation
        } else if zoom < self.minimal_below {
            Lod::Minimal
        } else {
            Lod::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_override() {
        let c =
            EngineConfig::from_json(r#"{"max_zoom": 8.0, "persist_debounce_ms": 500}"#).unwrap();
        assert_eq!(c.max_zoom, 8.0);
        assert_eq!(c.persist_debounce_ms, 500.0);
        assert_eq!(c.min_zoom, 0.1);
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let err = EngineConfig::from_json(r#"{"min_zoom": 6.0}"#).unwrap_err();
        assert!(matches!(err, CanvasError::InvalidConfig(_)));
    }

    #[test]
    fn lod_thresholds() {
        let c = EngineConfig::default();
        assert_eq!(c.lod(0.39), Lod::Constellation);
        assert_eq!(c.lod(0.4), Lod::Minimal);
        assert_eq!(c.lod(0.69), Lod::Minimal);
        assert_eq!(c.lod(0.7), Lod::Full);
    }
}
