//! Application configuration: library location, camera selection, and
//! control-surface widget layout.
//!
//! A generic YAML load/save pair plus path resolution helpers, with the
//! app-specific [`AppConfig`] built on top of them.

mod io;
mod paths;

pub use io::{load_config, save_config, ConfigError};
pub use paths::{default_config_path, default_library_path};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rectangular hit region for a control-surface widget, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetRegion {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl WidgetRegion {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// Kind of widget a [`WidgetLayoutEntry`] describes; `handdeck-gesture`
/// constructs the matching widget type from this tag at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    PlayButton,
    CueButton,
    StemButton,
    Platter,
    Slider,
    Waveform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetLayoutEntry {
    pub kind: WidgetKind,
    pub side: crate::types::Side,
    /// Which stem this button controls, for `StemButton` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem: Option<crate::types::Stem>,
    pub region: WidgetRegion,
}

fn default_slider_rate_range() -> (f32, f32) {
    (0.5, 1.5)
}

fn default_camera_index() -> usize {
    0
}

/// Top-level HandDeck configuration, loaded at startup from
/// [`default_config_path`]. Missing or unparsable ⇒ defaults, written back
/// on first run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory of the stem library.
    #[serde(default = "default_library_path")]
    pub library_root: PathBuf,
    /// Camera device index to open for hand tracking.
    #[serde(default = "default_camera_index")]
    pub camera_index: usize,
    /// Control-surface widget positions, read by the frame loop orchestrator.
    #[serde(default)]
    pub widget_layout: Vec<WidgetLayoutEntry>,
    /// `(min, max)` tempo multiplier mapped from a slider's full width.
    #[serde(default = "default_slider_rate_range")]
    pub slider_rate_range: (f32, f32),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_root: default_library_path(),
            camera_index: default_camera_index(),
            widget_layout: Vec::new(),
            slider_rate_range: default_slider_rate_range(),
        }
    }
}

impl AppConfig {
    /// Load from [`default_config_path`], falling back to defaults.
    pub fn load() -> Self {
        load_config(&default_config_path())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        save_config(self, &default_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_slider_rate_range_is_half_to_one_and_half() {
        let config = AppConfig::default();
        assert_eq!(config.slider_rate_range, (0.5, 1.5));
    }

    #[test]
    fn test_widget_region_contains() {
        let region = WidgetRegion { x: 10.0, y: 10.0, w: 20.0, h: 20.0 };
        assert!(region.contains(15.0, 15.0));
        assert!(!region.contains(40.0, 40.0));
    }
}
