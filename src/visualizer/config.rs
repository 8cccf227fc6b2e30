//! Visualizer configuration
//!
//! An immutable snapshot handed to `start`. Every key is optional in JSON.

use crate::capture::input::types::Point;
use crate::overlay::marker::MarkerFrame;
use crate::visualizer::error::VisualizerResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for MarkerColor {
    fn default() -> Self {
        Self {
            r: 0.0,
            g: 0.48,
            b: 1.0,
            a: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    /// Emit deduplicated marker state through the diagnostic sink
    pub shows_log: bool,
    pub color: MarkerColor,
    /// Marker diameter in points
    pub default_size: f64,
    /// Size markers from the contact radius when the host reports one
    pub shows_touch_radius: bool,
    pub fade_duration_ms: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            shows_log: false,
            color: MarkerColor::default(),
            default_size: 60.0,
            shows_touch_radius: false,
            fade_duration_ms: 200,
        }
    }
}

impl Configuration {
    pub fn from_json_str(json: &str) -> VisualizerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    /// Frame of an active marker centered at `center`
    pub fn active_frame(&self, center: Point, radius: f64) -> MarkerFrame {
        let diameter = if self.shows_touch_radius && radius > 0.0 {
            radius * 2.0
        } else {
            self.default_size
        };
        MarkerFrame {
            center,
            diameter,
            color: self.color,
            opacity: 1.0,
            scale: 1.0,
            transition: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::fade::FADE_END_SCALE;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = Configuration::from_json_str("{}").unwrap();
        assert_eq!(config, Configuration::default());
        assert!(!config.shows_log);
        assert_eq!(config.fade_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_camel_case_keys() {
        let config = Configuration::from_json_str(
            r#"{"showsLog": true, "showsTouchRadius": true, "defaultSize": 44.0, "fadeDurationMs": 350}"#,
        )
        .unwrap();

        assert!(config.shows_log);
        assert!(config.shows_touch_radius);
        assert_eq!(config.default_size, 44.0);
        assert_eq!(config.fade_duration(), Duration::from_millis(350));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Configuration::from_json_str("{\"showsLog\": 3").is_err());
    }

    #[test]
    fn test_frame_diameter_follows_radius_only_when_enabled() {
        let center = Point::new(1.0, 2.0);
        let mut config = Configuration::default();
        assert_eq!(config.active_frame(center, 12.0).diameter, 60.0);

        config.shows_touch_radius = true;
        assert_eq!(config.active_frame(center, 12.0).diameter, 24.0);
        assert_eq!(config.active_frame(center, 0.0).diameter, 60.0);
        assert!(FADE_END_SCALE < config.active_frame(center, 0.0).scale);
    }
}
