//! Cache entry configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::render::target::DEFAULT_TEXTURE_SIZE;
use crate::scene::StandInVariant;

/// How a capture isolates the target from the rest of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStrategy {
    /// Render only the target subtree into the texture
    Subtree,
    /// Render the full scene through a dedicated capture layer that only the
    /// target subtree and its bound lights are placed on for the pass
    MaskedScene,
}

/// Configuration for one impostor cache entry
///
/// Values are validated at construction and by every setter on
/// [`crate::impostor::ImpostorEntry`]; an entry never runs with an invalid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpostorConfig {
    /// Camera distance (world units) beyond which the stand-in replaces the
    /// real object
    pub distance_threshold: f32,

    /// Maximum angle (radians) the view direction may drift from the captured
    /// one before the texture goes stale
    pub max_angle: f32,

    /// Edge length of the square offscreen texture
    pub texture_size: u32,

    /// Orientation strategy for the stand-in quad
    pub variant: StandInVariant,

    /// Capture isolation strategy
    pub capture: CaptureStrategy,

    /// Optional wall-clock refresh period; `None` disables interval refreshes
    ///
    /// Kept last so the TOML rendering stays valid (tables after values).
    #[serde(default)]
    pub refresh_interval: Option<Duration>,
}

impl Default for ImpostorConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 70.0,
            max_angle: 0.5,
            texture_size: DEFAULT_TEXTURE_SIZE,
            variant: StandInVariant::Plane,
            capture: CaptureStrategy::Subtree,
            refresh_interval: None,
        }
    }
}

impl ImpostorConfig {
    /// Builder-style distance threshold
    pub fn with_distance_threshold(mut self, threshold: f32) -> Self {
        self.distance_threshold = threshold;
        self
    }

    /// Builder-style maximum view-angle drift
    pub fn with_max_angle(mut self, radians: f32) -> Self {
        self.max_angle = radians;
        self
    }

    /// Builder-style refresh interval
    pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Builder-style stand-in variant
    pub fn with_variant(mut self, variant: StandInVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Builder-style capture strategy
    pub fn with_capture(mut self, capture: CaptureStrategy) -> Self {
        self.capture = capture;
        self
    }
}

impl Config for ImpostorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.distance_threshold.is_finite() && self.distance_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "distance_threshold must be positive, got {}",
                self.distance_threshold
            )));
        }
        if !(self.max_angle.is_finite() && self.max_angle >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_angle must be non-negative, got {}",
                self.max_angle
            )));
        }
        if let Some(interval) = self.refresh_interval {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "refresh_interval must be non-zero when set".to_string(),
                ));
            }
        }
        if self.texture_size == 0 {
            return Err(ConfigError::Invalid("texture_size must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ImpostorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let config = ImpostorConfig::default().with_distance_threshold(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ImpostorConfig::default().with_distance_threshold(-5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_angle_and_zero_interval() {
        let config = ImpostorConfig::default().with_max_angle(-0.1);
        assert!(config.validate().is_err());

        let config = ImpostorConfig::default().with_refresh_interval(Some(Duration::ZERO));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ImpostorConfig::default()
            .with_max_angle(0.25)
            .with_refresh_interval(Some(Duration::from_secs(2)));

        let text = toml::to_string_pretty(&config).unwrap();
        let back: ImpostorConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
