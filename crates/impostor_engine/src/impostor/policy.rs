//! Cache invalidation policy
//!
//! Pure decision logic: no scene access, no side effects. The entry feeds in
//! the frame's measurements and applies the returned decision; everything
//! here is unit-testable in isolation.

use std::time::Duration;

use crate::impostor::config::ImpostorConfig;

/// Which representation of the target is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeState {
    /// The real object is visible, the stand-in hidden
    Active,
    /// The stand-in is visible, the real object hidden
    Forged,
}

impl ForgeState {
    /// Whether the stand-in is the visible representation
    pub fn is_forging(self) -> bool {
        matches!(self, ForgeState::Forged)
    }
}

/// Per-frame measurements the policy decides over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicySample {
    /// Camera distance from the target's nominal position
    pub distance: f32,
    /// Angle between the current view direction and the captured one, when
    /// both exist
    pub angle_delta: Option<f32>,
    /// Time since the last completed refresh; `None` before the first
    pub since_refresh: Option<Duration>,
}

/// Outcome of one policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the stand-in should be the visible representation
    pub should_forge: bool,
    /// Whether the cached texture is stale and needs a re-render
    pub refresh_due: bool,
}

/// Evaluate the invalidation rules for one frame
///
/// Rules, in order:
/// 1. Forge exactly when distance exceeds the threshold. No hysteresis:
///    crossing the threshold toggles state every frame it is crossed.
/// 2. While forging, the texture goes stale when the view direction has
///    drifted past `max_angle` from the captured one.
/// 3. Independently of state, a configured `refresh_interval` forces a
///    refresh once it has elapsed (or when nothing was ever captured), so a
///    texture can be kept fresh even while the real object is shown.
pub fn evaluate(config: &ImpostorConfig, sample: &PolicySample) -> Decision {
    let should_forge = sample.distance > config.distance_threshold;

    let mut refresh_due = false;
    if should_forge {
        if let Some(delta) = sample.angle_delta {
            refresh_due = delta > config.max_angle;
        }
    }

    if let Some(interval) = config.refresh_interval {
        let interval_elapsed = match sample.since_refresh {
            None => true,
            Some(elapsed) => elapsed >= interval,
        };
        if interval_elapsed {
            refresh_due = true;
        }
    }

    Decision {
        should_forge,
        refresh_due,
    }
}
