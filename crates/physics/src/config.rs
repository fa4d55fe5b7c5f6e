use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::PhysicsError;

pub const GRAVITY: f32 = 2.0;
pub const FRAME_RATE: f32 = 60.0;
pub const FRICTION: f32 = 50.0;
pub const LINEAR_DAMPING: f32 = 0.8;
pub const ANGULAR_DAMPING: f32 = 0.8;
pub const COLLISION_MARGIN: f32 = 0.05;
pub const HEIGHTFIELD_MIN: f32 = -100.0;
pub const HEIGHTFIELD_MAX: f32 = 100.0;
pub const MAX_SUBSTEPS: u32 = 10;

/// Simulation constants. Every field defaults to the matching constant above,
/// so a config file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration along -Y.
    pub gravity: f32,
    /// Physics ticks per second. Also sets the fixed internal time step.
    pub frame_rate: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Collision margin applied to primitive shapes.
    pub collision_margin: f32,
    pub heightfield_min: f32,
    pub heightfield_max: f32,
    /// Upper bound on fixed sub-steps per `step()`.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            frame_rate: FRAME_RATE,
            friction: FRICTION,
            linear_damping: LINEAR_DAMPING,
            angular_damping: ANGULAR_DAMPING,
            collision_margin: COLLISION_MARGIN,
            heightfield_min: HEIGHTFIELD_MIN,
            heightfield_max: HEIGHTFIELD_MAX,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl PhysicsConfig {
    /// Duration of one fixed sub-step, in seconds.
    pub fn fixed_time_step(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Period of the fixed-rate step timer.
    pub fn step_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate as f64)
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !positive(self.frame_rate) {
            return Err(invalid("frame_rate", "must be positive and finite"));
        }
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "must be finite"));
        }
        if !non_negative(self.friction) {
            return Err(invalid("friction", "must be non-negative"));
        }
        if !non_negative(self.linear_damping) || !non_negative(self.angular_damping) {
            return Err(invalid("damping", "must be non-negative"));
        }
        if !non_negative(self.collision_margin) {
            return Err(invalid("collision_margin", "must be non-negative"));
        }
        if self.heightfield_min.is_nan() || self.heightfield_min >= self.heightfield_max {
            return Err(invalid("heightfield_min", "must be below heightfield_max"));
        }
        if self.max_substeps == 0 {
            return Err(invalid("max_substeps", "must be at least 1"));
        }
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, PhysicsError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }
}

fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

fn non_negative(x: f32) -> bool {
    x.is_finite() && x >= 0.0
}

fn invalid(field: &'static str, reason: &str) -> PhysicsError {
    PhysicsError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_constants() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, 2.0);
        assert_eq!(config.frame_rate, 60.0);
        assert_eq!(config.max_substeps, 10);
        assert_eq!(config.collision_margin, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn step_period_follows_frame_rate() {
        let config = PhysicsConfig {
            frame_rate: 50.0,
            ..PhysicsConfig::default()
        };
        assert_eq!(config.step_period(), Duration::from_millis(20));
        assert!((config.fixed_time_step() - 0.02).abs() < 1e-7);
    }

    #[test]
    fn zero_frame_rate_is_rejected() {
        let config = PhysicsConfig {
            frame_rate: 0.0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::InvalidConfig {
                field: "frame_rate",
                ..
            })
        ));
    }

    #[test]
    fn inverted_band_is_rejected() {
        let config = PhysicsConfig {
            heightfield_min: 5.0,
            heightfield_max: -5.0,
            ..PhysicsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = PhysicsConfig::from_yaml_str("gravity: 9.81\nmax_substeps: 4\n").unwrap();
        assert_eq!(config.gravity, 9.81);
        assert_eq!(config.max_substeps, 4);
        assert_eq!(config.friction, FRICTION);
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "frame_rate: 30").unwrap();
        let config = PhysicsConfig::load(tmp.path()).unwrap();
        assert_eq!(config.frame_rate, 30.0);
    }

    #[test]
    fn invalid_yaml_values_fail_validation() {
        assert!(PhysicsConfig::from_yaml_str("max_substeps: 0").is_err());
    }
}
