//! Engine configuration
//!
//! Every tunable constant of the engine lives in [`EngineConfig`]. Configs are
//! written as YAML with kebab-case keys; missing keys fall back to the defaults.
//!
//! ```yaml
//! tolerance-window: 0.2
//! recent-notes: 12
//! ```

use serde::Deserialize;

use crate::error::KeybedError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Velocity used when an input source reports none
    pub default_velocity: f32,
    /// Capacity of the recent-notes ring
    pub recent_notes: usize,
    /// Max |deviation| in seconds still graded as on time
    pub tolerance_window: f64,
    /// Delay between starting a lesson and its beat 0
    pub lead_in: f64,
    /// Delay after the range end before the lesson stops or loops
    pub end_padding: f64,
    /// Delay before the first replayed event
    pub replay_lead: f64,
    /// Transpose is clamped to +/- this many semitones
    pub transpose_limit: i32,
    /// Octave shift is clamped to +/- this many octaves
    pub octave_limit: i32,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Duration in beats of a lesson step that gives none
    pub default_step_beats: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_velocity: 0.8,
            recent_notes: 8,
            tolerance_window: 0.15,
            lead_in: 0.2,
            end_padding: 0.05,
            replay_lead: 0.05,
            transpose_limit: 12,
            octave_limit: 2,
            min_speed: 0.7,
            max_speed: 1.0,
            default_step_beats: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a YAML config
    pub fn from_yaml(source: &str) -> Result<Self, KeybedError> {
        // An empty document means "all defaults"
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: EngineConfig = serde_yaml::from_str(source)
            .map_err(|e| KeybedError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KeybedError> {
        let fail = |msg: &str| Err(KeybedError::ConfigError(msg.to_string()));

        if !(0.0..=1.0).contains(&self.default_velocity) {
            return fail("default-velocity must be between 0 and 1");
        }
        if self.recent_notes == 0 {
            return fail("recent-notes must be at least 1");
        }
        if !(self.tolerance_window.is_finite() && self.tolerance_window > 0.0) {
            return fail("tolerance-window must be a positive number of seconds");
        }
        for (name, value) in [
            ("lead-in", self.lead_in),
            ("end-padding", self.end_padding),
            ("replay-lead", self.replay_lead),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(KeybedError::ConfigError(format!("{} must not be negative", name)));
            }
        }
        if self.transpose_limit < 0 || self.octave_limit < 0 {
            return fail("transpose-limit and octave-limit must not be negative");
        }
        if !(self.min_speed.is_finite() && self.min_speed > 0.0) || !self.max_speed.is_finite() {
            return fail("speed limits must be positive numbers");
        }
        if self.min_speed > self.max_speed {
            return fail("min-speed must not exceed max-speed");
        }
        if !(self.default_step_beats.is_finite() && self.default_step_beats > 0.0) {
            return fail("default-step-beats must be positive");
        }
        Ok(())
    }

    pub fn clamp_speed(&self, speed: f64) -> f64 {
        if speed.is_nan() {
            return self.max_speed;
        }
        speed.clamp(self.min_speed, self.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recent_notes, 8);
        assert_eq!(config.tolerance_window, 0.15);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml("tolerance-window: 0.25\nrecent-notes: 4\n").unwrap();
        assert_eq!(config.tolerance_window, 0.25);
        assert_eq!(config.recent_notes, 4);
        assert_eq!(config.lead_in, 0.2);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(EngineConfig::from_yaml("  \n").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_invalid_configs() {
        for source in [
            "recent-notes: 0",
            "tolerance-window: -1",
            "min-speed: 1.5\nmax-speed: 1.0",
            "default-velocity: 2",
            "lead-in: -0.1",
            "no-such-key: 1",
            "recent-notes: [1, 2]",
        ] {
            let result = EngineConfig::from_yaml(source);
            assert!(
                matches!(result, Err(KeybedError::ConfigError(_))),
                "expected config error for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_clamp_speed() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_speed(0.5), 0.7);
        assert_eq!(config.clamp_speed(0.85), 0.85);
        assert_eq!(config.clamp_speed(3.0), 1.0);
        assert_eq!(config.clamp_speed(f64::NAN), 1.0);
    }
}
