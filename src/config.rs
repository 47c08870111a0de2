//! Run-wide constants: seed, turtle geometry, guards and timing.
//!
//! A [`Config`] is fixed once an animation starts. Front-ends may load one from a JSON
//! file; any field left out of the file keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::turtle::Turtle;
use crate::types::{is_program, LsysError};

/// Replacements allowed in a single rule application.
pub const DEFAULT_GROWTH_LIMIT: usize = 10_000;
/// Segments a frame may hold before the animation stops.
pub const DEFAULT_SEGMENT_CAP: usize = 10_000;
/// Candidate rule sets tried by the acceptance search before giving up.
pub const DEFAULT_SEARCH_ATTEMPTS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The program every derivation starts from.
    pub seed: String,
    /// Distance covered by `f` and `g`.
    pub step_length: f64,
    /// Rotation applied by `+` and `-`, in degrees.
    pub turn_angle_degrees: f64,
    pub growth_limit: usize,
    pub segment_cap: usize,
    /// Time between animation ticks.
    pub tick_interval_ms: u64,
    /// Padding added around the path on every side of the viewport.
    pub margin: f64,
    pub search_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: "f".to_string(),
            step_length: 10.0,
            turn_angle_degrees: 60.0,
            growth_limit: DEFAULT_GROWTH_LIMIT,
            segment_cap: DEFAULT_SEGMENT_CAP,
            tick_interval_ms: 100,
            margin: 10.0,
            search_attempts: DEFAULT_SEARCH_ATTEMPTS,
        }
    }
}

impl Config {
    /// Reads a configuration from a JSON file and validates it.
    pub fn load(path: &Path) -> Result<Self, LsysError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LsysError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, LsysError> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| LsysError::ConfigError(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LsysError> {
        if self.seed.is_empty() || !is_program(&self.seed) {
            return Err(LsysError::ConfigError(format!(
                "Seed {:?} must be a non-empty string of alphabet symbols",
                self.seed
            )));
        }

        if !self.step_length.is_finite() || !self.turn_angle_degrees.is_finite() {
            return Err(LsysError::ConfigError(
                "Step length and turn angle must be finite".to_string(),
            ));
        }

        if self.search_attempts == 0 {
            return Err(LsysError::ConfigError(
                "search_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the turtle described by this configuration.
    pub fn turtle(&self) -> Turtle {
        Turtle::new(self.step_length, self.turn_angle_degrees.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.seed, "f");
        assert_eq!(config.step_length, 10.0);
        assert_eq!(config.turn_angle_degrees, 60.0);
        assert_eq!(config.growth_limit, 10_000);
        assert_eq!(config.segment_cap, 10_000);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.margin, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "seed": "f+f", "segment_cap": 50 }"#).unwrap();
        assert_eq!(config.seed, "f+f");
        assert_eq!(config.segment_cap, 50);
        assert_eq!(config.growth_limit, DEFAULT_GROWTH_LIMIT);
    }

    #[test]
    fn test_invalid_seed() {
        let result = Config::from_json(r#"{ "seed": "fA" }"#);
        assert!(matches!(result, Err(LsysError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = Config::from_json("{ seed");
        assert!(matches!(result, Err(LsysError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{ "turn_angle_degrees": 90.0 }"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.turn_angle_degrees, 90.0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/lsys.json"));
        assert!(matches!(result, Err(LsysError::FileError(_))));
    }
}
