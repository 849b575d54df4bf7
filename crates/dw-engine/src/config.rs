//! Engine tunables, loadable from YAML.
//!
//! Every section and field is optional; omitted values fall back to the
//! defaults below.

use std::fs;
use std::path::Path;

use dw_core::{DEFAULT_PIXELS_PER_FOOT, Real};
use dw_graph::{DEFAULT_DIRECT_HOPS, DEFAULT_INDIRECT_HOPS, DEFAULT_MAX_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub cache: CacheConfig,
    pub traversal: TraversalConfig,
    pub parametric: ParametricConfig,
}

/// Endpoint matching parameters, in canvas units and degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub pixels_per_foot: Real,
    pub connection_tolerance: Real,
    pub straight_angle_tolerance_deg: Real,
    /// Classify multi-endpoint joints as tees/crosses and size changes as
    /// transitions instead of reporting elbows only.
    pub junction_classification: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pixels_per_foot: DEFAULT_PIXELS_PER_FOOT,
            connection_tolerance: 12.0,
            straight_angle_tolerance_deg: 15.0,
            junction_classification: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub direct_hops: usize,
    pub indirect_hops: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            direct_hops: DEFAULT_DIRECT_HOPS,
            indirect_hops: DEFAULT_INDIRECT_HOPS,
        }
    }
}

/// Velocity check parameters. `default_area` is the placeholder cross-section
/// (sq ft) used until real duct areas flow into the velocity estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametricConfig {
    pub default_area: Real,
    pub velocity_warning_fpm: Real,
    pub velocity_error_fpm: Real,
}

impl Default for ParametricConfig {
    fn default() -> Self {
        Self {
            default_area: 1.0,
            velocity_warning_fpm: 2000.0,
            velocity_error_fpm: 2500.0,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> EngineResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> EngineResult<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        let positive = [
            ("detection.pixels_per_foot", self.detection.pixels_per_foot),
            ("parametric.default_area", self.parametric.default_area),
        ];
        for (what, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::InvalidConfig {
                    what: format!("{what} must be positive, got {value}"),
                });
            }
        }
        let non_negative = [
            (
                "detection.connection_tolerance",
                self.detection.connection_tolerance,
            ),
            (
                "detection.straight_angle_tolerance_deg",
                self.detection.straight_angle_tolerance_deg,
            ),
        ];
        for (what, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EngineError::InvalidConfig {
                    what: format!("{what} must be non-negative, got {value}"),
                });
            }
        }
        if self.cache.max_size == 0 {
            return Err(EngineError::InvalidConfig {
                what: "cache.max_size must be at least 1".to_string(),
            });
        }
        if self.parametric.velocity_warning_fpm > self.parametric.velocity_error_fpm {
            return Err(EngineError::InvalidConfig {
                what: "parametric.velocity_warning_fpm exceeds velocity_error_fpm".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.detection.connection_tolerance, 12.0);
        assert_eq!(config.cache.max_size, 100);
        assert_eq!(config.traversal.indirect_hops, 3);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = "detection:\n  junction_classification: true\ncache:\n  max_size: 4\n";
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert!(config.detection.junction_classification);
        assert_eq!(config.detection.straight_angle_tolerance_deg, 15.0);
        assert_eq!(config.cache.max_size, 4);
        assert_eq!(config.parametric.velocity_error_fpm, 2500.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_yaml_str("cache:\n  max_size: 0\n"),
            Err(EngineError::InvalidConfig { .. })
        ));
        assert!(matches!(
            EngineConfig::from_yaml_str("detection:\n  pixels_per_foot: -1\n"),
            Err(EngineError::InvalidConfig { .. })
        ));
        assert!(matches!(
            EngineConfig::from_yaml_str("cache: [1, 2]"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/dw.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dw.yaml"));
    }
}
