//! Runtime configuration for the relaxation solver.
//!
//! Defaults reproduce the reference benchmark: a 258-cell cubic grid
//! relaxed with factor 0.5 against a 1e-7 stopping threshold, for at
//! most 100 iterations. Misconfigurations are rejected up front by
//! [`RelaxConfig::validate`] rather than surfacing later as a silently
//! mis-tiled partition.

use serde::{Deserialize, Serialize};

use crate::error::RelaxError;

/// Solver parameters, deserializable from a JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxConfig {
    /// Grid extent N on every axis, Dirichlet faces included.
    #[serde(default = "default_extent")]
    pub extent: usize,
    /// Correction damping factor w; values below 1 under-relax.
    #[serde(default = "default_relaxation")]
    pub relaxation: f64,
    /// Global convergence threshold on the maximum |correction|.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Iteration budget after which the solve stops regardless.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_extent() -> usize {
    258
}
fn default_relaxation() -> f64 {
    0.5
}
fn default_tolerance() -> f64 {
    1e-7
}
fn default_max_iterations() -> u32 {
    100
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            extent: default_extent(),
            relaxation: default_relaxation(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl RelaxConfig {
    /// Number of interior rows on the decomposition axis.
    pub fn interior(&self) -> usize {
        self.extent.saturating_sub(2)
    }

    /// Check the configuration against a process-group size.
    ///
    /// # Errors
    /// - [`RelaxError::InvalidConfig`] for an unusable extent, damping
    ///   factor, tolerance, or iteration budget;
    /// - [`RelaxError::PartitionMismatch`] when the interior rows cannot
    ///   tile evenly over `nproc` ranks.
    pub fn validate(&self, nproc: usize) -> Result<(), RelaxError> {
        if self.extent < 3 {
            return Err(RelaxError::InvalidConfig(format!(
                "extent {} leaves no interior cells",
                self.extent
            )));
        }
        if !(self.relaxation > 0.0 && self.relaxation < 2.0) {
            return Err(RelaxError::InvalidConfig(format!(
                "relaxation factor {} outside (0, 2)",
                self.relaxation
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(RelaxError::InvalidConfig(format!(
                "tolerance {} must be finite and non-negative",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(RelaxError::InvalidConfig(
                "iteration budget must be at least 1".into(),
            ));
        }
        if nproc == 0 {
            return Err(RelaxError::InvalidConfig("empty process group".into()));
        }
        if self.interior() % nproc != 0 {
            return Err(RelaxError::PartitionMismatch {
                interior: self.interior(),
                nproc,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let cfg = RelaxConfig::default();
        assert_eq!(cfg.extent, 258);
        assert_eq!(cfg.relaxation, 0.5);
        assert_eq!(cfg.tolerance, 1e-7);
        assert_eq!(cfg.max_iterations, 100);
        assert!(cfg.validate(1).is_ok());
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let cfg: RelaxConfig = serde_json::from_str(r#"{"extent": 10}"#).unwrap();
        assert_eq!(cfg.extent, 10);
        assert_eq!(cfg.relaxation, 0.5);
    }

    #[test]
    fn rejects_non_divisible_group() {
        let cfg = RelaxConfig {
            extent: 10,
            ..Default::default()
        };
        // 8 interior rows: 1, 2, 4, 8 ranks fit; 3 does not.
        assert!(cfg.validate(4).is_ok());
        assert!(matches!(
            cfg.validate(3),
            Err(RelaxError::PartitionMismatch {
                interior: 8,
                nproc: 3
            })
        ));
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let tiny = RelaxConfig {
            extent: 2,
            ..Default::default()
        };
        assert!(matches!(
            tiny.validate(1),
            Err(RelaxError::InvalidConfig(_))
        ));

        let overdriven = RelaxConfig {
            relaxation: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            overdriven.validate(1),
            Err(RelaxError::InvalidConfig(_))
        ));

        let cfg = RelaxConfig::default();
        assert!(matches!(
            cfg.validate(0),
            Err(RelaxError::InvalidConfig(_))
        ));
    }
}
