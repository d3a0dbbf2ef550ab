//! Rigid-body time integration schemes.
//!
//! The scheme is chosen by value when the solver is constructed; solvers
//! match on the variant instead of recovering a concrete stepper type.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Time integration scheme for dynamic rigid bodies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum IntegratorConfig {
    /// Velocity-first explicit Euler. One force evaluation per step.
    SemiImplicitEuler,
    /// Hilber-Hughes-Taylor α-method with Newton iterations on the
    /// acceleration.
    Hht {
        /// Numerical damping, in `[-1/3, 0]`.
        alpha: f64,
        /// Upper bound on Newton iterations per step.
        max_iters: u32,
        /// Convergence threshold on the acceleration update.
        abs_tolerance: f64,
        /// Measure convergence relative to the acceleration magnitude.
        scaling: bool,
    },
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self::Hht {
            alpha: -0.2,
            max_iters: 1000,
            abs_tolerance: 1e-6,
            scaling: true,
        }
    }
}

impl IntegratorConfig {
    /// Check the scheme's settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::SemiImplicitEuler => Ok(()),
            Self::Hht {
                alpha,
                max_iters,
                abs_tolerance,
                ..
            } => {
                if !alpha.is_finite() || !(-1.0 / 3.0..=0.0).contains(&alpha) {
                    return Err(ConfigError::InvalidIntegrator {
                        reason: format!("hht alpha must lie in [-1/3, 0], got {alpha}"),
                    });
                }
                if max_iters == 0 {
                    return Err(ConfigError::InvalidIntegrator {
                        reason: "hht max_iters must be at least 1".to_string(),
                    });
                }
                if !abs_tolerance.is_finite() || abs_tolerance <= 0.0 {
                    return Err(ConfigError::InvalidIntegrator {
                        reason: format!(
                            "hht abs_tolerance must be finite and positive, got {abs_tolerance}"
                        ),
                    });
                }
                Ok(())
            }
        }
    }

    /// Newmark `(gamma, beta)` coefficients implied by the scheme.
    ///
    /// Returns `None` for schemes that are not Newmark-family.
    pub fn newmark_coefficients(&self) -> Option<(f64, f64)> {
        match *self {
            Self::SemiImplicitEuler => None,
            Self::Hht { alpha, .. } => Some(hht_coefficients(alpha)),
        }
    }
}

/// Newmark `(gamma, beta)` for an HHT-α scheme with the given `alpha`.
pub fn hht_coefficients(alpha: f64) -> (f64, f64) {
    let gamma = 0.5 - alpha;
    let beta = (1.0 - alpha) * (1.0 - alpha) / 4.0;
    (gamma, beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_hht_with_light_damping() {
        let cfg = IntegratorConfig::default();
        assert!(cfg.validate().is_ok());
        let (gamma, beta) = cfg.newmark_coefficients().unwrap();
        assert!((gamma - 0.7).abs() < 1e-12);
        assert!((beta - 0.36).abs() < 1e-12);
    }

    #[test]
    fn alpha_outside_range_rejected() {
        let cfg = IntegratorConfig::Hht {
            alpha: 0.1,
            max_iters: 10,
            abs_tolerance: 1e-6,
            scaling: false,
        };
        match cfg.validate() {
            Err(ConfigError::InvalidIntegrator { .. }) => {}
            other => panic!("expected InvalidIntegrator, got {other:?}"),
        }
    }

    #[test]
    fn scheme_tag_round_trips_through_json() {
        let json = r#"{"scheme":"semi_implicit_euler"}"#;
        let cfg: IntegratorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg, IntegratorConfig::SemiImplicitEuler);
    }
}
