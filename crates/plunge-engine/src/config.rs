//! Run control derived from the parameter set.

use plunge_core::{FrameClock, SimParams};

/// Values the driver reads once at construction.
///
/// The loaded step ceiling is kept here as `global_dt_max`; the copy in
/// [`SimParams`] is overwritten with the adaptive ceiling every iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Step ceiling as loaded.
    pub global_dt_max: f64,
    /// Run ends once `t` exceeds this.
    pub end_time: f64,
    /// Iteration ceiling.
    pub max_iterations: u64,
    /// Output frame schedule.
    pub clock: FrameClock,
    /// Whether snapshots are written.
    pub output_enabled: bool,
}

impl DriverConfig {
    /// Extract the run control values from `params`.
    pub fn from_params(params: &SimParams) -> Self {
        Self {
            global_dt_max: params.time.dt_max,
            end_time: params.time.end_time,
            max_iterations: params.run.max_iterations,
            clock: FrameClock::from_fps(params.time.output_fps),
            output_enabled: params.output.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_through() {
        let p = SimParams::default();
        let c = DriverConfig::from_params(&p);
        assert_eq!(c.global_dt_max, 1.0e-3);
        assert_eq!(c.max_iterations, 1_000_000);
        assert!((c.clock.frame_dt() - 0.01).abs() < 1e-15);
        assert!(c.output_enabled);
    }
}
