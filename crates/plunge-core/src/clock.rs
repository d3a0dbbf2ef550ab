//! Output frame schedule.
//!
//! Frames are due at integer multiples of `1 / fps`. The driver asks the
//! clock for the step ceiling before every advance so that no step jumps
//! over a frame time, and the export sink asks it whether the current
//! time sits on a frame boundary.

/// Slack added to `t` before locating the current frame, so a time that
/// landed a hair short of a boundary counts as having reached it.
pub const FRAME_EPSILON: f64 = 1.0e-6;

/// Distances to the next frame at or below this value do not clamp the
/// step ceiling.
pub const MIN_ALLOWABLE_DT: f64 = 1.0e-7;

/// Tolerance for treating `t` as equal to a frame time.
pub const FRAME_MATCH_TOLERANCE: f64 = 1.0e-7;

/// Frame schedule derived from the output rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    frame_dt: f64,
}

impl FrameClock {
    /// Clock emitting `fps` frames per simulated second.
    ///
    /// `fps` must be finite and positive; [`SimParams::validate`]
    /// guarantees that for loaded parameters.
    ///
    /// [`SimParams::validate`]: crate::SimParams::validate
    pub fn from_fps(fps: f64) -> Self {
        Self {
            frame_dt: 1.0 / fps,
        }
    }

    /// Interval between two frames.
    pub fn frame_dt(&self) -> f64 {
        self.frame_dt
    }

    /// Index of the first frame strictly after `t`.
    pub fn next_frame(&self, t: f64) -> u64 {
        ((t + FRAME_EPSILON) / self.frame_dt).floor() as u64 + 1
    }

    /// Simulation time of `frame`.
    pub fn frame_time(&self, frame: u64) -> f64 {
        frame as f64 * self.frame_dt
    }

    /// Largest step allowed at time `t` given the configured ceiling.
    ///
    /// The ceiling is clamped to the distance to the next frame, unless
    /// that distance is negligible.
    pub fn step_ceiling(&self, t: f64, global_max: f64) -> f64 {
        let max_allowable_dt = self.frame_time(self.next_frame(t)) - t;
        if max_allowable_dt > MIN_ALLOWABLE_DT {
            global_max.min(max_allowable_dt)
        } else {
            global_max
        }
    }

    /// Whether `t` coincides with the time of `frame`.
    pub fn is_frame_boundary(&self, t: f64, frame: u64) -> bool {
        (t - self.frame_time(frame)).abs() < FRAME_MATCH_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn next_frame_from_zero_is_one() {
        let clock = FrameClock::from_fps(100.0);
        assert_eq!(clock.next_frame(0.0), 1);
        assert!((clock.frame_time(1) - 0.01).abs() < 1e-15);
    }

    #[test]
    fn time_just_short_of_boundary_counts_as_reached() {
        let clock = FrameClock::from_fps(100.0);
        assert_eq!(clock.next_frame(0.01 - 5.0e-7), 2);
    }

    #[test]
    fn ceiling_clamped_near_frame() {
        let clock = FrameClock::from_fps(100.0);
        let c = clock.step_ceiling(0.0095, 1.0e-3);
        assert!((c - 0.0005).abs() < 1e-12, "{c}");
        assert_eq!(clock.step_ceiling(0.0, 1.0e-3), 1.0e-3);
    }

    #[test]
    fn boundary_match_uses_tolerance() {
        let clock = FrameClock::from_fps(100.0);
        assert!(clock.is_frame_boundary(0.02 + 5.0e-8, 2));
        assert!(!clock.is_frame_boundary(0.02 + 5.0e-7, 2));
        assert!(clock.is_frame_boundary(0.0, 0));
    }

    proptest! {
        #[test]
        fn ceiling_never_exceeds_global(
            t in 0.0f64..10.0,
            fps in 1.0f64..500.0,
            max in 1e-6f64..1e-1,
        ) {
            let clock = FrameClock::from_fps(fps);
            let c = clock.step_ceiling(t, max);
            prop_assert!(c <= max);
            prop_assert!(c > 0.0);
        }

        #[test]
        fn step_at_ceiling_never_overshoots_next_frame(t in 0.0f64..10.0, fps in 1.0f64..500.0) {
            let clock = FrameClock::from_fps(fps);
            let next = clock.next_frame(t);
            let c = clock.step_ceiling(t, 1.0);
            prop_assert!(t + c <= clock.frame_time(next) + 1e-9);
        }
    }
}
