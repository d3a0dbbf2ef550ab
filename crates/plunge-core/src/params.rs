//! Simulation parameters and their validation.
//!
//! [`SimParams`] is loaded once from a sectioned JSON document and is
//! read-only for the rest of the run, with one exception: the driver
//! writes the adaptive step ceiling back into [`TimeStepping::dt_max`]
//! before every coupled advance.

use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::integrator::IntegratorConfig;

// ── Sections ───────────────────────────────────────────────────────

/// Physical properties of the particle phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    /// Reference density `rho0` (kg/m³).
    pub density: f64,
    /// Artificial speed of sound `Cs` (m/s) used by the equation of state.
    pub sound_speed: f64,
    /// Dynamic viscosity `mu0` (Pa·s).
    pub viscosity: f64,
    /// Gravitational acceleration (m/s²).
    pub gravity: [f64; 3],
}

/// Discretisation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphParameters {
    /// Smoothing length `HSML` (m).
    pub kernel_length: f64,
    /// Lattice pitch as a multiple of the smoothing length (`MULT_INITSPACE`).
    pub spacing_multiplier: f64,
    /// Number of BCE marker layers per solid surface.
    #[serde(default = "default_boundary_layers")]
    pub boundary_layers: u32,
}

/// Time-step bounds, end time and output cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeStepping {
    /// Nominal coupled step `dT` (s).
    pub dt: f64,
    /// Step ceiling `dT_Max` (s). Rewritten by the driver every iteration.
    pub dt_max: f64,
    /// Final simulation time `tFinal` (s).
    pub end_time: f64,
    /// Output frames per simulated second.
    pub output_fps: f64,
}

/// Container and fluid extents (full lengths, not half-lengths).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Container interior extents `(bxDim, byDim, bzDim)`.
    #[serde(rename = "box")]
    pub container: [f64; 3],
    /// Initial fluid/granular bed extents `(fxDim, fyDim, fzDim)`.
    pub fluid: [f64; 3],
}

/// The dropped sphere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyProperties {
    /// Sphere radius (m).
    pub radius: f64,
    /// Sphere material density (kg/m³).
    pub density: f64,
    /// Horizontal placement `(x, y)` and drop height above the bed `z`.
    pub initial_position: [f64; 3],
}

/// Output locations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Write per-frame snapshots.
    pub enabled: bool,
    /// Directory receiving snapshots, the penetration log and a copy of
    /// the effective parameters.
    pub directory: PathBuf,
    /// File name of the penetration time series inside `directory`.
    pub penetration_log: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("sphere_drop_output"),
            penetration_log: "sphere_penetration_depth.txt".to_string(),
        }
    }
}

/// Run control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Hard iteration ceiling. A safety valve, not a normal stop.
    pub max_iterations: u64,
    /// Rigid-body integration scheme.
    pub integrator: IntegratorConfig,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            integrator: IntegratorConfig::default(),
        }
    }
}

fn default_boundary_layers() -> u32 {
    3
}

// ── SimParams ──────────────────────────────────────────────────────

/// Complete physical and numerical configuration of a sphere-drop run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Particle phase properties.
    pub fluid: FluidProperties,
    /// Discretisation.
    pub sph: SphParameters,
    /// Time stepping.
    pub time: TimeStepping,
    /// Container and bed extents.
    pub geometry: Geometry,
    /// The dropped sphere.
    pub body: BodyProperties,
    /// Output locations.
    #[serde(default)]
    pub output: OutputSettings,
    /// Run control.
    #[serde(default)]
    pub run: RunSettings,
}

impl Default for SimParams {
    /// A 1 m cube half filled with a granular bed, and a 5 cm sphere
    /// arriving as if dropped from 0.2 m.
    fn default() -> Self {
        Self {
            fluid: FluidProperties {
                density: 1700.0,
                sound_speed: 30.0,
                viscosity: 0.1,
                gravity: [0.0, 0.0, -9.81],
            },
            sph: SphParameters {
                kernel_length: 0.02,
                spacing_multiplier: 1.2,
                boundary_layers: default_boundary_layers(),
            },
            time: TimeStepping {
                dt: 1.0e-4,
                dt_max: 1.0e-3,
                end_time: 0.5,
                output_fps: 100.0,
            },
            geometry: Geometry {
                container: [1.0, 1.0, 1.0],
                fluid: [1.0, 1.0, 0.5],
            },
            body: BodyProperties {
                radius: 0.05,
                density: 2500.0,
                initial_position: [0.0, 0.0, 0.2],
            },
            output: OutputSettings::default(),
            run: RunSettings::default(),
        }
    }
}

impl SimParams {
    /// Read and validate a parameter file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Parse and validate a parameter document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize the parameters as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Lattice pitch `initSpace0 = MULT_INITSPACE × HSML`.
    pub fn initial_spacing(&self) -> f64 {
        self.sph.spacing_multiplier * self.sph.kernel_length
    }

    /// Gravity as a vector.
    pub fn gravity(&self) -> Vector3<f64> {
        Vector3::from(self.fluid.gravity)
    }

    /// Mass carried by one marker, `rho0 · initSpace0³`.
    pub fn marker_mass(&self) -> f64 {
        self.fluid.density * self.initial_spacing().powi(3)
    }

    /// Check every structural invariant of the parameter set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Scalars that must be finite and strictly positive.
        let positives: [(&'static str, f64); 12] = [
            ("fluid.density", self.fluid.density),
            ("fluid.sound_speed", self.fluid.sound_speed),
            ("sph.kernel_length", self.sph.kernel_length),
            ("sph.spacing_multiplier", self.sph.spacing_multiplier),
            ("time.dt", self.time.dt),
            ("time.dt_max", self.time.dt_max),
            ("time.end_time", self.time.end_time),
            ("time.output_fps", self.time.output_fps),
            ("body.radius", self.body.radius),
            ("body.density", self.body.density),
            ("geometry.box", min3(self.geometry.container)),
            ("geometry.fluid", min3(self.geometry.fluid)),
        ];
        for (field, value) in positives {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.geometry.container.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "geometry.box",
            });
        }
        if self.geometry.fluid.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "geometry.fluid",
            });
        }
        // 2. Viscosity may be zero (inviscid) but not negative.
        if !self.fluid.viscosity.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "fluid.viscosity",
            });
        }
        if self.fluid.viscosity < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "fluid.viscosity",
                value: self.fluid.viscosity,
            });
        }
        // 3. Vectors must be finite.
        if self.fluid.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "fluid.gravity",
            });
        }
        if self.body.initial_position.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "body.initial_position",
            });
        }
        if self.body.initial_position[2] < 0.0 {
            return Err(ConfigError::NegativeDropHeight {
                value: self.body.initial_position[2],
            });
        }
        // 4. The bed must fit inside the container.
        for (axis, (fluid, container)) in ["x", "y", "z"]
            .into_iter()
            .zip(self.geometry.fluid.into_iter().zip(self.geometry.container))
        {
            if fluid > container {
                return Err(ConfigError::FluidExceedsBox {
                    axis,
                    fluid,
                    container,
                });
            }
        }
        // 5. Time-step ordering.
        if self.time.dt > self.time.dt_max {
            return Err(ConfigError::TimeStepOrder {
                dt: self.time.dt,
                dt_max: self.time.dt_max,
            });
        }
        // 6. Run control.
        if self.sph.boundary_layers == 0 {
            return Err(ConfigError::NoBoundaryLayers);
        }
        if self.run.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        self.run.integrator.validate()
    }
}

fn min3(v: [f64; 3]) -> f64 {
    v[0].min(v[1]).min(v[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(SimParams::default().validate().is_ok());
    }

    #[test]
    fn initial_spacing_is_multiplier_times_kernel() {
        let p = SimParams::default();
        assert!((p.initial_spacing() - 0.024).abs() < 1e-12);
    }

    #[test]
    fn negative_radius_rejected() {
        let mut p = SimParams::default();
        p.body.radius = -0.1;
        match p.validate() {
            Err(ConfigError::NonPositive {
                field: "body.radius",
                ..
            }) => {}
            other => panic!("expected NonPositive(body.radius), got {other:?}"),
        }
    }

    #[test]
    fn sphere_below_floor_rejected() {
        let mut p = SimParams::default();
        p.body.initial_position[2] = -0.1;
        match p.validate() {
            Err(ConfigError::NegativeDropHeight { value }) => assert_eq!(value, -0.1),
            other => panic!("expected NegativeDropHeight, got {other:?}"),
        }
        p.body.initial_position[2] = 0.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn nan_fps_rejected() {
        let mut p = SimParams::default();
        p.time.output_fps = f64::NAN;
        match p.validate() {
            Err(ConfigError::NonFinite {
                field: "time.output_fps",
            }) => {}
            other => panic!("expected NonFinite(time.output_fps), got {other:?}"),
        }
    }

    #[test]
    fn fluid_taller_than_box_rejected() {
        let mut p = SimParams::default();
        p.geometry.fluid[2] = 1.5;
        match p.validate() {
            Err(ConfigError::FluidExceedsBox { axis: "z", .. }) => {}
            other => panic!("expected FluidExceedsBox(z), got {other:?}"),
        }
    }

    #[test]
    fn dt_above_ceiling_rejected() {
        let mut p = SimParams::default();
        p.time.dt = 1.0e-2;
        match p.validate() {
            Err(ConfigError::TimeStepOrder { .. }) => {}
            other => panic!("expected TimeStepOrder, got {other:?}"),
        }
    }

    #[test]
    fn zero_boundary_layers_rejected() {
        let mut p = SimParams::default();
        p.sph.boundary_layers = 0;
        assert_eq!(p.validate(), Err(ConfigError::NoBoundaryLayers));
    }

    #[test]
    fn json_round_trip_preserves_params() {
        let p = SimParams::default();
        let json = p.to_json_pretty().unwrap();
        let back = SimParams::from_json_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let json = r#"{
            "fluid": {"density": 1000.0, "sound_speed": 20.0, "viscosity": 0.001,
                      "gravity": [0.0, 0.0, -9.81]},
            "sph": {"kernel_length": 0.01, "spacing_multiplier": 1.0},
            "time": {"dt": 1e-4, "dt_max": 1e-3, "end_time": 0.1, "output_fps": 50.0},
            "geometry": {"box": [0.5, 0.5, 0.5], "fluid": [0.5, 0.5, 0.2]},
            "body": {"radius": 0.02, "density": 3000.0, "initial_position": [0.0, 0.0, 0.1]}
        }"#;
        let p = SimParams::from_json_str(json).unwrap();
        assert_eq!(p.sph.boundary_layers, 3);
        assert_eq!(p.output, OutputSettings::default());
        assert_eq!(p.run.max_iterations, 1_000_000);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        match SimParams::from_json_str("{ not json") {
            Err(ConfigError::Parse { .. }) => {}
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        match SimParams::load(Path::new("/nonexistent/plunge/params.json")) {
            Err(ConfigError::Io { .. }) => {}
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
