//! Parameter sets and pre-built states.

use nalgebra::{Isometry3, Vector3};
use plunge_core::{
    CoupledState, FluidMarker, MarkerState, Phase, RigidBody, Segment, ShellGeometry, ShellSpec,
    SimParams, SurfaceKind,
};

/// The reference sphere-drop scenario: 1 m cube, 0.5 m bed, 5 cm sphere
/// dropped from 0.2 m. Output is disabled so tests never touch disk.
pub fn sphere_drop_params() -> SimParams {
    let mut p = SimParams::default();
    p.output.enabled = false;
    p
}

/// A small, quick variant: 0.2 m box, 0.1 m bed, coarse lattice, short
/// end time.
pub fn coarse_params() -> SimParams {
    let mut p = SimParams::default();
    p.geometry.container = [0.2, 0.2, 0.2];
    p.geometry.fluid = [0.2, 0.2, 0.1];
    p.sph.kernel_length = 0.02;
    p.sph.spacing_multiplier = 1.5;
    p.sph.boundary_layers = 2;
    p.body.radius = 0.03;
    p.body.initial_position = [0.0, 0.0, 0.05];
    p.time.dt = 5.0e-4;
    p.time.dt_max = 1.0e-3;
    p.time.end_time = 0.05;
    p.time.output_fps = 100.0;
    p.output.enabled = false;
    p
}

/// Four fluid markers followed by a three-marker sphere shell, with the
/// usual fluid and boundary segments.
pub fn two_segment_state() -> CoupledState {
    let mut state = CoupledState::new();
    let fluid = MarkerState {
        density: 1000.0,
        pressure: 0.0,
        viscosity: 0.001,
        phase: Phase::Fluid,
    };
    for i in 0..4 {
        state.add_marker(FluidMarker::at_rest(
            Vector3::new(i as f64 * 0.1, 0.0, 0.0),
            0.02,
            fluid,
        ));
    }
    let pushed = state
        .reference_mut()
        .push(Segment {
            start: 0,
            end: 4,
            phase: Phase::Fluid,
            subtype: -1,
        })
        .and_then(|_| {
            state.reference_mut().push(Segment {
                start: 4,
                end: 4,
                phase: Phase::Boundary,
                subtype: 0,
            })
        });
    assert!(pushed.is_ok(), "fixture segments rejected: {pushed:?}");

    let id = state.add_rigid_body(RigidBody::solid_sphere(
        0.05,
        2500.0,
        Vector3::new(0.0, 0.0, 0.5),
    ));
    let spec = ShellSpec {
        kind: SurfaceKind::Sphere,
        geometry: ShellGeometry::Sphere { radius: 0.05 },
        local_pose: Isometry3::identity(),
        points: vec![
            Vector3::new(0.05, 0.0, 0.0),
            Vector3::new(0.0, 0.05, 0.0),
            Vector3::new(0.0, 0.0, -0.05),
        ],
    };
    let bce = MarkerState {
        phase: Phase::Boundary,
        ..fluid
    };
    let attached = state.add_boundary_shell(id, spec, bce, 0.02);
    assert!(attached.is_ok(), "fixture shell rejected: {attached:?}");
    let fsi = state.add_fsi_body(id);
    assert!(fsi.is_ok());
    state
}
