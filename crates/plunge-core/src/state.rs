//! The coupled system state handed to the solver each step.

use std::ops::Range;

use indexmap::IndexMap;
use nalgebra::Vector3;

use crate::body::RigidBody;
use crate::error::BuildError;
use crate::id::BodyId;
use crate::marker::{FluidMarker, MarkerState};
use crate::reference::ReferenceArray;
use crate::shell::{BoundaryShell, ShellSpec};

/// Marker array, segmentation, rigid bodies and BCE shells.
///
/// Markers are only ever appended. Bodies are kept in registration order
/// so snapshots list them deterministically.
#[derive(Clone, Debug, Default)]
pub struct CoupledState {
    markers: Vec<FluidMarker>,
    reference: ReferenceArray,
    bodies: IndexMap<BodyId, RigidBody>,
    shells: Vec<BoundaryShell>,
    fsi_bodies: Vec<BodyId>,
    next_body: u32,
}

impl CoupledState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Markers ────────────────────────────────────────────────────

    /// All markers, fluid first.
    pub fn markers(&self) -> &[FluidMarker] {
        &self.markers
    }

    /// Mutable access for the solver.
    pub fn markers_mut(&mut self) -> &mut [FluidMarker] {
        &mut self.markers
    }

    /// Number of markers.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Append one marker and return its index.
    ///
    /// Segment bookkeeping is the caller's job; see
    /// [`reference_mut`](Self::reference_mut).
    pub fn add_marker(&mut self, marker: FluidMarker) -> usize {
        self.markers.push(marker);
        self.markers.len() - 1
    }

    /// Segmentation of the marker array.
    pub fn reference(&self) -> &ReferenceArray {
        &self.reference
    }

    /// Mutable segmentation, for the construction stages.
    pub fn reference_mut(&mut self) -> &mut ReferenceArray {
        &mut self.reference
    }

    // ── Bodies ─────────────────────────────────────────────────────

    /// Register a rigid body and return its id.
    pub fn add_rigid_body(&mut self, mut body: RigidBody) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;
        body.id = id;
        self.bodies.insert(id, body);
        id
    }

    /// Body by id.
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    /// Mutable body by id.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    /// Bodies in registration order.
    pub fn bodies(&self) -> impl ExactSizeIterator<Item = &RigidBody> {
        self.bodies.values()
    }

    /// Mutable bodies in registration order.
    pub fn bodies_mut(&mut self) -> impl ExactSizeIterator<Item = &mut RigidBody> {
        self.bodies.values_mut()
    }

    /// Number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Mark a body as receiving fluid forces every step.
    pub fn add_fsi_body(&mut self, id: BodyId) -> Result<(), BuildError> {
        if !self.bodies.contains_key(&id) {
            return Err(BuildError::UnknownBody { id });
        }
        if !self.fsi_bodies.contains(&id) {
            self.fsi_bodies.push(id);
        }
        Ok(())
    }

    /// Bodies registered for force back-coupling.
    pub fn fsi_bodies(&self) -> &[BodyId] {
        &self.fsi_bodies
    }

    // ── Shells ─────────────────────────────────────────────────────

    /// Attach a BCE shell to `body`.
    ///
    /// The shell markers are appended at the end of the marker array and
    /// the last reference segment grows to cover them. Markers start at
    /// the body's current pose and velocity.
    pub fn add_boundary_shell(
        &mut self,
        body: BodyId,
        spec: ShellSpec,
        marker: MarkerState,
        smoothing_length: f64,
    ) -> Result<Range<usize>, BuildError> {
        let parent = self.bodies.get(&body).ok_or(BuildError::UnknownBody { id: body })?;
        let covered = self.reference.covered();
        if covered != self.markers.len() {
            return Err(BuildError::SegmentCoverage {
                covered,
                markers: self.markers.len(),
            });
        }

        let pose = parent.pose();
        let body_points: Vec<Vector3<f64>> = spec
            .points
            .iter()
            .map(|p| spec.local_pose.transform_point(&(*p).into()).coords)
            .collect();
        for local in &body_points {
            let world = pose.transform_point(&(*local).into()).coords;
            let mut m = FluidMarker::at_rest(world, smoothing_length, marker);
            m.velocity = parent.point_velocity(&world);
            self.markers.push(m);
        }

        let range = self.reference.extend_last(body_points.len())?;
        self.shells.push(BoundaryShell {
            body,
            kind: spec.kind,
            geometry: spec.geometry,
            local_pose: spec.local_pose,
            range: range.clone(),
            body_points,
        });
        Ok(range)
    }

    /// All registered shells.
    pub fn shells(&self) -> &[BoundaryShell] {
        &self.shells
    }

    /// Move every BCE marker to its parent body's current pose and give
    /// it the rigid velocity of that point.
    pub fn sync_shells(&mut self) {
        for shell in &self.shells {
            let Some(body) = self.bodies.get(&shell.body) else {
                continue;
            };
            let pose = body.pose();
            for (idx, local) in shell.range.clone().zip(&shell.body_points) {
                let world = pose.transform_point(&(*local).into()).coords;
                let m = &mut self.markers[idx];
                m.set_position(world);
                m.velocity = body.point_velocity(&world);
            }
        }
    }

    /// Number of BCE markers attached to `body`.
    pub fn shell_marker_count(&self, body: BodyId) -> usize {
        self.shells
            .iter()
            .filter(|s| s.body == body)
            .map(BoundaryShell::len)
            .sum()
    }

    /// BCE marker count times marker mass for `body`.
    ///
    /// Reported for diagnostics only; the body's physical mass comes
    /// from its density and volume.
    pub fn fsi_mass(&self, body: BodyId, marker_mass: f64) -> f64 {
        self.shell_marker_count(body) as f64 * marker_mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::CollisionShape;
    use crate::reference::{Phase, Segment};
    use crate::shell::{ShellGeometry, SurfaceKind};
    use nalgebra::Isometry3;

    fn bce_state() -> MarkerState {
        MarkerState {
            density: 1000.0,
            pressure: 0.0,
            viscosity: 0.001,
            phase: Phase::Boundary,
        }
    }

    fn sphere_spec(points: Vec<Vector3<f64>>) -> ShellSpec {
        ShellSpec {
            kind: SurfaceKind::Sphere,
            geometry: ShellGeometry::Sphere { radius: 1.0 },
            local_pose: Isometry3::identity(),
            points,
        }
    }

    fn seeded_state() -> CoupledState {
        let mut state = CoupledState::new();
        state
            .reference_mut()
            .push(Segment {
                start: 0,
                end: 0,
                phase: Phase::Fluid,
                subtype: -1,
            })
            .unwrap();
        state
            .reference_mut()
            .push(Segment {
                start: 0,
                end: 0,
                phase: Phase::Boundary,
                subtype: 0,
            })
            .unwrap();
        state
    }

    #[test]
    fn body_ids_are_sequential() {
        let mut state = CoupledState::new();
        let a = state.add_rigid_body(RigidBody::fixed(CollisionShape::Compound(vec![])));
        let b = state.add_rigid_body(RigidBody::solid_sphere(0.1, 1000.0, Vector3::zeros()));
        assert_eq!((a, b), (BodyId(0), BodyId(1)));
        assert_eq!(state.body(b).map(|body| body.id), Some(b));
        assert_eq!(state.body_count(), 2);
    }

    #[test]
    fn unknown_fsi_body_rejected() {
        let mut state = CoupledState::new();
        match state.add_fsi_body(BodyId(7)) {
            Err(BuildError::UnknownBody { id: BodyId(7) }) => {}
            other => panic!("expected UnknownBody, got {other:?}"),
        }
    }

    #[test]
    fn shell_markers_follow_body() {
        let mut state = seeded_state();
        let id = state.add_rigid_body(RigidBody::solid_sphere(
            1.0,
            1.0,
            Vector3::new(0.0, 0.0, 5.0),
        ));
        let spec = sphere_spec(vec![Vector3::new(1.0, 0.0, 0.0)]);
        let range = state.add_boundary_shell(id, spec, bce_state(), 0.1).unwrap();
        assert_eq!(range, 0..1);
        assert_eq!(state.markers()[0].position(), Vector3::new(1.0, 0.0, 5.0));
        assert_eq!(state.reference().segments()[1].end, 1);

        let body = state.body_mut(id).unwrap();
        body.position.z = 4.0;
        body.linear_velocity = Vector3::new(0.0, 0.0, -2.0);
        state.sync_shells();
        assert_eq!(state.markers()[0].position(), Vector3::new(1.0, 0.0, 4.0));
        assert_eq!(state.markers()[0].velocity, Vector3::new(0.0, 0.0, -2.0));
        assert_eq!(state.markers()[0].smoothing_length(), 0.1);
    }

    #[test]
    fn shell_on_uncovered_markers_rejected() {
        let mut state = seeded_state();
        let id = state.add_rigid_body(RigidBody::fixed(CollisionShape::Compound(vec![])));
        state.add_marker(FluidMarker::at_rest(Vector3::zeros(), 0.1, bce_state()));
        match state.add_boundary_shell(id, sphere_spec(vec![]), bce_state(), 0.1) {
            Err(BuildError::SegmentCoverage {
                covered: 0,
                markers: 1,
            }) => {}
            other => panic!("expected SegmentCoverage, got {other:?}"),
        }
    }

    #[test]
    fn fsi_mass_counts_shell_markers() {
        let mut state = seeded_state();
        let id = state.add_rigid_body(RigidBody::solid_sphere(1.0, 1.0, Vector3::zeros()));
        let pts = vec![Vector3::x(), Vector3::y(), Vector3::z()];
        state
            .add_boundary_shell(id, sphere_spec(pts), bce_state(), 0.1)
            .unwrap();
        assert_eq!(state.shell_marker_count(id), 3);
        assert!((state.fsi_mass(id, 0.5) - 1.5).abs() < 1e-12);
    }
}
