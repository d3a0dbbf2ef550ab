//! Rigid bodies exchanged between the multibody side and the coupling layer.

use std::f64::consts::PI;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::id::BodyId;

/// Whether the integrator moves the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Never integrated. Its BCE markers still exert forces on the fluid.
    Fixed,
    /// Free body integrated every step.
    Dynamic,
}

/// Contact material of a body surface (smooth-contact model).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMaterial {
    /// Young's modulus (Pa).
    pub young_modulus: f64,
    /// Coulomb friction coefficient.
    pub friction: f64,
    /// Coefficient of restitution.
    pub restitution: f64,
    /// Adhesion force (N).
    pub adhesion: f64,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            young_modulus: 1.0e8,
            friction: 0.2,
            restitution: 0.05,
            adhesion: 0.0,
        }
    }
}

/// An axis-aligned box in body coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionBox {
    /// Half-lengths along each body axis.
    pub half_extents: Vector3<f64>,
    /// Centre of the box in body coordinates.
    pub offset: Vector3<f64>,
}

/// Collision geometry of a body.
#[derive(Clone, Debug, PartialEq)]
pub enum CollisionShape {
    /// Union of boxes (the container walls).
    Compound(Vec<CollisionBox>),
    /// A sphere centred on the body origin.
    Sphere {
        /// Sphere radius.
        radius: f64,
    },
}

/// A rigid body and its kinematic state.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    /// Identifier assigned at registration.
    pub id: BodyId,
    /// Fixed or dynamic.
    pub kind: BodyKind,
    /// Centre of mass in world coordinates.
    pub position: Vector3<f64>,
    /// Orientation in world coordinates.
    pub orientation: UnitQuaternion<f64>,
    /// Linear velocity of the centre of mass.
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity in world coordinates.
    pub angular_velocity: Vector3<f64>,
    /// Mass (kg). Zero for fixed bodies.
    pub mass: f64,
    /// Principal moments of inertia (kg·m²).
    pub inertia: Vector3<f64>,
    /// Collision geometry.
    pub shape: CollisionShape,
    /// Contact material.
    pub material: SurfaceMaterial,
    /// Whether the body takes part in rigid-rigid collision detection.
    pub collide: bool,
    /// Collision envelope added around the shape.
    pub safe_margin: f64,
}

impl RigidBody {
    /// A fixed body at the origin with identity orientation.
    ///
    /// The id is a placeholder until
    /// [`CoupledState::add_rigid_body`](crate::CoupledState::add_rigid_body)
    /// assigns the real one.
    pub fn fixed(shape: CollisionShape) -> Self {
        Self {
            id: BodyId(u32::MAX),
            kind: BodyKind::Fixed,
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass: 0.0,
            inertia: Vector3::zeros(),
            shape,
            material: SurfaceMaterial::default(),
            collide: false,
            safe_margin: 0.0,
        }
    }

    /// A free solid sphere with mass and inertia derived from its density.
    pub fn solid_sphere(radius: f64, density: f64, position: Vector3<f64>) -> Self {
        let mass = density * sphere_volume(radius);
        Self {
            id: BodyId(u32::MAX),
            kind: BodyKind::Dynamic,
            position,
            orientation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass,
            inertia: sphere_gyration(radius) * mass,
            shape: CollisionShape::Sphere { radius },
            material: SurfaceMaterial::default(),
            collide: true,
            safe_margin: 0.0,
        }
    }

    /// Whether the integrator moves this body.
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Body-to-world transform.
    pub fn pose(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }

    /// Velocity of a world-space point rigidly attached to the body.
    pub fn point_velocity(&self, world_point: &Vector3<f64>) -> Vector3<f64> {
        self.linear_velocity + self.angular_velocity.cross(&(world_point - self.position))
    }

    /// Whether pose and velocities are all finite.
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite())
            && self.linear_velocity.iter().all(|v| v.is_finite())
            && self.angular_velocity.iter().all(|v| v.is_finite())
    }
}

/// Volume of a sphere of radius `r`.
pub fn sphere_volume(r: f64) -> f64 {
    4.0 / 3.0 * PI * r.powi(3)
}

/// Squared radii of gyration of a solid sphere (diagonal of `I / m`).
pub fn sphere_gyration(r: f64) -> Vector3<f64> {
    Vector3::repeat(0.4 * r * r)
}
