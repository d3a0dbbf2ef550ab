//! BCE marker layers on solid surfaces.
//!
//! Both generators return points in shell coordinates: the box centre
//! for walls, the sphere centre for spheres. Placing them in the world
//! is the caller's job.

use std::f64::consts::PI;

use nalgebra::Vector3;
use plunge_core::Facing;

use crate::error::{check_extent, check_spacing, SpaceError};

/// Marker layers on one face of a box.
///
/// The face is the one normal to `axis` on the `facing` side. Its two
/// in-plane axes are split into `⌈half/spacing⌉` cells per half-length,
/// with markers on every cell corner. Layer `k` sits `k·spacing` inside
/// the face.
pub fn box_shell(
    half_extents: &Vector3<f64>,
    axis: usize,
    facing: Facing,
    layers: u32,
    spacing: f64,
) -> Result<Vec<Vector3<f64>>, SpaceError> {
    let s = check_spacing(spacing)?;
    for i in 0..3 {
        check_extent("wall half-extent", half_extents[i])?;
    }
    if layers == 0 {
        return Err(SpaceError::NoLayers);
    }
    let (u, v) = in_plane_axes(axis);
    let us = face_coords(half_extents[u], s);
    let vs = face_coords(half_extents[v], s);
    let face = facing.sign() * half_extents[axis];

    let mut points = Vec::with_capacity(layers as usize * us.len() * vs.len());
    for k in 0..layers {
        let depth = face - facing.sign() * k as f64 * s;
        for &a in &us {
            for &b in &vs {
                let mut p = Vector3::zeros();
                p[axis] = depth;
                p[u] = a;
                p[v] = b;
                points.push(p);
            }
        }
    }
    Ok(points)
}

/// Concentric marker layers inside a sphere surface.
///
/// Layer `k` has radius `radius - k·spacing`. Each layer is covered by
/// polar rings spaced roughly `spacing` apart, and each ring by markers
/// spaced roughly `spacing` apart. A layer whose radius drops below
/// `spacing/2` becomes a single marker at the centre and ends the shell.
pub fn sphere_shell(
    radius: f64,
    layers: u32,
    spacing: f64,
) -> Result<Vec<Vector3<f64>>, SpaceError> {
    let s = check_spacing(spacing)?;
    check_extent("sphere radius", radius)?;
    if layers == 0 {
        return Err(SpaceError::NoLayers);
    }
    let mut points = Vec::new();
    for k in 0..layers {
        let rho = radius - k as f64 * s;
        if rho < s / 2.0 {
            points.push(Vector3::zeros());
            break;
        }
        let n_theta = ((PI * rho / s).round() as usize).max(1);
        for i in 0..n_theta {
            let theta = (i as f64 + 0.5) * PI / n_theta as f64;
            let (sin_t, cos_t) = theta.sin_cos();
            let n_phi = ((2.0 * PI * rho * sin_t / s).round() as usize).max(1);
            for j in 0..n_phi {
                let phi = 2.0 * PI * j as f64 / n_phi as f64;
                let (sin_p, cos_p) = phi.sin_cos();
                points.push(Vector3::new(
                    rho * sin_t * cos_p,
                    rho * sin_t * sin_p,
                    rho * cos_t,
                ));
            }
        }
    }
    Ok(points)
}

fn in_plane_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// `2n + 1` evenly spaced coordinates covering `[-half, half]`.
fn face_coords(half: f64, s: f64) -> Vec<f64> {
    let n = ((half / s).ceil() as usize).max(1);
    let pitch = half / n as f64;
    (0..=2 * n).map(|j| -half + j as f64 * pitch).collect()
}
