//! FNV-1a hashing of marker and body state.
//!
//! Used for the snapshot checksum and for determinism checks between
//! runs. Not cryptographically secure.

use plunge_core::CoupledState;

use crate::types::{BodyRecord, MarkerRecord};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_u32(mut hash: u64, v: u32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_f64s(hash: u64, vs: &[f64]) -> u64 {
    vs.iter().fold(hash, |h, v| fnv1a_u64(h, v.to_bits()))
}

fn hash_marker(mut hash: u64, m: &MarkerRecord) -> u64 {
    hash = fnv1a_f64s(hash, &m.pos_rad);
    hash = fnv1a_f64s(hash, &m.velocity);
    hash = fnv1a_f64s(hash, &[m.density, m.pressure, m.viscosity]);
    hash = fnv1a_u32(hash, m.phase as u32);
    hash = fnv1a_f64s(hash, &m.tau_diag);
    fnv1a_f64s(hash, &m.tau_offdiag)
}

fn hash_body(mut hash: u64, b: &BodyRecord) -> u64 {
    hash = fnv1a_u32(hash, b.id);
    hash = fnv1a_f64s(hash, &b.position);
    hash = fnv1a_f64s(hash, &b.orientation);
    hash = fnv1a_f64s(hash, &b.linear_velocity);
    fnv1a_f64s(hash, &b.angular_velocity)
}

/// Hash of a marker sequence, order-sensitive.
///
/// Returns `FNV_OFFSET` for an empty slice.
pub fn markers_hash(markers: &[MarkerRecord]) -> u64 {
    markers.iter().fold(FNV_OFFSET, hash_marker)
}

/// Hash of every marker followed by every body of `state`.
pub fn state_hash(state: &CoupledState) -> u64 {
    let hash = state
        .markers()
        .iter()
        .fold(FNV_OFFSET, |h, m| hash_marker(h, &MarkerRecord::from(m)));
    let hash = fnv1a_u64(hash, state.body_count() as u64);
    state
        .bodies()
        .fold(hash, |h, b| hash_body(h, &BodyRecord::from(b)))
}
