//! Binary encode/decode for the snapshot format.
//!
//! All integers and floats are little-endian. Every list is prefixed by
//! its element count. There is no compression and no alignment padding.

use std::io::{Read, Write};

use crate::error::OutputError;
use crate::hash::markers_hash;
use crate::types::{BodyRecord, MarkerRecord, SegmentRecord, ShellRecord, Snapshot};
use crate::{FORMAT_VERSION, MAGIC};

/// Largest list length accepted while decoding. Guards allocations
/// against corrupt headers.
const MAX_RECORDS: u64 = 1 << 32;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), OutputError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), OutputError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), OutputError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
pub fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), OutputError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), OutputError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a fixed-size run of little-endian f64 values.
pub fn write_f64s_le(w: &mut dyn Write, vs: &[f64]) -> Result<(), OutputError> {
    for &v in vs {
        write_f64_le(w, v)?;
    }
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, OutputError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, OutputError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, OutputError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian i32.
pub fn read_i32_le(r: &mut dyn Read) -> Result<i32, OutputError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, OutputError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read `N` little-endian f64 values.
pub fn read_f64_array<const N: usize>(r: &mut dyn Read) -> Result<[f64; N], OutputError> {
    let mut out = [0.0; N];
    for v in &mut out {
        *v = read_f64_le(r)?;
    }
    Ok(out)
}

fn read_count(r: &mut dyn Read, what: &str, wide: bool) -> Result<usize, OutputError> {
    let n = if wide {
        read_u64_le(r)?
    } else {
        read_u32_le(r)? as u64
    };
    if n > MAX_RECORDS {
        return Err(OutputError::Malformed {
            detail: format!("{what} count {n} exceeds limit"),
        });
    }
    usize::try_from(n).map_err(|_| OutputError::Malformed {
        detail: format!("{what} count {n} does not fit in memory"),
    })
}

// ── Record encode/decode ────────────────────────────────────────

fn encode_marker(w: &mut dyn Write, m: &MarkerRecord) -> Result<(), OutputError> {
    write_f64s_le(w, &m.pos_rad)?;
    write_f64s_le(w, &m.velocity)?;
    write_f64s_le(w, &[m.density, m.pressure, m.viscosity])?;
    write_i32_le(w, m.phase)?;
    write_f64s_le(w, &m.tau_diag)?;
    write_f64s_le(w, &m.tau_offdiag)
}

fn decode_marker(r: &mut dyn Read) -> Result<MarkerRecord, OutputError> {
    let pos_rad = read_f64_array::<4>(r)?;
    let velocity = read_f64_array::<3>(r)?;
    let [density, pressure, viscosity] = read_f64_array::<3>(r)?;
    Ok(MarkerRecord {
        pos_rad,
        velocity,
        density,
        pressure,
        viscosity,
        phase: read_i32_le(r)?,
        tau_diag: read_f64_array(r)?,
        tau_offdiag: read_f64_array(r)?,
    })
}

fn encode_body(w: &mut dyn Write, b: &BodyRecord) -> Result<(), OutputError> {
    write_u32_le(w, b.id)?;
    write_f64s_le(w, &b.position)?;
    write_f64s_le(w, &b.orientation)?;
    write_f64s_le(w, &b.linear_velocity)?;
    write_f64s_le(w, &b.angular_velocity)
}

fn decode_body(r: &mut dyn Read) -> Result<BodyRecord, OutputError> {
    Ok(BodyRecord {
        id: read_u32_le(r)?,
        position: read_f64_array(r)?,
        orientation: read_f64_array(r)?,
        linear_velocity: read_f64_array(r)?,
        angular_velocity: read_f64_array(r)?,
    })
}

// ── Snapshot encode/decode ──────────────────────────────────────

/// Encode a complete snapshot, including header and checksum.
pub fn encode_snapshot(w: &mut dyn Write, snap: &Snapshot) -> Result<(), OutputError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u64_le(w, snap.frame)?;
    write_f64_le(w, snap.time)?;
    write_u64_le(w, snap.markers.len() as u64)?;

    write_u32_le(w, snap.segments.len() as u32)?;
    for s in &snap.segments {
        write_u64_le(w, s.start)?;
        write_u64_le(w, s.end)?;
        write_i32_le(w, s.phase)?;
        write_i32_le(w, s.subtype)?;
    }

    for m in &snap.markers {
        encode_marker(w, m)?;
    }

    write_u32_le(w, snap.bodies.len() as u32)?;
    for b in &snap.bodies {
        encode_body(w, b)?;
    }

    write_u32_le(w, snap.shells.len() as u32)?;
    for s in &snap.shells {
        write_u32_le(w, s.body)?;
        write_i32_le(w, s.subtype)?;
        write_u64_le(w, s.start)?;
        write_u64_le(w, s.end)?;
    }

    write_u64_le(w, markers_hash(&snap.markers))
}

/// Decode and verify a snapshot.
///
/// Fails on wrong magic, unknown version, truncation, or a checksum that
/// does not match the decoded markers.
pub fn decode_snapshot(r: &mut dyn Read) -> Result<Snapshot, OutputError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(OutputError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(OutputError::UnsupportedVersion { found: version });
    }

    let frame = read_u64_le(r)?;
    let time = read_f64_le(r)?;
    let marker_count = read_count(r, "marker", true)?;

    let segment_count = read_count(r, "segment", false)?;
    let mut segments = Vec::with_capacity(segment_count.min(64));
    for _ in 0..segment_count {
        segments.push(SegmentRecord {
            start: read_u64_le(r)?,
            end: read_u64_le(r)?,
            phase: read_i32_le(r)?,
            subtype: read_i32_le(r)?,
        });
    }

    let mut markers = Vec::with_capacity(marker_count.min(1 << 20));
    for _ in 0..marker_count {
        markers.push(decode_marker(r)?);
    }

    let body_count = read_count(r, "body", false)?;
    let mut bodies = Vec::with_capacity(body_count.min(64));
    for _ in 0..body_count {
        bodies.push(decode_body(r)?);
    }

    let shell_count = read_count(r, "shell", false)?;
    let mut shells = Vec::with_capacity(shell_count.min(64));
    for _ in 0..shell_count {
        shells.push(ShellRecord {
            body: read_u32_le(r)?,
            subtype: read_i32_le(r)?,
            start: read_u64_le(r)?,
            end: read_u64_le(r)?,
        });
    }

    let recorded = read_u64_le(r)?;
    let computed = markers_hash(&markers);
    if recorded != computed {
        return Err(OutputError::ChecksumMismatch {
            frame,
            recorded,
            computed,
        });
    }

    Ok(Snapshot {
        frame,
        time,
        segments,
        markers,
        bodies,
        shells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            frame: 7,
            time: 0.07,
            segments: vec![
                SegmentRecord {
                    start: 0,
                    end: 2,
                    phase: -1,
                    subtype: -1,
                },
                SegmentRecord {
                    start: 2,
                    end: 3,
                    phase: 0,
                    subtype: 0,
                },
            ],
            markers: (0..3)
                .map(|i| MarkerRecord {
                    pos_rad: [i as f64, 0.5, -0.25, 0.02],
                    velocity: [0.0, 0.0, -1.0],
                    density: 1700.0 + i as f64,
                    pressure: 10.0 * i as f64,
                    viscosity: 0.1,
                    phase: if i < 2 { -1 } else { 0 },
                    tau_diag: [1.0, 2.0, 3.0],
                    tau_offdiag: [4.0, 5.0, 6.0],
                })
                .collect(),
            bodies: vec![BodyRecord {
                id: 1,
                position: [0.0, 0.0, 0.6],
                orientation: [1.0, 0.0, 0.0, 0.0],
                linear_velocity: [0.0, 0.0, -1.98],
                angular_velocity: [0.0; 3],
            }],
            shells: vec![ShellRecord {
                body: 1,
                subtype: 3,
                start: 2,
                end: 3,
            }],
        }
    }

    #[test]
    fn snapshot_survives_encode_decode() {
        let snap = sample();
        let mut buf = Vec::new();
        encode_snapshot(&mut buf, &snap).unwrap();
        let back = decode_snapshot(&mut buf.as_slice()).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn wrong_magic_rejected() {
        let mut buf = Vec::new();
        encode_snapshot(&mut buf, &sample()).unwrap();
        buf[0] = b'X';
        match decode_snapshot(&mut buf.as_slice()) {
            Err(OutputError::InvalidMagic) => {}
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn future_version_rejected() {
        let mut buf = Vec::new();
        encode_snapshot(&mut buf, &sample()).unwrap();
        buf[4] = FORMAT_VERSION + 1;
        match decode_snapshot(&mut buf.as_slice()) {
            Err(OutputError::UnsupportedVersion { found }) => {
                assert_eq!(found, FORMAT_VERSION + 1)
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn corrupted_marker_fails_checksum() {
        let mut buf = Vec::new();
        encode_snapshot(&mut buf, &sample()).unwrap();
        // First marker's x coordinate: after magic, version, frame, time,
        // marker count, segment count and two 24-byte segments.
        let offset = 4 + 1 + 8 + 8 + 8 + 4 + 2 * 24;
        buf[offset + 7] ^= 0x01;
        match decode_snapshot(&mut buf.as_slice()) {
            Err(OutputError::ChecksumMismatch { frame: 7, .. }) => {}
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn truncated_snapshot_is_io_error() {
        let mut buf = Vec::new();
        encode_snapshot(&mut buf, &sample()).unwrap();
        buf.truncate(buf.len() - 3);
        match decode_snapshot(&mut buf.as_slice()) {
            Err(OutputError::Io(_)) => {}
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
