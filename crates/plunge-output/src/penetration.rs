//! Penetration-depth time series.
//!
//! One tab-separated row per iteration:
//! `time  depth  pos_x  pos_y  pos_z  vel_x  vel_y  vel_z`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Vector3;
use plunge_core::RigidBody;

use crate::error::OutputError;

/// One row of the penetration log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PenetrationRecord {
    /// Simulation time.
    pub time: f64,
    /// Depth of the sphere below its resting reference height.
    pub depth: f64,
    /// Sphere centre.
    pub position: Vector3<f64>,
    /// Sphere velocity.
    pub velocity: Vector3<f64>,
}

impl PenetrationRecord {
    /// Row for `body` at `time`, measured against `reference_height`
    /// (the centre height of a sphere just touching the bed).
    pub fn from_body(time: f64, reference_height: f64, body: &RigidBody) -> Self {
        Self {
            time,
            depth: reference_height - body.position.z,
            position: body.position,
            velocity: body.linear_velocity,
        }
    }

    /// Parse a row written by [`PenetrationLog::append`].
    pub fn parse(line: &str) -> Result<Self, OutputError> {
        let values = line
            .split('\t')
            .map(|f| {
                f.trim().parse::<f64>().map_err(|e| OutputError::Malformed {
                    detail: format!("bad penetration field '{f}': {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() != 8 {
            return Err(OutputError::Malformed {
                detail: format!("penetration row has {} fields, expected 8", values.len()),
            });
        }
        Ok(Self {
            time: values[0],
            depth: values[1],
            position: Vector3::new(values[2], values[3], values[4]),
            velocity: Vector3::new(values[5], values[6], values[7]),
        })
    }
}

/// Append-only writer for penetration rows.
#[derive(Debug)]
pub struct PenetrationLog<W: Write> {
    writer: W,
    rows: u64,
}

impl PenetrationLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> PenetrationLog<W> {
    /// Log writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, rows: 0 }
    }

    /// Append one row.
    pub fn append(&mut self, rec: &PenetrationRecord) -> Result<(), OutputError> {
        let p = rec.position;
        let v = rec.velocity;
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            rec.time, rec.depth, p.x, p.y, p.z, v.x, v.y, v.z
        )?;
        self.rows += 1;
        Ok(())
    }

    /// Flush buffered rows.
    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the log and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(t: f64) -> PenetrationRecord {
        PenetrationRecord {
            time: t,
            depth: 0.001,
            position: Vector3::new(0.0, 0.0, 0.56),
            velocity: Vector3::new(0.0, 0.0, -1.98),
        }
    }

    #[test]
    fn rows_parse_back() {
        let mut log = PenetrationLog::new(Vec::new());
        log.append(&rec(0.0)).unwrap();
        log.append(&rec(0.5)).unwrap();
        assert_eq!(log.rows(), 2);
        let text = String::from_utf8(log.into_inner()).unwrap();
        let rows: Vec<_> = text.lines().map(|l| PenetrationRecord::parse(l).unwrap()).collect();
        assert_eq!(rows, vec![rec(0.0), rec(0.5)]);
    }

    #[test]
    fn depth_measured_from_reference_height() {
        let mut body = RigidBody::solid_sphere(0.05, 2500.0, Vector3::new(0.0, 0.0, 0.55));
        body.linear_velocity.z = -1.0;
        let r = PenetrationRecord::from_body(0.1, 0.562, &body);
        assert!((r.depth - 0.012).abs() < 1e-12);
        assert_eq!(r.velocity.z, -1.0);
    }

    #[test]
    fn short_row_rejected() {
        match PenetrationRecord::parse("0\t1\t2") {
            Err(OutputError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn create_truncates_existing_file() {
        let path = std::env::temp_dir().join(format!("plunge-pen-{}.txt", std::process::id()));
        std::fs::write(&path, "stale\n").unwrap();
        let mut log = PenetrationLog::create(&path).unwrap();
        log.append(&rec(0.0)).unwrap();
        log.flush().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.contains("stale"));
        std::fs::remove_file(&path).unwrap();
    }
}
