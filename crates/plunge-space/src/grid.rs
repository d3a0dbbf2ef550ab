//! Uniform cell grid for fixed-radius neighbour queries.
//!
//! Points are binned into cubic cells no smaller than the query radius,
//! so every neighbour of a point lies in its own cell or one of the 26
//! adjacent cells. Storage is a compressed cell-to-index table rebuilt
//! from scratch on every [`CellGrid::rebuild`]; within a cell, indices
//! keep insertion order.

use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::domain::Aabb;
use crate::error::{check_spacing, SpaceError};

/// Upper bound on the number of cells a grid may allocate.
const MAX_CELLS: usize = 1 << 28;

/// Uniform grid over an [`Aabb`].
#[derive(Clone, Debug)]
pub struct CellGrid {
    origin: Vector3<f64>,
    cell_size: f64,
    dims: [usize; 3],
    /// `starts[c]..starts[c + 1]` indexes `entries` for cell `c`.
    starts: Vec<usize>,
    entries: Vec<usize>,
}

impl CellGrid {
    /// Empty grid covering `bounds` with cubic cells of edge `cell_size`.
    pub fn new(bounds: &Aabb, cell_size: f64) -> Result<Self, SpaceError> {
        let h = check_spacing(cell_size)?;
        let ext = bounds.extents();
        let mut dims = [0usize; 3];
        for (i, d) in dims.iter_mut().enumerate() {
            *d = ((ext[i].max(0.0) / h).ceil() as usize).max(1);
        }
        let total = dims[0]
            .checked_mul(dims[1])
            .and_then(|v| v.checked_mul(dims[2]))
            .filter(|&v| v <= MAX_CELLS)
            .ok_or(SpaceError::GridTooLarge { dims })?;
        Ok(Self {
            origin: bounds.min,
            cell_size: h,
            dims,
            starts: vec![0; total + 1],
            entries: Vec::new(),
        })
    }

    /// Cells along each axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Edge length of a cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no point is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Integer cell coordinates of `p`, clamped to the grid.
    pub fn cell_coords(&self, p: &Vector3<f64>) -> [usize; 3] {
        let mut c = [0usize; 3];
        for (i, ci) in c.iter_mut().enumerate() {
            let f = ((p[i] - self.origin[i]) / self.cell_size).floor();
            *ci = if f.is_nan() || f < 0.0 {
                0
            } else {
                (f as usize).min(self.dims[i] - 1)
            };
        }
        c
    }

    fn flat(&self, c: [usize; 3]) -> usize {
        (c[0] * self.dims[1] + c[1]) * self.dims[2] + c[2]
    }

    /// Replace the indexed set with `points`, each tagged with the
    /// caller's index.
    pub fn rebuild<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (usize, Vector3<f64>)>,
    {
        let binned: Vec<(usize, usize)> = points
            .into_iter()
            .map(|(idx, p)| (self.flat(self.cell_coords(&p)), idx))
            .collect();

        self.starts.iter_mut().for_each(|s| *s = 0);
        for &(cell, _) in &binned {
            self.starts[cell + 1] += 1;
        }
        for c in 1..self.starts.len() {
            self.starts[c] += self.starts[c - 1];
        }
        let mut cursor = self.starts.clone();
        self.entries.clear();
        self.entries.resize(binned.len(), 0);
        for (cell, idx) in binned {
            self.entries[cursor[cell]] = idx;
            cursor[cell] += 1;
        }
    }

    /// Flat ids of the cell containing `p` and its in-grid neighbours,
    /// in ascending order.
    pub fn neighbour_cells(&self, p: &Vector3<f64>) -> SmallVec<[usize; 27]> {
        let c = self.cell_coords(p);
        let range = |i: usize| c[i].saturating_sub(1)..=(c[i] + 1).min(self.dims[i] - 1);
        let mut out = SmallVec::new();
        for x in range(0) {
            for y in range(1) {
                for z in range(2) {
                    out.push(self.flat([x, y, z]));
                }
            }
        }
        out
    }

    /// Indices stored in cell `cell`.
    pub fn cell_entries(&self, cell: usize) -> &[usize] {
        &self.entries[self.starts[cell]..self.starts[cell + 1]]
    }

    /// Indices of every point within `radius` of `p`, using `position` to
    /// look up indexed points. `radius` must not exceed the cell size.
    ///
    /// Results are appended to `out` in cell order, then insertion order.
    pub fn query<F>(&self, p: &Vector3<f64>, radius: f64, position: F, out: &mut Vec<usize>)
    where
        F: Fn(usize) -> Vector3<f64>,
    {
        let r2 = radius * radius;
        for cell in self.neighbour_cells(p) {
            for &idx in self.cell_entries(cell) {
                if (position(idx) - p).norm_squared() <= r2 {
                    out.push(idx);
                }
            }
        }
    }
}
