//! Geometry of the simulation cell and of the bin grid derived from it.
//!
//! The cell matrix stores the lattice vectors as rows; fractional coordinates
//! of a point `x` are `(cellᵀ)⁻¹ · x`. Everything here is computed once per
//! build and immutable afterwards.

use crate::{Error, Matrix3, Scalar, Vector3D};

/// Cells with `|det|` below this are rejected as degenerate
const VOLUME_EPSILON: f64 = 1e-12;

/// Derived view of a simulation cell: inverse matrix, face distances, bin
/// counts, search shell extents and the shape of a single bin.
///
/// Bin indices are 0-based. Raw indices from [`CellGeometry::bin_of`] may lie
/// outside `[0, n_k)` when a particle sits outside the primary cell; the
/// wrapping and truncation policies below bring them back in range.
#[derive(Debug, Clone)]
pub struct CellGeometry<T: Scalar> {
    /// Cell matrix, rows are the lattice vectors
    cell: Matrix3<T>,
    /// Inverse of the transpose of the cell matrix, maps world coordinates to
    /// fractional ones
    inverse: Matrix3<T>,
    /// Periodicity along each lattice direction
    pbc: [bool; 3],
    cutoff: T,
    /// Number of bins along each lattice direction
    n_bins: [i64; 3],
    /// How many bins to scan in each direction so that all neighbors below
    /// the cutoff are found
    n_search: [i64; 3],
    /// Edges of a single bin: `lattice vector k / n_bins[k]`
    bin_vectors: [Vector3D<T>; 3],
}

impl<T: Scalar> CellGeometry<T> {
    /// Validate the cell and derive the bin grid for the given `cutoff`.
    pub fn new(cell: Matrix3<T>, pbc: [bool; 3], cutoff: T) -> Result<CellGeometry<T>, Error> {
        if !(cutoff.is_finite() && cutoff > T::ZERO) {
            return Err(Error::InvalidCutoff(format!(
                "cutoff must be a positive finite number, got {}", cutoff
            )));
        }

        let determinant = cell.determinant().to_f64();
        if determinant.abs() < VOLUME_EPSILON {
            return Err(Error::ZeroVolume(format!(
                "cell matrix determinant is {:e}, the cell does not enclose a volume",
                determinant
            )));
        }

        let distances = face_distances(&cell);
        let cutoff_f64 = cutoff.to_f64();

        let mut n_bins = [0_i64; 3];
        let mut n_search = [0_i64; 3];
        for k in 0..3 {
            n_bins[k] = i64::max(1, (distances[k] / cutoff_f64).floor() as i64);
            n_search[k] = (cutoff_f64 * n_bins[k] as f64 / distances[k]).ceil() as i64;
        }

        let bin_vectors = [
            cell.row(0) / T::from_f64(n_bins[0] as f64),
            cell.row(1) / T::from_f64(n_bins[1] as f64),
            cell.row(2) / T::from_f64(n_bins[2] as f64),
        ];

        Ok(CellGeometry {
            cell: cell,
            inverse: cell.transposed().inverse(),
            pbc: pbc,
            cutoff: cutoff,
            n_bins: n_bins,
            n_search: n_search,
            bin_vectors: bin_vectors,
        })
    }

    /// Get the cell matrix (rows are the lattice vectors)
    pub fn cell(&self) -> Matrix3<T> {
        self.cell
    }

    /// Get the periodicity flags
    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    /// Get the cutoff this geometry was built for
    pub fn cutoff(&self) -> T {
        self.cutoff
    }

    /// Get the unsigned cell volume
    pub fn volume(&self) -> T {
        self.cell.determinant().abs()
    }

    /// Get the number of bins along each lattice direction
    pub fn n_bins(&self) -> [i64; 3] {
        self.n_bins
    }

    /// Get the search shell extent along each lattice direction
    pub fn n_search(&self) -> [i64; 3] {
        self.n_search
    }

    /// Total number of bins, widened so callers can check it against their
    /// index type before allocating
    pub fn total_bins(&self) -> i128 {
        self.n_bins[0] as i128 * self.n_bins[1] as i128 * self.n_bins[2] as i128
    }

    /// Get the fractional representation of `vector` in this cell
    pub fn fractional(&self, vector: Vector3D<T>) -> Vector3D<T> {
        self.inverse * vector
    }

    /// Raw bin index of a world position; components can lie outside
    /// `[0, n_k)` when the position is outside the primary cell.
    pub fn bin_of(&self, position: Vector3D<T>) -> [i64; 3] {
        let fractional = self.fractional(position);
        let mut bin = [0_i64; 3];
        for k in 0..3 {
            bin[k] = (fractional[k] * T::from_f64(self.n_bins[k] as f64)).floor().to_f64() as i64;
        }
        bin
    }

    /// In-range bin which stores a particle with raw index `bin`: wrapped on
    /// periodic axes, clamped on open ones.
    pub fn storage_bin(&self, bin: [i64; 3]) -> [i64; 3] {
        let mut result = [0_i64; 3];
        for k in 0..3 {
            result[k] = if self.pbc[k] {
                bin_wrap(bin[k], self.n_bins[k])
            } else {
                bin_trunc(bin[k], self.n_bins[k])
            };
        }
        result
    }

    /// Reference bin for bin-relative coordinates: the raw index on periodic
    /// axes (keeping the particle within one bin of its origin), clamped on
    /// open axes.
    pub fn home_bin(&self, bin: [i64; 3]) -> [i64; 3] {
        let mut result = [0_i64; 3];
        for k in 0..3 {
            result[k] = if self.pbc[k] {
                bin[k]
            } else {
                bin_trunc(bin[k], self.n_bins[k])
            };
        }
        result
    }

    /// Cartesian position of the lower corner of bin `bin`. Also usable with
    /// a bin *offset* to get the cartesian shift between two bins.
    pub fn bin_origin(&self, bin: [i64; 3]) -> Vector3D<T> {
        self.bin_vectors[0] * T::from_f64(bin[0] as f64)
            + self.bin_vectors[1] * T::from_f64(bin[1] as f64)
            + self.bin_vectors[2] * T::from_f64(bin[2] as f64)
    }

    /// Cartesian lattice translation for an integer shift vector
    pub fn cartesian_shift(&self, shift: [i32; 3]) -> Vector3D<T> {
        self.cell.row(0) * T::from_f64(shift[0] as f64)
            + self.cell.row(1) * T::from_f64(shift[1] as f64)
            + self.cell.row(2) * T::from_f64(shift[2] as f64)
    }
}

/// Perpendicular distances between opposing faces of the cell
fn face_distances<T: Scalar>(cell: &Matrix3<T>) -> [f64; 3] {
    let volume = cell.determinant().to_f64().abs();
    let (a, b, c) = (cell.row(0), cell.row(1), cell.row(2));
    [
        volume / (b ^ c).norm().to_f64(),
        volume / (c ^ a).norm().to_f64(),
        volume / (a ^ b).norm().to_f64(),
    ]
}

/// Reduce an out-of-range bin index modulo the bin count
#[inline]
pub(crate) fn bin_wrap(bin: i64, n_bins: i64) -> i64 {
    bin.rem_euclid(n_bins)
}

/// Clamp an out-of-range bin index to the closest valid bin
#[inline]
pub(crate) fn bin_trunc(bin: i64, n_bins: i64) -> i64 {
    bin.clamp(0, n_bins - 1)
}
