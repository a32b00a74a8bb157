//! Sorting particles into the bins of a [`CellGeometry`] grid.
//!
//! Each bin holds a singly linked list of particle indices: `seed` points to
//! the first particle of the bin, `next[i]` to the particle after `i` in the
//! same bin. The sentinel for "no particle" is [`PairIndex::NONE`]; `0` is a
//! valid particle index. Particles keep their input order inside a bin.

use ndarray::Array3;

use crate::{CellGeometry, Error, PairIndex, Scalar, Vector3D};

/// Linked-list view of the particles sorted into bins.
#[derive(Debug)]
pub struct LinkedBins<I: PairIndex> {
    /// First particle of each bin, or `NONE` for an empty bin
    seed: Array3<I>,
    /// Next particle in the same bin, or `NONE` at the end of a list
    next: Vec<I>,
}

impl<I: PairIndex> LinkedBins<I> {
    /// Sort `positions` into the bins of `geometry`.
    ///
    /// Particles outside the primary cell are assigned to the bin of their
    /// wrapped image on periodic axes, and to the closest boundary bin on
    /// open axes.
    pub fn new<T: Scalar>(
        geometry: &CellGeometry<T>,
        positions: &[Vector3D<T>],
    ) -> Result<LinkedBins<I>, Error> {
        let [n1, n2, n3] = geometry.n_bins();

        // the checks below use widened arithmetic: the grid dimensions can
        // multiply past both the index type and the address space well before
        // any allocation would fail cleanly
        let total = geometry.total_bins();
        if total > I::max_value_widened() || total > isize::MAX as i128 {
            return Err(Error::BinGridTooLarge(format!(
                "the bin grid is {} x {} x {} = {} bins, more than the index \
                 type can address ({}); use a wider index type, a larger \
                 cutoff, or a smaller cell",
                n1, n2, n3, total, I::max_value_widened(),
            )));
        }

        if I::from_usize(positions.len()).is_none() {
            return Err(Error::BinGridTooLarge(format!(
                "{} particles do not fit the index type (max {}); use a wider \
                 index type",
                positions.len(), I::max_value_widened(),
            )));
        }

        let shape = (n1 as usize, n2 as usize, n3 as usize);
        let mut seed = none_array(shape, total as usize)?;
        let mut last = none_array::<I>(shape, total as usize)?;

        let mut next = Vec::new();
        next.try_reserve_exact(positions.len())?;
        next.resize(positions.len(), I::NONE);

        for (index, &position) in positions.iter().enumerate() {
            let bin = geometry.storage_bin(geometry.bin_of(position));
            let bin = [bin[0] as usize, bin[1] as usize, bin[2] as usize];
            let index = I::from_usize(index).expect("particle count already checked");

            if last[bin].is_none() {
                seed[bin] = index;
            } else {
                next[last[bin].to_usize()] = index;
            }
            last[bin] = index;
        }

        Ok(LinkedBins {
            seed: seed,
            next: next,
        })
    }

    /// Iterate over the particles of the bin at (in-range) coordinates `bin`,
    /// in input order.
    pub fn particles(&self, bin: [i64; 3]) -> BinParticles<'_, I> {
        BinParticles {
            next: &self.next,
            current: self.seed[[bin[0] as usize, bin[1] as usize, bin[2] as usize]],
        }
    }
}

/// Allocate a `NONE`-filled bin array, reporting allocation failure as an
/// error instead of aborting.
fn none_array<I: PairIndex>(
    shape: (usize, usize, usize),
    count: usize,
) -> Result<Array3<I>, Error> {
    let mut data = Vec::new();
    data.try_reserve_exact(count)?;
    data.resize(count, I::NONE);
    Ok(Array3::from_shape_vec(shape, data).expect("bin array shape mismatch"))
}

/// Iterator over the particle indices stored in one bin.
pub struct BinParticles<'a, I: PairIndex> {
    next: &'a [I],
    current: I,
}

impl<'a, I: PairIndex> Iterator for BinParticles<'a, I> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.current.is_none() {
            return None;
        }
        let index = self.current.to_usize();
        self.current = self.next[index];
        Some(index)
    }
}
