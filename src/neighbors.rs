//! Construction of the pair list from binned particles.
//!
//! The builder walks, for every particle, the shell of bins around the
//! particle's own bin and emits one record per neighbor image closer than the
//! cutoff. All distances are computed from bin-relative coordinates: the
//! displacement between two particles is assembled from their positions
//! relative to their bin corners plus the exact cartesian offset between the
//! bins. This keeps full precision when particles lie far from the origin and
//! makes the integer cell shift exact.

use log::warn;

use crate::cell::bin_wrap;
use crate::{CellGeometry, Error, LinkedBins, Matrix3, PairIndex, Scalar, Vector3D};

/// A single neighbor pair. The displacement `vector` points from `first` to
/// `second` and includes the periodic shift:
/// `vector == positions[second] + shift · cell - positions[first]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair<T: Scalar> {
    /// index of the first particle in the pair
    pub first: usize,
    /// index of the second particle in the pair
    pub second: usize,
    /// distance between the two particles
    pub distance: T,
    /// vector from the first to the second particle
    pub vector: Vector3D<T>,
    /// how many cell shifts were applied to the second particle
    pub shift: [i32; 3],
}

/// Neighbors of a single site, as slices into the pair list.
#[derive(Debug, Clone, Copy)]
pub struct SiteNeighbors<'a, T: Scalar, I: PairIndex> {
    /// the site these neighbors belong to
    pub site: usize,
    /// indices of the neighbors
    pub second: &'a [I],
    /// distances to the neighbors
    pub distance: &'a [T],
    /// displacement vectors from the site to each neighbor
    pub vector: &'a [Vector3D<T>],
}

impl<'a, T: Scalar, I: PairIndex> SiteNeighbors<'a, T, I> {
    /// Number of neighbors of this site
    pub fn len(&self) -> usize {
        self.second.len()
    }

    /// Does this site have any neighbor?
    pub fn is_empty(&self) -> bool {
        self.second.is_empty()
    }
}

/// A full, ordered neighbor list: every pair below the cutoff appears in both
/// orientations, and periodic self images (`first == second` with a non-zero
/// shift) are included.
///
/// The list is stored as parallel arrays. When built sorted (the default),
/// records are grouped by `first` with `second` nondecreasing inside a group,
/// and [`PairList::site`] gives O(1) access to the neighbors of a site.
#[derive(Debug, Clone)]
pub struct PairList<T: Scalar, I: PairIndex> {
    cutoff: T,
    n_sites: usize,
    /// index of the first particle of each pair
    pub first: Vec<I>,
    /// index of the second particle of each pair
    pub second: Vec<I>,
    /// distance between the particles of each pair
    pub distance: Vec<T>,
    /// displacement vector of each pair
    pub vector: Vec<Vector3D<T>>,
    /// integer cell shift of each pair
    pub shift: Vec<[i32; 3]>,
    /// when sorted, `first_of_site[i]..first_of_site[i + 1]` is the range of
    /// records with `first == i`
    first_of_site: Option<Vec<usize>>,
}

/// Record used during construction, before the split into parallel arrays
struct PairRecord<T: Scalar> {
    first: usize,
    second: usize,
    distance: T,
    vector: Vector3D<T>,
    shift: [i32; 3],
}

/// Initial pair capacity per particle, a heuristic for dense 3D structures
const PAIRS_PER_PARTICLE_HINT: usize = 6;

impl<T: Scalar, I: PairIndex> PairList<T, I> {
    /// Build a sorted pair list for `positions` in the given cell.
    ///
    /// The rows of `cell` are the lattice vectors; `pbc` enables periodicity
    /// along each of them independently. Positions may lie outside the
    /// primary cell. Each distinct `(first, second, shift)` triple below the
    /// cutoff produces exactly one record, so two periodic images of the same
    /// pair are two records.
    ///
    /// The integer shifts come from a bin-relative scheme; for extremely
    /// skewed cells combined with cutoffs close to the cell size they can
    /// differ by ±1 from the minimum-image convention while still satisfying
    /// `vector == positions[second] + shift · cell - positions[first]`.
    #[time_graph::instrument(name = "PairList::build")]
    pub fn build(
        cell: Matrix3<T>,
        pbc: [bool; 3],
        positions: &[Vector3D<T>],
        cutoff: T,
    ) -> Result<PairList<T, I>, Error> {
        PairList::build_impl(cell, pbc, positions, cutoff, true)
    }

    /// Same as [`PairList::build`], without the sorting pass and without the
    /// per-site index. Records appear in emission order.
    pub fn build_unsorted(
        cell: Matrix3<T>,
        pbc: [bool; 3],
        positions: &[Vector3D<T>],
        cutoff: T,
    ) -> Result<PairList<T, I>, Error> {
        PairList::build_impl(cell, pbc, positions, cutoff, false)
    }

    fn build_impl(
        cell: Matrix3<T>,
        pbc: [bool; 3],
        positions: &[Vector3D<T>],
        cutoff: T,
        sorted: bool,
    ) -> Result<PairList<T, I>, Error> {
        let geometry = CellGeometry::new(cell, pbc, cutoff)?;
        let bins = LinkedBins::<I>::new(&geometry, positions)?;

        let mut records = Vec::new();
        records.try_reserve(PAIRS_PER_PARTICLE_HINT * positions.len())?;

        let [n1, n2, n3] = geometry.n_bins();
        let [m1, m2, m3] = geometry.n_search();
        let cutoff2 = cutoff * cutoff;

        for (i, &position) in positions.iter().enumerate() {
            let ci0 = geometry.bin_of(position);
            let ci = geometry.home_bin(ci0);
            let dxi = position - geometry.bin_origin(ci);
            let ci_eff = geometry.storage_bin(ci0);

            for ox in -m1..=m1 {
                let c1 = match candidate_bin(ci_eff[0] + ox, n1, pbc[0]) {
                    Some(c1) => c1,
                    None => continue,
                };
                for oy in -m2..=m2 {
                    let c2 = match candidate_bin(ci_eff[1] + oy, n2, pbc[1]) {
                        Some(c2) => c2,
                        None => continue,
                    };
                    for oz in -m3..=m3 {
                        let c3 = match candidate_bin(ci_eff[2] + oz, n3, pbc[2]) {
                            Some(c3) => c3,
                            None => continue,
                        };

                        // cartesian offset from particle i's bin to the
                        // candidate bin
                        let off = geometry.bin_origin([ox, oy, oz]);

                        for j in bins.particles([c1, c2, c3]) {
                            if i == j && ox == 0 && oy == 0 && oz == 0 {
                                continue;
                            }

                            let cj0 = geometry.bin_of(positions[j]);
                            let cj = geometry.home_bin(cj0);
                            let dxj = positions[j] - geometry.bin_origin(cj);

                            let dr = dxj - dxi + off;
                            let distance2 = dr * dr;

                            if distance2 < cutoff2 {
                                if distance2.to_f64() < 1e-3 {
                                    warn!(
                                        "particles {} and {} are very close to one another ({})",
                                        i, j, distance2.sqrt()
                                    );
                                }

                                records.push(PairRecord {
                                    first: i,
                                    second: j,
                                    distance: distance2.sqrt(),
                                    vector: dr,
                                    // exact division on periodic axes, zero
                                    // numerator on open ones
                                    shift: [
                                        ((ci[0] - cj[0] + ox) / n1) as i32,
                                        ((ci[1] - cj[1] + oy) / n2) as i32,
                                        ((ci[2] - cj[2] + oz) / n3) as i32,
                                    ],
                                });
                            }
                        }
                    }
                }
            }
        }

        let first_of_site = if sorted {
            // stable sort keeps the emission order of duplicate images of the
            // same (first, second), which keeps their shifts in a
            // reproducible order
            records.sort_by_key(|record| (record.first, record.second));

            let mut first_of_site = vec![0; positions.len() + 1];
            for record in &records {
                first_of_site[record.first + 1] += 1;
            }
            for site in 0..positions.len() {
                first_of_site[site + 1] += first_of_site[site];
            }
            Some(first_of_site)
        } else {
            None
        };

        let mut list = PairList {
            cutoff: cutoff,
            n_sites: positions.len(),
            first: Vec::with_capacity(records.len()),
            second: Vec::with_capacity(records.len()),
            distance: Vec::with_capacity(records.len()),
            vector: Vec::with_capacity(records.len()),
            shift: Vec::with_capacity(records.len()),
            first_of_site: first_of_site,
        };

        for record in records {
            list.first.push(I::from_usize(record.first).expect("particle count already checked"));
            list.second.push(I::from_usize(record.second).expect("particle count already checked"));
            list.distance.push(record.distance);
            list.vector.push(record.vector);
            list.shift.push(record.shift);
        }

        Ok(list)
    }

    /// Number of pair records in the list
    pub fn len(&self) -> usize {
        self.first.len()
    }

    /// Is the list empty?
    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// Number of sites (particles) this list was built for
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Cutoff used to build this list
    pub fn cutoff(&self) -> T {
        self.cutoff
    }

    /// Was this list built with the sorting pass?
    pub fn is_sorted(&self) -> bool {
        self.first_of_site.is_some()
    }

    /// When sorted, the per-site offsets: records of site `i` are
    /// `first_of_site[i]..first_of_site[i + 1]`, and the last entry is the
    /// total record count.
    pub fn first_of_site(&self) -> Option<&[usize]> {
        self.first_of_site.as_deref()
    }

    /// Iterate over all pair records
    pub fn pairs(&self) -> impl Iterator<Item = Pair<T>> + '_ {
        (0..self.len()).map(move |p| Pair {
            first: self.first[p].to_usize(),
            second: self.second[p].to_usize(),
            distance: self.distance[p],
            vector: self.vector[p],
            shift: self.shift[p],
        })
    }

    /// Get the neighbors of `site` in O(1).
    ///
    /// # Panics
    ///
    /// If the list was built without sorting.
    pub fn site(&self, site: usize) -> SiteNeighbors<'_, T, I> {
        let first_of_site = self.first_of_site.as_ref()
            .expect("per-site access requires a sorted pair list");
        let range = first_of_site[site]..first_of_site[site + 1];

        SiteNeighbors {
            site: site,
            second: &self.second[range.clone()],
            distance: &self.distance[range.clone()],
            vector: &self.vector[range],
        }
    }

    /// Iterate over all sites and their neighbors.
    ///
    /// # Panics
    ///
    /// If the list was built without sorting.
    pub fn sites(&self) -> impl Iterator<Item = SiteNeighbors<'_, T, I>> + '_ {
        (0..self.n_sites).map(move |site| self.site(site))
    }
}

/// Coordinate of the candidate neighbor bin along one axis: wrapped on a
/// periodic axis, `None` outside the grid on an open one.
#[inline]
fn candidate_bin(bin: i64, n_bins: i64, periodic: bool) -> Option<i64> {
    if periodic {
        Some(bin_wrap(bin, n_bins))
    } else if bin >= 0 && bin < n_bins {
        Some(bin)
    } else {
        None
    }
}
