//! Reduction of per-pair and per-tuple contributions onto the participating
//! sites, in value (symmetric) and gradient (antisymmetric) form.
//!
//! All four kernels run through [`map_reduce`](crate::parallel): workers get
//! private buffers and an interlaced slice of the iteration units, so no
//! locking is needed and the kernels never observe partially accumulated
//! output. Kernels read the pair list through a shared reference and never
//! mutate it.

use crate::nbody::{NBodies, Simplex, MAX_EDGES};
use crate::parallel::map_reduce;
use crate::{PairIndex, PairList, Scalar, Vector3D};

impl<T: Scalar, I: PairIndex> PairList<T, I> {
    /// Accumulate `f(distance, vector)` symmetrically: every pair of distinct
    /// sites below the cutoff adds half of its value to both sites.
    ///
    /// Periodic self images do not contribute, their two orientations would
    /// cancel the factor of one half.
    ///
    /// # Panics
    ///
    /// If `out` is not one value per site.
    pub fn map_to_sites<F>(&self, f: F, out: &mut [T])
    where
        F: Fn(T, &Vector3D<T>) -> T + Sync,
    {
        assert_eq!(out.len(), self.n_sites(), "expected one output value per site");

        let half = T::ONE / T::TWO;
        map_reduce(self.len(), out, |range, out| {
            for p in range {
                let i = self.first[p].to_usize();
                let j = self.second[p].to_usize();
                if i < j {
                    let value = f(self.distance[p], &self.vector[p]) * half;
                    out[i] += value;
                    out[j] += value;
                }
            }
        });
    }

    /// Accumulate `df(distance, vector)` antisymmetrically: every pair of
    /// distinct sites adds the returned vector to the second site and
    /// subtracts it from the first.
    ///
    /// The sum of the output over all sites vanishes up to floating point
    /// rounding, whatever `df` is.
    ///
    /// # Panics
    ///
    /// If `out` is not one vector per site.
    pub fn map_to_sites_d<F>(&self, df: F, out: &mut [Vector3D<T>])
    where
        F: Fn(T, &Vector3D<T>) -> Vector3D<T> + Sync,
    {
        assert_eq!(out.len(), self.n_sites(), "expected one output vector per site");

        map_reduce(self.len(), out, |range, out| {
            for p in range {
                let i = self.first[p].to_usize();
                let j = self.second[p].to_usize();
                if i < j {
                    let gradient = df(self.distance[p], &self.vector[p]);
                    out[j] += gradient;
                    out[i] -= gradient;
                }
            }
        });
    }
}

impl<'a, T: Scalar, I: PairIndex> NBodies<'a, T, I> {
    /// Accumulate `f(edges)` over every canonical tuple: each tuple adds
    /// `f / order` to its central site and to every member, so the tuple
    /// contributes its full value once.
    ///
    /// # Panics
    ///
    /// If `out` is not one value per site.
    pub fn map_to_sites<F>(&self, f: F, out: &mut [T])
    where
        F: Fn(&[T]) -> T + Sync,
    {
        let list = self.list();
        assert_eq!(out.len(), list.n_sites(), "expected one output value per site");

        let share = T::ONE / T::from_f64(self.order() as f64);

        if self.order() == 2 && !list.is_sorted() {
            // without per-site slices, pair tuples are scanned off the records
            map_reduce(list.len(), out, |range, out| {
                for p in range {
                    let i = list.first[p].to_usize();
                    let j = list.second[p].to_usize();
                    if i < j {
                        let edges = [list.distance[p]];
                        let value = f(&edges) * share;
                        out[i] += value;
                        out[j] += value;
                    }
                }
            });
            return;
        }

        map_reduce(list.n_sites(), out, |range, out| {
            let mut scratch = Simplex::new();
            for site in range {
                self.for_each_at_site(site, &mut scratch, &mut |simplex| {
                    let value = f(&simplex.edges) * share;
                    out[simplex.root] += value;
                    for &member in &*simplex.sites {
                        out[member] += value;
                    }
                });
            }
        });
    }

    /// Accumulate the gradient of an n-body kernel. For every canonical
    /// tuple, `df(edges, derivatives)` fills one derivative per edge; the
    /// derivative of edge `(a, b)` then pulls the sites `a` and `b` along the
    /// edge direction, antisymmetrically.
    ///
    /// # Panics
    ///
    /// If `out` is not one vector per site.
    pub fn map_to_sites_d<F>(&self, df: F, out: &mut [Vector3D<T>])
    where
        F: Fn(&[T], &mut [T]) + Sync,
    {
        let list = self.list();
        assert_eq!(out.len(), list.n_sites(), "expected one output vector per site");

        let members = self.order() - 1;

        if self.order() == 2 && !list.is_sorted() {
            map_reduce(list.len(), out, |range, out| {
                for p in range {
                    let i = list.first[p].to_usize();
                    let j = list.second[p].to_usize();
                    if i < j {
                        let edges = [list.distance[p]];
                        let mut derivatives = [T::ZERO];
                        df(&edges, &mut derivatives);

                        // unit vector from the second site to the first
                        let direction = -list.vector[p] / list.distance[p];
                        let term = direction * derivatives[0];
                        out[i] += term;
                        out[j] -= term;
                    }
                }
            });
            return;
        }

        map_reduce(list.n_sites(), out, |range, out| {
            let mut scratch = Simplex::new();
            let mut derivatives = [T::ZERO; MAX_EDGES];
            for site in range {
                self.for_each_at_site(site, &mut scratch, &mut |simplex| {
                    let n_edges = simplex.edges.len();
                    let derivatives = &mut derivatives[..n_edges];
                    for derivative in derivatives.iter_mut() {
                        *derivative = T::ZERO;
                    }
                    df(&simplex.edges, derivatives);

                    // edges from the central site to each member
                    for t in 0..members {
                        let direction = -simplex.vectors[t] / simplex.edges[t];
                        let term = direction * derivatives[t];
                        out[simplex.root] += term;
                        out[simplex.sites[t]] -= term;
                    }

                    // member-member edges, in the same order as the edge
                    // lengths
                    let mut edge = members;
                    for a in 0..members {
                        for b in (a + 1)..members {
                            let direction =
                                (simplex.vectors[a] - simplex.vectors[b]) / simplex.edges[edge];
                            let term = direction * derivatives[edge];
                            out[simplex.sites[a]] += term;
                            out[simplex.sites[b]] -= term;
                            edge += 1;
                        }
                    }
                });
            }
        });
    }
}
