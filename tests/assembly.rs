use approx::{assert_relative_eq, assert_ulps_eq};

use nblists::{nbodies, set_max_threads, Matrix3, PairList, Vector3D};

/// splitmix64, enough randomness for reproducible test configurations
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }
}

fn random_list(count: usize, length: f64, cutoff: f64, seed: u64) -> (PairList<f64, i32>, usize) {
    let cell = Matrix3::diagonal(length, length, length);
    let mut rng = SplitMix64(seed);
    let positions: Vec<Vector3D<f64>> = (0..count)
        .map(|_| {
            Vector3D::new(
                length * rng.next_f64(),
                length * rng.next_f64(),
                length * rng.next_f64(),
            )
        })
        .collect();
    let list = PairList::build(cell, [true; 3], &positions, cutoff).unwrap();
    (list, count)
}

#[test]
fn constant_kernel_counts_neighbors() {
    let (list, n_sites) = random_list(120, 8.0, 2.0, 0x5eed);
    let constant = 4.0;

    let mut out = vec![0.0; n_sites];
    list.map_to_sites(|_, _| constant, &mut out);

    // each distinct-site image pair contributes half of the constant to both
    // of its ends
    for site in 0..n_sites {
        let touching = list.pairs()
            .filter(|pair| pair.first == site && pair.second != site)
            .count();
        assert_relative_eq!(out[site], constant * touching as f64 / 2.0, epsilon = 1e-12);
    }

    let unordered = list.pairs().filter(|pair| pair.first < pair.second).count();
    assert_relative_eq!(
        out.iter().sum::<f64>(),
        constant * unordered as f64,
        epsilon = 1e-9,
    );
}

#[test]
fn gradient_sums_to_zero() {
    let (list, n_sites) = random_list(90, 7.0, 2.1, 0xabcd);

    let mut out = vec![Vector3D::zero(); n_sites];
    list.map_to_sites_d(
        |distance, vector| *vector * (distance * distance - 1.3),
        &mut out,
    );

    let total = out.iter().fold(Vector3D::zero(), |sum, &value| sum + value);
    for k in 0..3 {
        assert_relative_eq!(total[k], 0.0, epsilon = 1e-10);
    }
}

#[test]
fn linear_chain_triplet() {
    let cell = Matrix3::diagonal(20.0, 20.0, 20.0);
    let positions = [
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0),
        Vector3D::new(2.0, 0.0, 0.0),
    ];
    let list = PairList::<f64, i32>::build(cell, [false; 3], &positions, 2.5).unwrap();

    // a single canonical triplet with edge lengths (1, 2, 1)
    let mut count = 0;
    nbodies(3, &list).unwrap().for_each(|simplex| {
        count += 1;
        assert_eq!(simplex.root, 0);
        assert_eq!(&*simplex.sites, &[1, 2]);
        assert_ulps_eq!(simplex.edges[0], 1.0);
        assert_ulps_eq!(simplex.edges[1], 2.0);
        assert_ulps_eq!(simplex.edges[2], 1.0);
    });
    assert_eq!(count, 1);

    // the sum of the edges, a third to each site
    let mut out = vec![0.0; 3];
    nbodies(3, &list).unwrap().map_to_sites(|edges| edges.iter().sum(), &mut out);
    for value in &out {
        assert_ulps_eq!(*value, 4.0 / 3.0);
    }
}

// Every assertion involving the thread count cap lives in this one test:
// the cap is process-wide and the test harness runs tests concurrently.
#[test]
fn parallel_matches_sequential() {
    let (list, n_sites) = random_list(500, 12.0, 2.5, 0x733d);

    // pair values with f = |r|^2
    set_max_threads(1);
    let mut sequential = vec![0.0; n_sites];
    list.map_to_sites(|distance, _| distance * distance, &mut sequential);

    // sequential mode is byte-identical between runs
    let mut repeated = vec![0.0; n_sites];
    list.map_to_sites(|distance, _| distance * distance, &mut repeated);
    assert_eq!(sequential, repeated);

    set_max_threads(4);
    let mut parallel = vec![0.0; n_sites];
    list.map_to_sites(|distance, _| distance * distance, &mut parallel);

    for (p, s) in parallel.iter().zip(&sequential) {
        assert_relative_eq!(*p, *s, epsilon = 1e-10);
    }

    // pair gradients
    set_max_threads(1);
    let mut sequential_d = vec![Vector3D::zero(); n_sites];
    list.map_to_sites_d(|_, vector| *vector * 2.0, &mut sequential_d);

    set_max_threads(4);
    let mut parallel_d = vec![Vector3D::zero(); n_sites];
    list.map_to_sites_d(|_, vector| *vector * 2.0, &mut parallel_d);

    for (p, s) in parallel_d.iter().zip(&sequential_d) {
        for k in 0..3 {
            assert_relative_eq!(p[k], s[k], epsilon = 1e-10);
        }
    }

    // 3-body values
    set_max_threads(1);
    let mut sequential_3 = vec![0.0; n_sites];
    nbodies(3, &list).unwrap().map_to_sites(|edges| edges.iter().sum(), &mut sequential_3);

    set_max_threads(4);
    let mut parallel_3 = vec![0.0; n_sites];
    nbodies(3, &list).unwrap().map_to_sites(|edges| edges.iter().sum(), &mut parallel_3);

    for (p, s) in parallel_3.iter().zip(&sequential_3) {
        assert_relative_eq!(*p, *s, epsilon = 1e-8, max_relative = 1e-10);
    }

    set_max_threads(0);
}

#[test]
fn three_body_forces_balance() {
    let (list, n_sites) = random_list(60, 6.0, 1.8, 0xf00d);

    let mut out = vec![Vector3D::zero(); n_sites];
    nbodies(3, &list).unwrap().map_to_sites_d(
        |edges, derivatives| {
            for (derivative, &edge) in derivatives.iter_mut().zip(edges) {
                *derivative = 2.0 * (edge - 1.5);
            }
        },
        &mut out,
    );

    let total = out.iter().fold(Vector3D::zero(), |sum, &value| sum + value);
    for k in 0..3 {
        assert_relative_eq!(total[k], 0.0, epsilon = 1e-10);
    }
}
