use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nblists::{nbodies, Matrix3, PairList, Vector3D};

/// Slightly perturbed simple cubic lattice with `n^3` atoms
fn lattice(n: usize, spacing: f64) -> (Matrix3<f64>, Vec<Vector3D<f64>>) {
    let length = n as f64 * spacing;
    let cell = Matrix3::diagonal(length, length, length);

    let mut positions = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                // deterministic sub-lattice jitter
                let jitter = 0.1 * spacing * ((i * 7 + j * 3 + k) % 5) as f64 / 5.0;
                positions.push(Vector3D::new(
                    i as f64 * spacing + jitter,
                    j as f64 * spacing - jitter,
                    k as f64 * spacing,
                ));
            }
        }
    }
    (cell, positions)
}

fn pair_list_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("PairList::build");
    group.noise_threshold(0.05);

    for &n in black_box(&[6, 10, 14]) {
        let (cell, positions) = lattice(n, 2.5);
        let n_atoms = positions.len();

        group.bench_function(&format!("{} atoms", n_atoms), |b| {
            b.iter(|| {
                PairList::<f64, i32>::build(cell, [true; 3], &positions, 4.0).unwrap()
            });
        });
    }
}

fn assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_to_sites");
    group.noise_threshold(0.05);

    let (cell, positions) = lattice(10, 2.5);
    let list = PairList::<f64, i32>::build(cell, [true; 3], &positions, 4.0).unwrap();

    group.bench_function("pair values", |b| {
        let mut out = vec![0.0; list.n_sites()];
        b.iter(|| {
            out.iter_mut().for_each(|value| *value = 0.0);
            list.map_to_sites(|distance, _| distance * distance, &mut out);
        });
    });

    group.bench_function("pair gradients", |b| {
        let mut out = vec![Vector3D::zero(); list.n_sites()];
        b.iter(|| {
            out.iter_mut().for_each(|value| *value = Vector3D::zero());
            list.map_to_sites_d(|_, vector| *vector * 2.0, &mut out);
        });
    });

    group.bench_function("3-body values", |b| {
        let mut out = vec![0.0; list.n_sites()];
        b.iter(|| {
            out.iter_mut().for_each(|value| *value = 0.0);
            nbodies(3, &list).unwrap().map_to_sites(
                |edges| edges.iter().copied().sum(),
                &mut out,
            );
        });
    });
}

criterion_group!(all, pair_list_build, assembly);
criterion_main!(all);
