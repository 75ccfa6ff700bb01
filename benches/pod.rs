use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use podnn::pod::Pod;
use rand_xoshiro::Xoshiro256Plus;

fn snapshots(n_h: usize, n_s: usize, n_t: usize) -> Array2<f64> {
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let mu = Array2::random_using((n_s, 2), Uniform::new(0.5, 2.), &mut rng);
    Array2::from_shape_fn((n_h, n_s * n_t), |(i, j)| {
        let x = i as f64 / n_h as f64;
        let t = (j % n_t) as f64 / n_t as f64;
        let m = mu.row(j / n_t);
        (m[0] * x * std::f64::consts::PI).sin() * (-m[1] * t).exp()
    })
}

fn criterion_pod(c: &mut Criterion) {
    let sizes = [(500, 50), (2000, 100)];
    let n_t = 10;

    let mut group = c.benchmark_group("pod");
    group.sample_size(10);
    for (n_h, n_s) in sizes {
        let u = snapshots(n_h, n_s, n_t);
        group.bench_function(format!("pod-{n_h}x{}", n_s * n_t), |b| {
            b.iter(|| {
                std::hint::black_box(Pod::params().eps(1e-8).build(&u).expect("POD basis"))
            });
        });
        group.bench_function(format!("pod-two-stage-{n_h}x{}", n_s * n_t), |b| {
            b.iter(|| {
                std::hint::black_box(
                    Pod::params()
                        .eps(1e-8)
                        .eps_init(Some(1e-10))
                        .n_t(n_t)
                        .build(&u)
                        .expect("POD basis"),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_pod);
criterion_main!(benches);
