//!
//! Benchmark the cost of finding an operation versus the cost of actually
//! running it: `find_operation` walks the CRS graph and builds a fresh
//! `MathTransform` pipeline on every call, so a caller who transforms many
//! batches between the same two CRSs should cache the operation rather
//! than calling `transform::transform` per point.
//!

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crsops::authority;
use crsops::operation_finder::find_operation;
use crsops::transform::transform_in_place;

fn utm_points(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            [2.0 + 4.0 * t, 43.0 + 10.0 * t]
        })
        .flat_map(|[lon, lat]| [lon, lat])
        .collect()
}

fn bench_find_operation(c: &mut Criterion) {
    let geo = authority::resolve_crs("CRS:84").unwrap();
    let utm = authority::universal(2.0, 48.0).unwrap();
    c.bench_function("find_operation geographic -> utm", |b| {
        b.iter(|| find_operation(black_box(&geo), black_box(&utm)).unwrap())
    });
}

fn bench_transform_forward(c: &mut Criterion) {
    let geo = authority::resolve_crs("CRS:84").unwrap();
    let utm = authority::universal(2.0, 48.0).unwrap();
    let op = find_operation(&geo, &utm).unwrap();
    let mut points = utm_points(10_000);

    c.bench_function("transverse mercator forward x10000", |b| {
        b.iter(|| {
            let mut buf = points.clone();
            transform_in_place(&op, black_box(&mut buf)).unwrap();
            buf
        })
    });

    // Keep the compiler from hoisting the clone out of the measured loop.
    black_box(&mut points);
}

criterion_group!(benches, bench_find_operation, bench_transform_forward);
criterion_main!(benches);
