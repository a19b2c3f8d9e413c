//! Benchmarks for trend surface estimators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fluvrem_algorithms::interpolation::{
    idw, kernel_density, tin_from_breaklines, tin_to_raster, Breakline, IdwParams,
    KernelDensityGrid, KernelShape, SamplePoint, TinSampling,
};
use fluvrem_core::{GeoTransform, Raster};

fn create_dem(size: usize) -> Raster<f64> {
    let mut dem = Raster::new(size, size);
    dem.set_transform(GeoTransform::new(0.0, size as f64 * 10.0, 10.0, -10.0));
    dem
}

/// Samples every 50 m along a meandering channel through the grid
fn channel_samples(size: usize) -> Vec<SamplePoint> {
    let extent = size as f64 * 10.0;
    let n = (extent / 50.0) as usize + 1;
    (0..n)
        .map(|i| {
            let x = i as f64 * 50.0;
            let y = extent / 2.0 + (x / 200.0).sin() * extent / 8.0;
            SamplePoint::new(x, y, 100.0 - 0.01 * x)
        })
        .collect()
}

/// Cross-sections every 100 m, levelled at the channel elevation
fn cross_sections(size: usize) -> Vec<Breakline> {
    let extent = size as f64 * 10.0;
    (0..=(extent / 100.0) as usize)
        .map(|i| {
            let x = i as f64 * 100.0;
            let skew = ((i % 5) as f64 - 2.0) * 15.0;
            Breakline::level(
                [(x - skew, extent * 0.2), (x, extent / 2.0), (x + skew, extent * 0.8)],
                100.0 - 0.01 * x,
            )
        })
        .collect()
}

fn bench_kernel_density(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_density");

    for size in [256, 512, 1024].iter() {
        let dem = create_dem(*size);
        let samples = channel_samples(*size);

        for shape in [KernelShape::Square, KernelShape::Quartic] {
            let grid = KernelDensityGrid::on_grid_of(&dem, 100.0, shape);
            group.bench_with_input(BenchmarkId::new(format!("{shape:?}"), size), size, |b, _| {
                b.iter(|| kernel_density(black_box(&samples), true, &grid).unwrap())
            });
        }
    }

    group.finish();
}

fn bench_idw(c: &mut Criterion) {
    let mut group = c.benchmark_group("idw");

    for size in [256, 512, 1024].iter() {
        let dem = create_dem(*size);
        let samples = channel_samples(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| idw(black_box(&samples), IdwParams::on_grid_of(&dem, 100.0)).unwrap())
        });
    }

    group.finish();
}

fn bench_tin(c: &mut Criterion) {
    let mut group = c.benchmark_group("tin");

    for size in [256, 512, 1024].iter() {
        let breaklines = cross_sections(*size);

        group.bench_with_input(BenchmarkId::new("triangulate", size), size, |b, _| {
            b.iter(|| tin_from_breaklines(black_box(&breaklines), &[]).unwrap())
        });

        let tin = tin_from_breaklines(&breaklines, &[]).unwrap();
        group.bench_with_input(BenchmarkId::new("rasterize", size), size, |b, _| {
            b.iter(|| tin_to_raster(black_box(&tin), TinSampling::default()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kernel_density, bench_idw, bench_tin);
criterion_main!(benches);
