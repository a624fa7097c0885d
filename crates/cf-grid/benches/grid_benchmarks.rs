//! Benchmarks for the cf-grid crate - header parsing, extraction and statistics.
//!
//! Run with: cargo bench --package cf-grid --bench grid_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cf_grid::{CfDataset, DimensionFilter, GridConfig};
use netcdf_parser::NetCdfReader;
use test_utils::{create_axis, create_smooth_field, FixtureVariable, NetCdfFixture};

/// A `size` x `size` temperature field on a regular lon/lat grid.
fn generate_dataset(size: usize) -> Vec<u8> {
    NetCdfFixture::new()
        .dimension("lat", size as u32)
        .dimension("lon", size as u32)
        .variable(
            FixtureVariable::new("lon", &["lon"], create_axis(-180.0, 360.0 / size as f64, size))
                .attribute("axis", "X"),
        )
        .variable(
            FixtureVariable::new("lat", &["lat"], create_axis(-90.0, 180.0 / size as f64, size))
                .attribute("axis", "Y"),
        )
        .variable(
            FixtureVariable::new("t2m", &["lat", "lon"], create_smooth_field(size, size))
                .attribute("units", "K"),
        )
        .build()
}

const SIZES: [usize; 3] = [64, 256, 512];

fn bench_parse_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_header");

    for size in SIZES {
        let bytes = bytes::Bytes::from(generate_dataset(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| NetCdfReader::new(black_box(bytes.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let filter = DimensionFilter::new();

    for size in SIZES {
        let dataset = CfDataset::new(generate_dataset(size)).unwrap();
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| dataset.extract(black_box("t2m"), &filter).unwrap())
        });
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    for size in SIZES {
        let config = GridConfig {
            read_only: false,
            ..Default::default()
        };
        let mut dataset = CfDataset::with_config(generate_dataset(size), config).unwrap();
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_function(BenchmarkId::new("uncached", size), |b| {
            b.iter(|| dataset.stats(black_box("t2m")).unwrap())
        });
    }

    let mut dataset = CfDataset::new(generate_dataset(256)).unwrap();
    group.bench_function("cached", |b| {
        b.iter(|| dataset.stats(black_box("t2m")).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_parse_header, bench_extract, bench_stats);
criterion_main!(benches);
