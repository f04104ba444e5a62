use criterion::{criterion_group, criterion_main, Criterion};
use rastergrid::Raster;
use routeprof::{
    build_profile, geo::line_string, ContourIndex, FieldSource, ProfileConfig, Route,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// 2 km square of 2 m cells over a tilted, rippled surface.
fn synthetic_surface() -> Raster {
    let (cols, rows) = (1000, 1000);
    let samples = (0..rows)
        .flat_map(|row| {
            (0..cols).map(move |col| {
                let (x, y) = (f64::from(col) * 2.0, f64::from(row) * 2.0);
                (-40.0 - 0.01 * x + 0.02 * y + (x / 50.0).sin()) as f32
            })
        })
        .collect();
    Raster::new(0.0, 2000.0, (2.0, 2.0), (1000, 1000), samples, Some(-9999.0)).unwrap()
}

fn synthetic_contours() -> ContourIndex {
    ContourIndex::new((0..200).map(|i| {
        let x = f64::from(i) * 10.0;
        (line_string![(x: x, y: 0.0), (x: x + 25.0, y: 2000.0)], -0.1 * x)
    }))
}

fn route() -> Route {
    Route::planar(line_string![
        (x: 100.0, y: 100.0),
        (x: 900.0, y: 1200.0),
        (x: 1400.0, y: 900.0),
        (x: 1900.0, y: 1900.0),
    ])
}

fn grid_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid Profile");
    let raster = synthetic_surface();
    let route = route();
    let source = FieldSource::Grid(vec![&raster]);

    let along_only = ProfileConfig {
        min_step_m: 2.0,
        side_slope_half_width_m: None,
        ..ProfileConfig::default()
    };
    group.bench_function("along", |b| {
        b.iter(|| build_profile(&route, &source, &along_only).unwrap())
    });

    let with_side = ProfileConfig {
        min_step_m: 10.0,
        ..ProfileConfig::default()
    };
    group.bench_function("side slope", |b| {
        b.iter(|| build_profile(&route, &source, &with_side).unwrap())
    });
}

fn contour_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Contour Profile");
    let index = synthetic_contours();
    let route = route();
    let source = FieldSource::Contours(&index);
    let config = ProfileConfig {
        min_step_m: 10.0,
        ..ProfileConfig::default()
    };
    group.bench_function("side slope", |b| {
        b.iter(|| build_profile(&route, &source, &config).unwrap())
    });
}

criterion_group!(benches, grid_profile, contour_profile);
criterion_main!(benches);
