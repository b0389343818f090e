use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geo::{Distance, Haversine as GeoHaversine};
use nearby::compute::{Haversine, haversine_km, select_with};
use nearby::{Config, Coordinate, Dataset, GeoPoint, SearchEngine, SelectionStrategy};

fn dataset(n: usize) -> Dataset<usize> {
    (0..n)
        .map(|i| {
            let latitude = 40.0 + (i % 100) as f64 * 0.05;
            let longitude = -80.0 + (i / 100) as f64 * 0.05;
            GeoPoint::new(format!("poi:{}", i), Coordinate::new(latitude, longitude), i)
        })
        .collect()
}

fn benchmark_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");

    let nyc = Coordinate::new(40.7128, -74.0060);
    let la = Coordinate::new(34.0522, -118.2437);

    group.bench_function("haversine_km", |b| {
        b.iter(|| haversine_km(black_box(&nyc), black_box(&la)).unwrap())
    });

    // Reference point for the hand-written formula
    let (geo_nyc, geo_la) = (geo::Point::from(nyc), geo::Point::from(la));
    group.bench_function("geo_haversine", |b| {
        b.iter(|| GeoHaversine.distance(black_box(geo_nyc), black_box(geo_la)))
    });

    group.finish();
}

fn benchmark_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let query = Coordinate::new(41.5, -78.5);
    let distance = Haversine::default();

    for size in [100, 1_000, 10_000] {
        let points = dataset(size);

        for (name, strategy) in [
            ("full_sort", SelectionStrategy::FullSort),
            ("heap", SelectionStrategy::Heap),
        ] {
            group.bench_with_input(BenchmarkId::new(name, size), &points, |b, points| {
                b.iter(|| {
                    select_with(points.points(), black_box(&query), 5, &distance, strategy).unwrap()
                })
            });
        }
    }

    group.finish();
}

fn benchmark_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let engine = SearchEngine::new(dataset(1_000));

    // Same query every time, served from the cache after the first call
    let query = Coordinate::new(41.5, -78.5);
    group.bench_function("find_nearest_cached", |b| {
        b.iter(|| engine.find_nearest(black_box(query), 5).unwrap())
    });

    // Distinct queries with a tiny cache, so nearly every call computes
    let uncached = SearchEngine::builder(dataset(1_000))
        .config(Config::default().with_cache_capacity(1))
        .build()
        .unwrap();
    group.bench_function("find_nearest_uncached", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let query = Coordinate::new(40.0 + (counter % 500) as f64 * 0.01, -78.5);
            uncached.find_nearest(black_box(query), 5).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_distance,
    benchmark_selection,
    benchmark_engine
);

criterion_main!(benches);
