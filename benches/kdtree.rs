use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use kdstore::{KDTree, KDTreeBuilder, KDTreeIndex, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_ITEMS: usize = 10_000;
const ARITY: usize = 3;

fn random_points(rng: &mut StdRng, count: usize) -> Vec<Point> {
    (0..count)
        .map(|_| Point::from((0..ARITY).map(|_| rng.gen::<u32>() as u64).collect::<Vec<_>>()))
        .collect()
}

fn construct(points: &[Point]) -> KDTree<u64> {
    let mut builder = KDTreeBuilder::new(ARITY);
    for (i, point) in points.iter().enumerate() {
        builder.add(point.clone(), i as u64);
    }
    builder.finish().unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let points = random_points(&mut rng, NUM_ITEMS);
    let queries = random_points(&mut rng, 100);

    c.bench_function("construction", |b| b.iter(|| construct(&points)));

    let tree = construct(&points);

    c.bench_function("get", |b| {
        b.iter(|| {
            for point in points.iter().take(100) {
                tree.get(point).unwrap();
            }
        })
    });

    let pattern = Point::partial([Some(points[0].value_at(0).unwrap_or(0)), None, None]);
    c.bench_function("get (partial)", |b| b.iter(|| tree.get(&pattern).unwrap()));

    let from = Point::from([0, 0, 0]);
    let to = Point::from([u32::MAX as u64 / 4; ARITY]);
    c.bench_function("scan", |b| {
        b.iter(|| tree.scan(Some(&from), Some(&to)).unwrap())
    });

    c.bench_function("nearest neighbor", |b| {
        b.iter(|| {
            for query in queries.iter() {
                tree.nearest_neighbor(query).unwrap();
            }
        })
    });

    c.bench_function("delete", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut tree| {
                for point in points.iter().take(100) {
                    tree.delete(point).unwrap();
                }
                tree
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
