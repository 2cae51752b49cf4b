use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use memocache::{Limited, Memo, Ordered, Unordered};

fn triangular((n,): (u64,)) -> u64 {
    (0..=n).sum()
}

fn bench_cached_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_call");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("ordered_hit", |b| {
        let mut memo: Memo<(u64,), u64, Ordered> = Memo::new(triangular);

        // Warm the cache
        for n in 0..100 {
            memo.call((n,));
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(memo.call((counter % 100,)));
            counter += 1;
        });
    });

    group.bench_function("unordered_hit", |b| {
        let mut memo: Memo<(u64,), u64, Unordered> = Memo::new(triangular);

        for n in 0..100 {
            memo.call((n,));
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(memo.call((counter % 100,)));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_lru_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_hit");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("limited_1000_hit", |b| {
        let mut memo: Memo<(u64,), u64, Unordered, Limited<1000>> = Memo::new(triangular);

        for n in 0..1000 {
            memo.call((n,));
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(memo.call((counter % 1000,)));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_eviction_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction_churn");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("limited_10_miss", |b| {
        let mut memo: Memo<(u64,), u64, Ordered, Limited<10>> = Memo::new(triangular);

        // Access pattern that guarantees misses
        let mut counter = 0u64;
        b.iter(|| {
            black_box(memo.call((counter % 100,)));
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_cached_call, bench_lru_hit, bench_eviction_churn);
criterion_main!(benches);
