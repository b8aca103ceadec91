//! Insert and range-scan benchmarks for the B+ tree index.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use secidx::{
    BTreeIndex, BufferPoolManager, Datatype, DiskManager, IndexOptions, Operator, PageId,
    RecordId,
};
use tempfile::TempDir;

const INSERT_COUNT: i32 = 20_000;
const POOL_SIZE: usize = 256;
const RANGE_WIDTH: i32 = 512;

fn fresh_pool() -> (TempDir, BufferPoolManager) {
    let dir = tempfile::tempdir().expect("tempdir");
    let dm = DiskManager::create(dir.path().join("bench.idx")).expect("create index file");
    (dir, BufferPoolManager::new(POOL_SIZE, dm))
}

fn rid(key: i32) -> RecordId {
    RecordId::new(PageId::new(key as u32 / 64), (key % 64) as u16)
}

/// Deterministic shuffle so every run inserts the same sequence.
fn shuffled_keys(n: i32) -> Vec<i32> {
    let mut keys: Vec<i32> = (0..n).collect();
    let mut state: u64 = 0xBEEF_F00D;
    for i in (1..keys.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        keys.swap(i, (state % (i as u64 + 1)) as usize);
    }
    keys
}

fn load(bpm: &BufferPoolManager, keys: &[i32]) -> PageId {
    let mut index = BTreeIndex::create(
        bpm,
        "bench",
        0,
        Datatype::Integer,
        IndexOptions::default(),
        std::iter::empty(),
    )
    .expect("create index");
    for &key in keys {
        index.insert_entry(key, rid(key)).expect("insert");
    }
    index.root_page_id()
}

fn index_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/insert");
    group.sample_size(20);
    group.throughput(Throughput::Elements(INSERT_COUNT as u64));

    let sequential: Vec<i32> = (0..INSERT_COUNT).collect();
    group.bench_function("sequential", |b| {
        b.iter_batched(
            fresh_pool,
            |(_dir, bpm)| black_box(load(&bpm, &sequential)),
            BatchSize::PerIteration,
        );
    });

    let random = shuffled_keys(INSERT_COUNT);
    group.bench_function("random", |b| {
        b.iter_batched(
            fresh_pool,
            |(_dir, bpm)| black_box(load(&bpm, &random)),
            BatchSize::PerIteration,
        );
    });

    group.finish();
}

fn index_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/scan");

    let (_dir, bpm) = fresh_pool();
    let records = shuffled_keys(INSERT_COUNT)
        .into_iter()
        .map(|key| (key.to_le_bytes().to_vec(), rid(key)));
    let mut index = BTreeIndex::create(
        &bpm,
        "bench",
        0,
        Datatype::Integer,
        IndexOptions::default(),
        records,
    )
    .expect("bootstrap index");

    group.throughput(Throughput::Elements(RANGE_WIDTH as u64));
    group.bench_function(BenchmarkId::new("range", RANGE_WIDTH), |b| {
        let mut low = 0;
        b.iter(|| {
            index
                .start_scan(low, Operator::Gte, low + RANGE_WIDTH, Operator::Lt)
                .expect("start scan");
            let mut count = 0;
            while index.scan_next().is_ok() {
                count += 1;
            }
            index.end_scan().expect("end scan");
            low = (low + 997) % (INSERT_COUNT - RANGE_WIDTH);
            black_box(count)
        });
    });

    group.finish();
}

criterion_group!(benches, index_insert, index_scan);
criterion_main!(benches);
