use stockroom_core::db::open_db_in_memory;
use stockroom_core::{
    bootstrap_allocator, OverflowPolicy, Sku, SkuAllocator, SkuFormat, SqlitePartRepository,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn fresh_allocator(format: SkuFormat) -> SkuAllocator {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePartRepository::try_new(&conn).unwrap();
    bootstrap_allocator(&repo, format).unwrap()
}

fn counter_of(format: &SkuFormat, sku: &Sku) -> u64 {
    format.parse_counter(sku.as_str()).unwrap()
}

#[test]
fn sequential_allocations_are_strictly_increasing() {
    let allocator = fresh_allocator(SkuFormat::default());

    let issued: Vec<Sku> = (0..50).map(|_| allocator.allocate().unwrap()).collect();

    for pair in issued.windows(2) {
        assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        assert_eq!(
            counter_of(allocator.format(), &pair[0]) + 1,
            counter_of(allocator.format(), &pair[1])
        );
    }
}

#[test]
fn every_sku_has_prefix_and_six_digits() {
    let allocator = fresh_allocator(SkuFormat::default());

    for _ in 0..200 {
        let sku = allocator.allocate().unwrap();
        let suffix = sku.as_str().strip_prefix("PC-").unwrap();
        assert_eq!(suffix.len(), 6, "unexpected width in {sku}");
        assert!(suffix.bytes().all(|b| b.is_ascii_digit()));
    }
}

#[test]
fn concurrent_allocations_are_unique_and_contiguous() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 125;

    let allocator = Arc::new(fresh_allocator(SkuFormat::default()));

    let per_thread: Vec<Vec<Sku>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                scope.spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| allocator.allocate().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Calls inside one thread are ordered, so their suffixes must increase.
    for skus in &per_thread {
        for pair in skus.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    let all: Vec<Sku> = per_thread.into_iter().flatten().collect();
    assert_eq!(all.len(), THREADS * PER_THREAD);

    let distinct: HashSet<&Sku> = all.iter().collect();
    assert_eq!(distinct.len(), all.len(), "duplicate sku issued");

    let mut counters: Vec<u64> = all
        .iter()
        .map(|sku| counter_of(allocator.format(), sku))
        .collect();
    counters.sort_unstable();
    let expected: Vec<u64> = (1..=(THREADS * PER_THREAD) as u64).collect();
    assert_eq!(counters, expected);
    assert_eq!(allocator.next_counter(), (THREADS * PER_THREAD) as u64 + 1);
}

#[test]
fn independent_allocators_do_not_share_state() {
    let first = fresh_allocator(SkuFormat::default());
    let second = fresh_allocator(SkuFormat::default());

    first.allocate().unwrap();
    first.allocate().unwrap();

    assert_eq!(second.allocate().unwrap().as_str(), "PC-000001");
}

#[test]
fn custom_layout_is_respected() {
    let format = SkuFormat::new("BOLT-", 4, OverflowPolicy::Reject).unwrap();
    let allocator = fresh_allocator(format);

    assert_eq!(allocator.allocate().unwrap().as_str(), "BOLT-0001");
}
