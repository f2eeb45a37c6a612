//! Benchmarks for the sequence, sections and child differs.
//!
//! Run with: cargo bench --bench reconcile_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tola_reconcile::{
    ChildRecord, KeyedItem, MoveDetection, Section, diff_children, diff_items_with, diff_sections,
};

/// Deterministic permutation of `0..n` (xorshift-driven Fisher-Yates).
fn shuffled(n: u32, mut seed: u64) -> Vec<u32> {
    let mut keys: Vec<u32> = (0..n).collect();
    for i in (1..keys.len()).rev() {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        keys.swap(i, (seed % (i as u64 + 1)) as usize);
    }
    keys
}

fn ranked(keys: &[u32]) -> Vec<KeyedItem<u32>> {
    keys.iter().enumerate().map(|(i, &k)| KeyedItem::new(k, i)).collect()
}

/// `sections` sections of `rows` rows each, row keys taken from `keys` in order
fn table(keys: &[u32], sections: u32, rows: usize) -> Vec<Section<u32>> {
    keys.chunks(rows)
        .take(sections as usize)
        .enumerate()
        .map(|(s, chunk)| Section::new(1_000_000 + s as u32, s).with_rows(ranked(chunk)))
        .collect()
}

fn bench_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("items/shuffle");

    for n in [100u32, 1_000, 10_000] {
        group.throughput(Throughput::Elements(n as u64));
        let old = ranked(&(0..n).collect::<Vec<_>>());
        let new = ranked(&shuffled(n, 0x9e37_79b9_7f4a_7c15));
        for detection in [MoveDetection::ByRank, MoveDetection::ByDisplacement] {
            // displacement is quadratic; keep it to sizes a list view would animate
            if detection == MoveDetection::ByDisplacement && n > 1_000 {
                continue;
            }
            group.bench_with_input(
                BenchmarkId::new(format!("{detection:?}"), n),
                &(),
                |b, _| b.iter(|| black_box(diff_items_with(&old, &new, detection))),
            );
        }
    }

    group.finish();
}

fn bench_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("sections/shuffle");

    for (sections, rows) in [(10u32, 10usize), (100, 10), (100, 100)] {
        let n = sections * rows as u32;
        group.throughput(Throughput::Elements(n as u64));
        let old = table(&(0..n).collect::<Vec<_>>(), sections, rows);
        let new = table(&shuffled(n, 0x2545_f491_4f6c_dd1d), sections, rows);
        group.bench_with_input(
            BenchmarkId::new("diff", format!("{sections}x{rows}")),
            &(),
            |b, _| b.iter(|| black_box(diff_sections(&old, &new))),
        );
    }

    group.finish();
}

fn bench_children(c: &mut Criterion) {
    let mut group = c.benchmark_group("children/shuffle");

    for n in [10u32, 100, 500] {
        group.throughput(Throughput::Elements(n as u64));
        let old: Vec<ChildRecord<u32>> = (0..n).map(ChildRecord::visible).collect();
        let new: Vec<u32> = shuffled(n, 0x5851_f42d_4c95_7f2d)
            .into_iter()
            .filter(|k| k % 5 != 0)
            .collect();
        group.bench_with_input(BenchmarkId::new("diff", n), &(), |b, _| {
            b.iter(|| black_box(diff_children(&old, &new)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_items, bench_sections, bench_children);
criterion_main!(benches);
