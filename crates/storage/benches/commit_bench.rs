//! Benchmarks for larder-storage commits.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use larder_core::{CollectionPath, Fields};
use larder_storage::{CollectionSnapshot, DocumentStore, MemoryStore, WriteBatch, WriteData};
use std::ops::ControlFlow;

fn items() -> CollectionPath {
    CollectionPath::parse("team/t1/item").unwrap()
}

fn seeded(size: usize, rt: &tokio::runtime::Runtime) -> MemoryStore {
    let store = MemoryStore::new();
    let mut batch = WriteBatch::new();
    for i in 0..size {
        batch.set(
            items().document_with_id(&format!("doc{:06}", i)).unwrap(),
            Fields::new().with("n", i as i64),
        );
    }
    rt.block_on(store.commit(batch.into_operations())).unwrap();
    store
}

fn bench_commit(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let mut group = c.benchmark_group("commit");

    for size in [100, 1000, 10000] {
        let store = seeded(size, &rt);
        let _listener = store.listen(&items(), Box::new(|_: &CollectionSnapshot| ControlFlow::Continue(())));

        group.bench_with_input(BenchmarkId::new("update_one", size), &size, |b, _| {
            b.iter_batched(
                || {
                    let mut batch = WriteBatch::new();
                    batch.update(
                        items().document_with_id("doc000000").unwrap(),
                        WriteData::new().server_timestamp("touched"),
                    );
                    batch.into_operations()
                },
                |ops| rt.block_on(store.commit(ops)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_commit);
criterion_main!(benches);
