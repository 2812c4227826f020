//! Benchmarks for folder-scan
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folder_scan::snapshot::{FolderId, Snapshot};
use std::sync::Arc;

/// Synthetic tree: `fanout` folders per level, `files` files per folder
fn synthetic_snapshot(depth: usize, fanout: usize, files: usize) -> Snapshot {
    let mut snap = Snapshot::new("bench", "/bench");
    let mut level = vec![snap.root_id()];

    for d in 0..depth {
        let mut next = Vec::with_capacity(level.len() * fanout);
        for &parent in &level {
            for f in 0..files {
                snap.add_file(parent, format!("file{}", f), (d * 1000 + f) as i64);
            }
            for s in 0..fanout {
                next.push(snap.add_folder(parent, format!("dir{}", s)));
            }
        }
        level = next;
    }

    snap.aggregate();
    snap
}

fn benchmark_queue_operations(c: &mut Criterion) {
    use folder_scan::walker::{TaskTracker, WorkQueue};

    c.bench_function("queue_enqueue_recv", |b| {
        let tracker = Arc::new(TaskTracker::new());
        let queue = WorkQueue::new(10000, Arc::clone(&tracker));
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let dispatcher = queue.spawn_dispatcher(stop_rx.clone()).unwrap();
        let sender = queue.sender();
        let receiver = queue.receiver();

        b.iter(|| {
            sender.enqueue("/test/path".into(), 5);
            let task = receiver.recv_or_stop(&stop_rx).unwrap();
            tracker.begin();
            tracker.finish();
            black_box(task);
        });

        drop(stop_tx);
        dispatcher.join().unwrap();
    });
}

fn benchmark_aggregate(c: &mut Criterion) {
    let snap = synthetic_snapshot(5, 6, 8);

    c.bench_function("aggregate_9k_folders", |b| {
        b.iter_batched(
            || snap.clone(),
            |mut s| {
                s.aggregate();
                black_box(s.total_size())
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn benchmark_diff(c: &mut Criterion) {
    let old = synthetic_snapshot(5, 6, 8);
    let mut cur = old.clone();
    let extra = cur.add_folder(FolderId::ROOT, "extra");
    cur.add_file(extra, "new.bin", 4096);
    cur.aggregate();

    c.bench_function("diff_9k_folders", |b| {
        b.iter(|| black_box(folder_scan::diff::diff(&old, &cur).unwrap()))
    });
}

criterion_group!(benches, benchmark_queue_operations, benchmark_aggregate, benchmark_diff);
criterion_main!(benches);
