/*!
 * Resource Hot-Path Benchmarks
 * Borrow/give-back cycle and guarded engine execution
 */

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ml_resource_manager::{BufferPool, Engine, EngineRegistry, MemoryMonitor, PixelFormat};
use std::sync::Arc;

struct NoopEngine;

impl Engine for NoopEngine {
    fn close(&mut self) {}
}

fn bench_borrow_give_back(c: &mut Criterion) {
    let monitor = Arc::new(MemoryMonitor::new(64 * 1024 * 1024));
    let pool = BufferPool::new(8, Arc::clone(&monitor));

    c.bench_function("pool_borrow_give_back", |b| {
        b.iter(|| {
            let buffer = pool
                .borrow(black_box(256), black_box(256), PixelFormat::Rgba8888)
                .unwrap();
            pool.give_back(buffer);
        });
    });
}

fn bench_guarded_execution(c: &mut Criterion) {
    let registry = EngineRegistry::new();
    registry.register("pose", NoopEngine);

    c.bench_function("registry_with_engine", |b| {
        b.iter(|| {
            let outcome = registry.with_engine("pose", |_| Ok(black_box(1u64)));
            black_box(outcome.is_success());
        });
    });
}

criterion_group!(benches, bench_borrow_give_back, bench_guarded_execution);
criterion_main!(benches);
