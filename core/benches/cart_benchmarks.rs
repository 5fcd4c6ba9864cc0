use cartstore::{CartEngine, MemoryStore};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime; // To run async code within Criterion

fn fresh_engine() -> CartEngine {
  CartEngine::new(Arc::new(MemoryStore::new()))
}

// --- Benchmark Functions ---

fn bench_add_same_product(c: &mut Criterion) {
  let mut group = c.benchmark_group("AddSameProduct");
  let rt = Runtime::new().unwrap();
  let engine = fresh_engine();

  group.throughput(Throughput::Elements(1));
  group.bench_function("add_plus_one", |b| {
    b.to_async(&rt).iter(|| {
      let engine = engine.clone();
      async move { engine.add("bench_user", "prod1", 1).await.unwrap() }
    });
  });
  group.finish();
}

fn bench_add_then_remove(c: &mut Criterion) {
  let mut group = c.benchmark_group("AddThenRemove");
  let rt = Runtime::new().unwrap();
  let engine = fresh_engine();

  // Exercises the increment -> delete -> expire path on every second call.
  group.bench_function("net_zero_pair", |b| {
    b.to_async(&rt).iter(|| {
      let engine = engine.clone();
      async move {
        engine.add("bench_user", "prod1", 1).await.unwrap();
        engine.add("bench_user", "prod1", -1).await.unwrap();
      }
    });
  });
  group.finish();
}

fn bench_get_cart_by_size(c: &mut Criterion) {
  let mut group = c.benchmark_group("GetCart");
  let rt = Runtime::new().unwrap();

  for items in [1usize, 10, 100].iter() {
    let engine = fresh_engine();
    rt.block_on(async {
      for i in 0..*items {
        engine.update("bench_user", &format!("prod{}", i), 2).await.unwrap();
      }
    });

    group.throughput(Throughput::Elements(*items as u64));
    group.bench_with_input(BenchmarkId::from_parameter(items), items, |b, _| {
      b.to_async(&rt).iter(|| {
        let engine = engine.clone();
        async move { engine.get_cart("bench_user").await.unwrap() }
      });
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_add_same_product,
  bench_add_then_remove,
  bench_get_cart_by_size
);
criterion_main!(benches);
