use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Money, Order, Step, User};
use queue_store::{InMemoryQueueStore, QueueStore, Task};
use std::time::Duration;

fn make_task(step: Step) -> Task {
    let user = User::new("Jim", "ABCD").unwrap();
    let order = Order::new(user, "book", Money::from_dollars(10)).unwrap();
    Task::new(order, step, Duration::from_secs(240))
}

fn bench_enqueue_single(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("queue_store/enqueue_single", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryQueueStore::new();
                store.enqueue(make_task(Step::Shipping)).await.unwrap();
            });
        });
    });
}

fn bench_enqueue_dequeue_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("queue_store/enqueue_dequeue_cycle", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryQueueStore::new();
                let id = store.enqueue(make_task(Step::Shipping)).await.unwrap();
                let task = store.dequeue_next().await.unwrap().unwrap();
                store.update_attempts(task.id, task.attempts + 1).await.unwrap();
                store.remove(id).await.unwrap();
            });
        });
    });
}

fn bench_dequeue_from_depth_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("queue_store/dequeue_from_depth_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryQueueStore::new();
                for step in Step::ALL {
                    for _ in 0..25 {
                        store.enqueue(make_task(step)).await.unwrap();
                    }
                }
                store.dequeue_next().await.unwrap().unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_enqueue_single,
    bench_enqueue_dequeue_cycle,
    bench_dequeue_from_depth_100
);
criterion_main!(benches);
