use chrono::NaiveDate;
use common::{Loan, LoanId};
use consumer::{
    ConsumerConfig, EventConsumer, EventEnvelope, InMemoryNotifier, InMemoryQueue,
    PEMINJAMAN_CREATED, PENGEMBALIAN_CREATED,
};
use criterion::{Criterion, criterion_group, criterion_main};
use loan_store::InMemoryLoanRepository;
use serde_json::{Value, json};

use std::sync::Arc;

fn return_event(id: i64) -> Value {
    EventEnvelope::new(PENGEMBALIAN_CREATED)
        .with_correlation_id(format!("corr-{id}"))
        .with_data(json!({ "peminjamanId": id }))
        .to_value()
}

fn repository_with(n: i64) -> InMemoryLoanRepository {
    let borrowed_on = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    InMemoryLoanRepository::with_loans(
        (1..=n).map(|id| Loan::borrowed(LoanId::new(id), id, id, borrowed_on)),
    )
}

fn bench_process_single_return(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let consumer = EventConsumer::new(
        repository_with(1),
        InMemoryNotifier::new(),
        ConsumerConfig::default(),
    );
    let mut worker = consumer.worker(0);
    let body = return_event(1).to_string().into_bytes();

    c.bench_function("consumer/process_single_return", |b| {
        b.iter(|| {
            rt.block_on(async {
                worker.process(&body).await;
            });
        });
    });
}

fn bench_process_single_created(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let consumer = EventConsumer::new(
        repository_with(0),
        InMemoryNotifier::new(),
        ConsumerConfig::default(),
    );
    let mut worker = consumer.worker(0);
    let body = EventEnvelope::new(PEMINJAMAN_CREATED)
        .with_correlation_id("corr-created")
        .with_data(json!({"id": 1, "anggotaId": 7, "bukuId": 3}))
        .to_value()
        .to_string()
        .into_bytes();

    c.bench_function("consumer/process_single_created", |b| {
        b.iter(|| {
            rt.block_on(async {
                worker.process(&body).await;
            });
        });
    });
}

fn bench_drain_queue(c: &mut Criterion, workers: usize) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let consumer = EventConsumer::new(
        repository_with(1000),
        InMemoryNotifier::new(),
        ConsumerConfig::default().with_workers(workers),
    );
    let messages: Vec<Value> = (1..=1000).map(return_event).collect();

    c.bench_function(&format!("consumer/drain_1000_returns_{workers}_workers"), |b| {
        b.iter(|| {
            rt.block_on(async {
                let queue = Arc::new(InMemoryQueue::new(consumer.config().queue.clone()));
                for message in &messages {
                    queue.publish(message).await.unwrap();
                }
                queue.close().await;
                consumer.run(queue).await;
            });
        });
    });
}

fn bench_drain_single_worker(c: &mut Criterion) {
    bench_drain_queue(c, 1);
}

fn bench_drain_worker_pool(c: &mut Criterion) {
    bench_drain_queue(c, 4);
}

criterion_group!(
    benches,
    bench_process_single_return,
    bench_process_single_created,
    bench_drain_single_worker,
    bench_drain_worker_pool,
);
criterion_main!(benches);
