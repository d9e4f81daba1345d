//! Reduction benchmarks.
//!
//! Benchmarks:
//! - Aggregate-only plans over growing batches
//! - Wide plans (one task per expression) on pools of different sizes
//! - Pass-through only plans (no evaluation tasks)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use colfold::expression::{AggregateFunction, BinaryOp};
use colfold::{
    Batch, Column, DataType, PlanExpr, ProjectionPlan, Reducer, ReducerConfig, Value,
};

/// Helper: Create a batch with an id, an age and a score column.
fn setup_batch(rows: usize) -> Batch {
    let mut rng = rand::thread_rng();
    Batch::from_rows(
        vec![
            Column::new("id", DataType::Int64),
            Column::new("age", DataType::Int64),
            Column::new("score", DataType::Float64),
        ],
        (0..rows)
            .map(|i| {
                vec![
                    Value::Int64(i as i64),
                    Value::Int64(rng.gen_range(18..90)),
                    Value::Float64(rng.gen_range(0.0..100.0)),
                ]
            })
            .collect(),
    )
    .unwrap()
}

fn aggregate_plan() -> ProjectionPlan {
    ProjectionPlan::new(vec![
        PlanExpr::count_star(),
        PlanExpr::aggregate(AggregateFunction::Sum, PlanExpr::column("age")),
        PlanExpr::aggregate(AggregateFunction::Avg, PlanExpr::column("score")),
    ])
}

fn wide_plan(width: usize) -> ProjectionPlan {
    let functions = [
        AggregateFunction::Sum,
        AggregateFunction::Min,
        AggregateFunction::Max,
        AggregateFunction::Avg,
    ];
    ProjectionPlan::new(
        (0..width)
            .map(|i| {
                let scaled = PlanExpr::binary(
                    PlanExpr::column("age"),
                    BinaryOp::Add,
                    PlanExpr::literal(Value::Int64(i as i64)),
                );
                PlanExpr::aggregate(functions[i % functions.len()], scaled)
            })
            .collect(),
    )
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_aggregate");
    let reducer = Reducer::default();
    let plan = aggregate_plan();

    for rows in [1_000, 10_000, 100_000] {
        let batch = setup_batch(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &batch, |b, batch| {
            b.iter(|| reducer.reduce(black_box(batch), black_box(&plan)).unwrap());
        });
    }
    group.finish();
}

fn bench_wide_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_wide_plan");
    let batch = setup_batch(10_000);
    let plan = wide_plan(16);

    for threads in [1, 2, 4, 8] {
        let reducer = Reducer::new(ReducerConfig::new().with_num_threads(threads)).unwrap();
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, _| {
            b.iter(|| reducer.reduce(black_box(&batch), black_box(&plan)).unwrap());
        });
    }
    group.finish();
}

fn bench_pass_through(c: &mut Criterion) {
    let batch = setup_batch(100_000);
    let plan = ProjectionPlan::new(vec![PlanExpr::column("id"), PlanExpr::column("score")]);
    let reducer = Reducer::default();

    c.bench_function("reduce_pass_through", |b| {
        b.iter(|| reducer.reduce(black_box(&batch), black_box(&plan)).unwrap());
    });
}

criterion_group!(benches, bench_aggregate, bench_wide_plan, bench_pass_through);
criterion_main!(benches);
