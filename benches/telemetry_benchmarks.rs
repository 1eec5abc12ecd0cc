//! Record-path benchmarks.
//!
//! The record operations sit on user-serving hot paths, so their cost is the
//! one number worth watching.

use std::sync::Arc;

use chrono::Duration;
use criterion::{criterion_group, criterion_main, Criterion};
use plant_telemetry::metrics::{DetectedDisease, IrrigationPrediction, MetricsEngine};
use plant_telemetry::traits::RealTimeProvider;

fn bench_record_assistant_turn(c: &mut Criterion) {
    let engine = MetricsEngine::new(Arc::new(RealTimeProvider));
    let start = chrono::Utc::now();
    let end = start + Duration::milliseconds(1200);

    c.bench_function("record_assistant_turn", |b| {
        b.iter(|| {
            let _ = engine.record_assistant_turn(start, end, true, false, Some(4));
        });
    });
}

fn bench_record_diagnosis(c: &mut Criterion) {
    let engine = MetricsEngine::new(Arc::new(RealTimeProvider));
    let start = chrono::Utc::now();
    let end = start + Duration::milliseconds(800);
    let diseases = [DetectedDisease::new("leaf_spot")];

    c.bench_function("record_diagnosis", |b| {
        b.iter(|| {
            let _ = engine.record_diagnosis(start, end, 0.9, &diseases, None);
        });
    });
}

fn bench_record_api_call(c: &mut Criterion) {
    let engine = MetricsEngine::new(Arc::new(RealTimeProvider));

    c.bench_function("record_api_call", |b| {
        b.iter(|| engine.record_api_call());
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let engine = MetricsEngine::new(Arc::new(RealTimeProvider));
    let prediction = IrrigationPrediction {
        should_water: Some(true),
        water_amount_ml: None,
    };
    for _ in 0..1000 {
        let _ = engine.record_irrigation_prediction(0.8, &prediction, Some(true), None);
    }

    c.bench_function("snapshot_1k_observations", |b| {
        b.iter(|| engine.snapshot());
    });
}

criterion_group!(
    benches,
    bench_record_assistant_turn,
    bench_record_diagnosis,
    bench_record_api_call,
    bench_snapshot
);
criterion_main!(benches);
