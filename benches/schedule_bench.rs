//! Benchmark suite for the scheduling pipeline
//!
//! Run with: cargo bench

use cadence::models::RawStudyItem;
use cadence::services::{IntervalPredictor, Scheduler};
use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];
const SUBJECTS: [&str; 5] = ["math", "science", "language", "history", "art"];

fn items(count: usize) -> Vec<RawStudyItem> {
    (0..count)
        .map(|i| {
            serde_json::from_value(json!({
                "item_id": format!("item-{}", i),
                "difficulty": DIFFICULTIES[i % DIFFICULTIES.len()],
                "subject": SUBJECTS[i % SUBJECTS.len()],
                "success_rate": (i % 10) as f64 / 10.0,
                "study_streak": i % 12,
                "ease_factor": 1.3 + (i % 13) as f64 * 0.1,
            }))
            .unwrap()
        })
        .collect()
}

fn bench_generate_schedule(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let batch = items(1000);
    let mut group = c.benchmark_group("generate_schedule");

    for threshold in [usize::MAX, 64] {
        let scheduler = Scheduler::new(IntervalPredictor::fallback_only(), threshold);
        let label = if threshold == usize::MAX { "sequential" } else { "parallel" };
        group.bench_with_input(BenchmarkId::new(label, batch.len()), &batch, |b, batch| {
            b.iter(|| scheduler.generate_schedule(black_box(batch), 30, now))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate_schedule);
criterion_main!(benches);
