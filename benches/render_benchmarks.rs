use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use collabviz::{Dataset, DatasetBuilder, Level, MetricSpec, MetricView, Selection};
use std::sync::Arc;

/// Synthetic dataset: `projects` projects, 20 meetings each, 6 speakers per meeting
fn dataset(projects: i64) -> Arc<Dataset> {
    let mut builder = DatasetBuilder::new(["degree_centrality", "gini_coefficient"]);
    for project in 1..=projects {
        for meeting in 1..=20 {
            for speaker in 1..=6 {
                let x = (project * 31 + meeting * 7 + speaker) as f64;
                builder
                    .push(project, meeting, speaker, &[Some((x % 100.0) / 100.0), Some((x % 17.0) / 17.0)])
                    .unwrap();
            }
        }
    }
    Arc::new(builder.build())
}

fn view(projects: i64) -> MetricView {
    MetricView::new(
        dataset(projects),
        MetricSpec::new("degree-centrality", "degree_centrality", "Degree Centrality"),
    )
    .unwrap()
}

/// Benchmark per-speaker trend rendering over one project
fn bench_trend(c: &mut Criterion) {
    let mut group = c.benchmark_group("trend_render");

    for size in [10, 100, 1000].iter() {
        let v = view(*size);
        let selection = Selection::empty().with(Level::Project, [1]);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| criterion::black_box(v.render(&selection)));
        });
    }
    group.finish();
}

/// Benchmark aggregate bar rendering with the color mapping
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_render");

    for size in [10, 100, 1000].iter() {
        let v = view(*size);
        let selection = Selection::empty()
            .with(Level::Project, 1..=(*size).min(10))
            .with(Level::Meeting, 1..=10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| criterion::black_box(v.render(&selection)));
        });
    }
    group.finish();
}

/// Benchmark a full filter round trip: normalize, options and chart
fn bench_view_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_state");

    for size in [10, 100, 1000].iter() {
        let v = view(*size);
        let selection = Selection::empty()
            .with(Level::Project, [1, 2])
            .with(Level::Meeting, [3])
            .with(Level::Speaker, [1, 2, 99]);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| criterion::black_box(v.state(&selection, None)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_trend, bench_aggregate, bench_view_state);
criterion_main!(benches);
