use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use step_report::TestCaseReport;
use step_report::reporting::{run_unit, run_unit_async};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

fn build_report(width: usize, depth: usize) -> TestCaseReport {
    fn nest(tracker: &step_report::Tracker, width: usize, depth: usize) {
        if depth == 0 {
            tracker.attach("payload", vec![0xCEu8; 64], Some("application/octet-stream"));
            return;
        }
        for i in 0..width {
            tracker.step(format!("level-{depth}-{i}"), || nest(tracker, width, depth - 1));
        }
    }

    run_unit("bench_report", |tracker| {
        nest(tracker, width, depth);
        Ok(())
    })
}

fn bench_render_test_case(c: &mut Criterion) {
    let report = build_report(4, 4);

    c.bench_function("render_test_case", |b| {
        b.iter(|| black_box(report.to_xml()));
    });
}

fn bench_track_steps(c: &mut Criterion) {
    c.bench_function("track_steps", |b| {
        b.iter(|| black_box(build_report(3, 3)));
    });
}

fn bench_async_unit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("run_unit_async", |b| {
        b.to_async(&rt).iter(|| async {
            let report = run_unit_async("bench_async", None, CancellationToken::new(), |tracker| async move {
                tracker
                    .step_async("awaited", async { tokio::task::yield_now().await })
                    .await;
                Ok(())
            })
            .await;
            black_box(report)
        });
    });
}

criterion_group!(benches, bench_render_test_case, bench_track_steps, bench_async_unit);
criterion_main!(benches);
