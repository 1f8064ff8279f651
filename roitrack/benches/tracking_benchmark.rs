//! Benchmarks for the built-in trackers and the multi-tracker update

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{GrayImage, Rgb, RgbImage};
use roitrack::{luma, MultiTracker, Roi, TemplateFactory, TrackerKind};
use std::hint::black_box;

/// Frame with a bright textured square moving right by `offset` pixels
fn create_test_frame(offset: u32) -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        let inside = x >= 100 + offset && x < 160 + offset && y >= 200 && y < 260;
        let texture = ((x.wrapping_mul(31) ^ y.wrapping_mul(17)) % 64) as u8;
        if inside {
            Rgb([128 + texture, 100 + texture, 90])
        } else {
            Rgb([texture / 4, texture / 4, texture / 4])
        }
    })
}

fn bench_multi_tracker_update(c: &mut Criterion) {
    let first = create_test_frame(0);
    let frames: Vec<GrayImage> = (1..10).map(|i| luma(&create_test_frame(i * 2))).collect();
    let mut group = c.benchmark_group("multi_tracker_update");

    for kind in [TrackerKind::Kcf, TrackerKind::Csrt, TrackerKind::Tld] {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter_batched(
                || {
                    let rois = [
                        Roi::new(95.0, 195.0, 70.0, 70.0),
                        Roi::new(400.0, 100.0, 50.0, 50.0),
                    ];
                    MultiTracker::init_all(&TemplateFactory::default(), kind, &first, &rois)
                        .unwrap()
                },
                |mut tracker| {
                    for frame in &frames {
                        let _regions = tracker.update(black_box(frame)).unwrap();
                    }
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_multi_tracker_update);
criterion_main!(benches);
