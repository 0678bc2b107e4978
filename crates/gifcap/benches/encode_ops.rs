//! Encode Operations Benchmarks
//!
//! Benchmarks for GIF encoding, frame resizing and store throughput.
//!
//! Run with: `cargo bench --bench encode_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gifcap::{encode_gif, EncodeSettings, Frame, FrameStore, PriorityHint, SessionId};

fn gradient(width: u32, height: u32, shift: u32) -> Frame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                ((x + shift) % 256) as u8,
                ((y * 3 + shift) % 256) as u8,
                ((x ^ y) % 256) as u8,
                255,
            ]);
        }
    }
    Frame::new(width, height, data).unwrap()
}

fn bench_encode_gif(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_gif");
    group.sample_size(10);

    for frame_count in [1usize, 10, 50] {
        let frames: Vec<Frame> = (0..frame_count)
            .map(|i| gradient(64, 48, i as u32 * 8))
            .collect();
        let settings = EncodeSettings::default();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_frames", frame_count)),
            &frames,
            |bench, frames: &Vec<Frame>| {
                bench.iter(|| {
                    let bytes = encode_gif(black_box(frames), black_box(&settings)).unwrap();
                    black_box(bytes);
                });
            },
        );
    }

    group.finish();
}

fn bench_encode_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_quality");
    group.sample_size(10);

    let frames: Vec<Frame> = (0..10).map(|i| gradient(64, 48, i * 8)).collect();
    for quality in [10u8, 50, 100] {
        let settings = EncodeSettings {
            quality,
            ..EncodeSettings::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(quality), &settings, |bench, s| {
            bench.iter(|| {
                let bytes = encode_gif(black_box(&frames), black_box(s)).unwrap();
                black_box(bytes);
            });
        });
    }

    group.finish();
}

fn bench_frame_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_resize");

    let frame = gradient(320, 240, 0);
    for ratio in [0.25f32, 0.5, 1.0] {
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ratio, |bench, r| {
            bench.iter(|| {
                let resized = frame.resized(black_box(*r)).unwrap();
                black_box(resized);
            });
        });
    }

    group.finish();
}

fn bench_store_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_push");

    let frame = gradient(32, 32, 0);
    for capacity in [50usize, 500] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |bench, &cap| {
                let store = FrameStore::new(cap);
                bench.iter(|| {
                    store.start(SessionId::new("bench", 0), PriorityHint::Normal, cap);
                    for _ in 0..cap {
                        black_box(store.push(frame.clone()));
                    }
                    black_box(store.snapshot());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_gif,
    bench_encode_quality,
    bench_frame_resize,
    bench_store_push
);
criterion_main!(benches);
