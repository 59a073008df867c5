//! Benchmarks for the per-frame pipeline and calibration fit

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use eye_mouse::{
    app::ControlLoop,
    blink::BlinkPair,
    calibration::{target_grid, AxisCoefficients, CalibrationModel, CalibrationSample},
    config::{BlinkConfig, Config, MotionConfig},
    eye_metrics::{eye_aspect_ratio, EyeLandmarks, EyePoints, LandmarkFrame, Point2},
    gaze_mapper::ScreenBounds,
    motion::{MotionInput, MotionStabilizer},
};
use rand::Rng;
use std::time::Duration;

const SCREEN: ScreenBounds = ScreenBounds::new(1920, 1080);

fn eye(center: Point2, opening: f64) -> EyePoints {
    let (cx, cy) = (center.x, center.y);
    [
        Point2::new(cx - 10.0, cy),
        Point2::new(cx - 4.0, cy - opening),
        Point2::new(cx + 4.0, cy - opening),
        Point2::new(cx + 10.0, cy),
        Point2::new(cx + 4.0, cy + opening),
        Point2::new(cx - 4.0, cy + opening),
    ]
}

/// A noisy recording: gaze wanders, eyes blink every second
fn recording(frames: usize) -> Vec<LandmarkFrame> {
    let mut rng = rand::thread_rng();
    (0..frames)
        .map(|i| {
            let t = i as f64 * 0.033;
            let gaze = Point2::new(
                300.0 + 120.0 * (t * 0.7).sin() + rng.gen_range(-1.0..1.0),
                240.0 + 80.0 * (t * 0.4).cos() + rng.gen_range(-1.0..1.0),
            );
            let opening = if i % 30 < 3 { 1.0 } else { 3.0 };
            LandmarkFrame::detected(
                (i * 33) as u64,
                EyeLandmarks {
                    left: eye(Point2::new(gaze.x - 30.0, gaze.y), opening),
                    right: eye(Point2::new(gaze.x + 30.0, gaze.y), opening),
                },
            )
        })
        .collect()
}

fn scaling_model() -> CalibrationModel {
    CalibrationModel {
        x: AxisCoefficients { eye_x: 3.2, eye_y: 0.1, intercept: -40.0 },
        y: AxisCoefficients { eye_x: -0.05, eye_y: 2.4, intercept: 20.0 },
    }
}

fn bench_eye_metrics(c: &mut Criterion) {
    let points = eye(Point2::new(300.0, 240.0), 3.0);
    c.bench_function("eye_aspect_ratio", |b| {
        b.iter(|| black_box(eye_aspect_ratio(black_box(&points))));
    });
}

fn bench_control_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("control_loop");
    let frames = recording(300);

    for filter in ["none", "exponential:0.5", "median:5"] {
        let mut config = Config::default();
        config.gaze_filter.kind = filter.to_string();

        group.bench_with_input(BenchmarkId::new("process_300_frames", filter), &frames, |b, frames| {
            b.iter(|| {
                let mut control = ControlLoop::new(&config, scaling_model(), SCREEN).unwrap();
                for frame in frames {
                    black_box(control.process_frame(black_box(frame)));
                }
            });
        });
    }

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    group.bench_function("stabilizer_update", |b| {
        let mut stabilizer = MotionStabilizer::new(MotionConfig::default(), SCREEN);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let target = Point2::new((i % 1920) as f64, (i % 1080) as f64);
            black_box(stabilizer.update(&MotionInput::target(target, Duration::from_millis(i * 33))))
        });
    });

    group.bench_function("blink_pair_update", |b| {
        let mut blinks = BlinkPair::new(&BlinkConfig::default());
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let ear = if i % 10 < 2 { 0.1 } else { 0.3 };
            black_box(blinks.update(ear, 0.3, Duration::from_millis(i * 33)))
        });
    });

    group.finish();
}

fn bench_calibration_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibration_fit");
    let mut rng = rand::thread_rng();
    let targets = target_grid(SCREEN, &[0.15, 0.5, 0.85]);

    for per_target in [10, 40, 120] {
        let samples: Vec<_> = targets
            .iter()
            .flat_map(|&target| {
                (0..per_target)
                    .map(|_| {
                        let gaze = Point2::new(
                            target.x / 3.0 + rng.gen_range(-2.0..2.0),
                            target.y / 2.5 + rng.gen_range(-2.0..2.0),
                        );
                        CalibrationSample::new(gaze, target)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("samples", samples.len()), &samples, |b, samples| {
            b.iter(|| black_box(CalibrationModel::fit(black_box(samples)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_eye_metrics,
    bench_control_loop,
    bench_stages,
    bench_calibration_fit
);
criterion_main!(benches);
