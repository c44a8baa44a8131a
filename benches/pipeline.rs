use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spectrometer::acquisition::decode_frame;
use spectrometer::config::{Settings, DEFAULT_PIXEL_COUNT};
use spectrometer::pipeline::{correct, resample};

/// Synthetic frame with a few emission lines on a flat baseline
fn synthetic_frame(pixels: usize) -> Vec<u16> {
    (0..pixels)
        .map(|p| {
            let x = p as f64;
            let line = |center: f64, amp: f64| {
                let d = (x - center) / 4.0;
                amp * (-0.5 * d * d).exp()
            };
            (1200.0 + line(800.0, 30000.0) + line(1900.0, 52000.0) + line(3100.0, 9000.0))
                .min(65535.0) as u16
        })
        .collect()
}

/// Benchmark dark subtraction and calibration of a full sensor frame
fn bench_correct(c: &mut Criterion) {
    let mut group = c.benchmark_group("correct");

    for pixels in [1024, DEFAULT_PIXEL_COUNT] {
        let frame = synthetic_frame(pixels);
        let settings = Settings {
            dark_frame: vec![1000; pixels],
            ..Default::default()
        };

        group.throughput(Throughput::Elements(pixels as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}px", pixels)),
            &frame,
            |b, frame| b.iter(|| black_box(correct(frame, &settings))),
        );
    }

    group.finish();
}

/// Benchmark bin averaging at common display resolutions
fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    let corrected = correct(&synthetic_frame(DEFAULT_PIXEL_COUNT), &Settings::default());
    group.throughput(Throughput::Elements(DEFAULT_PIXEL_COUNT as u64));

    for resolution in [256, 1024, DEFAULT_PIXEL_COUNT] {
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &resolution,
            |b, &resolution| b.iter(|| black_box(resample(&corrected, resolution))),
        );
    }

    group.finish();
}

/// Benchmark the full frame path: wire decode, correct, resample
fn bench_frame_to_display(c: &mut Criterion) {
    let payload: Vec<u8> = synthetic_frame(DEFAULT_PIXEL_COUNT)
        .into_iter()
        .flat_map(u16::to_le_bytes)
        .collect();
    let settings = Settings::default();

    let mut group = c.benchmark_group("frame_to_display");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("decode_correct_resample", |b| {
        let mut samples = Vec::with_capacity(DEFAULT_PIXEL_COUNT);
        b.iter(|| {
            decode_frame(black_box(&payload), &mut samples).unwrap();
            let corrected = correct(&samples, &settings);
            black_box(resample(&corrected, settings.resample_resolution))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_correct, bench_resample, bench_frame_to_display);
criterion_main!(benches);
