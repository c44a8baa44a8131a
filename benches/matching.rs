use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spectrometer::library::{ReferenceElement, ReferenceLine};
use spectrometer::matching::{score, MatchMethod};

fn gaussian(len: usize, center: f64, width: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let d = (i as f64 - center) / width;
            (-0.5 * d * d).exp()
        })
        .collect()
}

/// Benchmark each scoring method on display-sized signals
fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let len = 1231;
    let sample = gaussian(len, 600.0, 5.0);
    let reference = gaussian(len, 603.0, 4.0);
    group.throughput(Throughput::Elements(len as u64));

    for method in MatchMethod::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(method.as_str()),
            &method,
            |b, &method| b.iter(|| black_box(score(&sample, &reference, method))),
        );
    }

    group.finish();
}

/// Benchmark interpolating reference lines onto a measurement axis
fn bench_get_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_window");
    let axis: Vec<f64> = (0..20_000).map(|i| 200.0 + i as f64 * 0.035).collect();
    let mut element = ReferenceElement::new("Fe", axis.clone());
    for (n, center) in [2000.0, 7000.0, 12000.0, 17000.0].into_iter().enumerate() {
        element = element.with_line(ReferenceLine::new(
            format!("Fe {}", n + 1),
            gaussian(axis.len(), center, 12.0),
        ));
    }

    for bins in [256usize, 1231] {
        let targets: Vec<f64> = (0..bins)
            .map(|i| 450.0 + i as f64 * (400.0 / bins as f64))
            .collect();
        group.throughput(Throughput::Elements(bins as u64));
        group.bench_with_input(BenchmarkId::from_parameter(bins), &targets, |b, targets| {
            b.iter(|| black_box(element.get_window(targets, None)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_score, bench_get_window);
criterion_main!(benches);
