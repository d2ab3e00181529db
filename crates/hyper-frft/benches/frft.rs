use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hyper_frft::{analyze_threads, fft, frft, AnalysisConfig, ComplexSample, ThreadRecord};

fn signal(len: usize) -> Vec<ComplexSample> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            ComplexSample::new((t * 0.37).sin(), (t * 0.11).cos())
        })
        .collect()
}

fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft");
    for &len in &[64usize, 256, 1024, 4096] {
        let input = signal(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &input, |b, input| {
            b.iter(|| black_box(fft(black_box(input))));
        });
    }
    group.finish();
}

fn bench_fractional(c: &mut Criterion) {
    let mut group = c.benchmark_group("frft");
    for &(len, alpha) in &[(64usize, 0.5), (100, 0.5), (1024, 0.25), (1000, 1.5)] {
        let id = BenchmarkId::from_parameter(format!("{len}_a{alpha}"));
        let input = signal(len);
        group.bench_with_input(id, &input, |b, input| {
            b.iter(|| black_box(frft(black_box(input), black_box(alpha))));
        });
    }
    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_threads");
    for &count in &[16usize, 128] {
        let records: Vec<ThreadRecord> = (0..count)
            .map(|i| ThreadRecord {
                complexity: (i as f64 * 0.3).sin().abs(),
                interactions: (i % 5) as f64,
                ..ThreadRecord::default()
            })
            .collect();
        for parallel in [false, true] {
            let config = AnalysisConfig {
                parallel,
                ..AnalysisConfig::default()
            };
            let id = BenchmarkId::new(if parallel { "parallel" } else { "sequential" }, count);
            group.bench_with_input(id, &records, |b, records| {
                b.iter(|| black_box(analyze_threads(black_box(records), &config)));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_fft, bench_fractional, bench_report);
criterion_main!(benches);
