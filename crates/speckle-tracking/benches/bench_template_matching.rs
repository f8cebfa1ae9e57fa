use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use speckle_image::Image;
use speckle_tracking::{Domain, Metric, TemplateMatching, TemplateMatchingConfig};

fn frame(width: usize, height: usize, shift: usize) -> Image<u8, 1> {
    Image::from_fn([width, height].into(), |x, y, _| {
        let (x, y) = ((x + shift) as f32, (y + shift) as f32);
        (128.0 + 60.0 * (0.21 * x + 0.13 * y).sin() + 50.0 * (0.37 * y - 0.11 * x).cos()) as u8
    })
}

fn bench_template_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("TemplateMatching");

    for (width, height) in [(128, 128), (256, 256)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);
        let first = frame(*width, *height, 0);
        let second = frame(*width, *height, 3);

        for (domain, metric, layers) in [
            (Domain::Spatial, Metric::Sad, 0),
            (Domain::Spatial, Metric::Sad, 2),
            (Domain::Spatial, Metric::Ncc, 2),
            (Domain::Frequency, Metric::Ncc, 0),
        ] {
            let config = TemplateMatchingConfig {
                domain,
                metric,
                layers,
                ..Default::default()
            };
            let mut tracker = TemplateMatching::new(&first, config).unwrap();
            let name = format!("{}_l{layers}", tracker.peak_finder().name());

            group.bench_with_input(
                BenchmarkId::new(name, &parameter_string),
                &(&first, &second),
                |b, (first, second)| {
                    b.iter(|| {
                        black_box(tracker.estimate_displacement(*second)).unwrap();
                        black_box(tracker.estimate_displacement(*first)).unwrap();
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_template_matching);
criterion_main!(benches);
