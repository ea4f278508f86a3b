use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stereo_synth_rs::stereo_pipeline::depth::{DepthEstimator, GradientDepthEstimator};
use stereo_synth_rs::stereo_pipeline::frame::{DepthMap, Frame};
use stereo_synth_rs::stereo_pipeline::render::{
    AnaglyphMode, DisparityMapper, FormatComposer, HoleFillMethod, HoleFillSettings, HoleFiller,
    OutputFormat, RenderParams, ViewWarper,
};

/// Gradient content with thin black stripes that the hole filler has to repair.
fn generate_mock_frame(width: usize, height: usize) -> Frame {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            if x % 64 < 2 {
                data.extend_from_slice(&[0, 0, 0]);
                continue;
            }
            let value = ((x + y) % 256) as u8;
            data.extend_from_slice(&[value, 255 - value, 128]);
        }
    }
    Frame::new(width, height, 1, data).unwrap()
}

/// Left half near, right half far.
fn generate_step_depth(width: usize, height: usize) -> DepthMap {
    let data = (0..width * height)
        .map(|i| if i % width < width / 2 { 0.1 } else { 0.9 })
        .collect();
    DepthMap::new(width, height, data).unwrap()
}

fn render(
    frame: &Frame,
    depth: &DepthMap,
    format: OutputFormat,
    method: HoleFillMethod,
) -> Frame {
    let mapper = DisparityMapper::new(RenderParams::default());
    let warper = ViewWarper::new();
    let filler = HoleFiller::new(HoleFillSettings {
        method,
        ..HoleFillSettings::default()
    });
    let composer = FormatComposer::new(format);

    let disparity = mapper.compute(depth);
    let pair = warper.render_pair(frame, &disparity).unwrap();
    let pair = filler.fill(pair).unwrap();
    composer.compose_pair(&pair).unwrap()
}

fn benchmark_render_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_by_size");
    group.sample_size(20);

    let sizes = vec![
        (320, 180, "320x180"),
        (640, 360, "640x360"),
        (1280, 720, "1280x720"),
    ];

    for (width, height, label) in sizes {
        let frame = generate_mock_frame(width, height);
        let depth = generate_step_depth(width, height);

        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &(frame, depth),
            |b, (frame, depth)| {
                b.iter(|| {
                    render(
                        black_box(frame),
                        black_box(depth),
                        OutputFormat::HalfSideBySide,
                        HoleFillMethod::Inpaint,
                    )
                });
            },
        );
    }

    group.finish();
}

fn benchmark_output_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_formats");
    let frame = generate_mock_frame(640, 360);
    let depth = generate_step_depth(640, 360);

    let formats = vec![
        (OutputFormat::HalfSideBySide, "half-sbs"),
        (OutputFormat::FullSideBySide, "full-sbs"),
        (
            OutputFormat::TopBottom {
                half_resolution: true,
            },
            "top-bottom",
        ),
        (OutputFormat::Anaglyph(AnaglyphMode::RedCyan), "anaglyph"),
    ];

    for (format, label) in formats {
        group.bench_with_input(BenchmarkId::from_parameter(label), &format, |b, format| {
            b.iter(|| {
                render(
                    black_box(&frame),
                    black_box(&depth),
                    *format,
                    HoleFillMethod::Inpaint,
                )
            });
        });
    }

    group.finish();
}

fn benchmark_hole_fill_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("hole_fill_methods");
    group.sample_size(10);
    let frame = generate_mock_frame(320, 180);
    let depth = generate_step_depth(320, 180);

    for (method, label) in [
        (HoleFillMethod::Inpaint, "inpaint"),
        (HoleFillMethod::Nearest, "nearest"),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &method, |b, method| {
            b.iter(|| {
                render(
                    black_box(&frame),
                    black_box(&depth),
                    OutputFormat::HalfSideBySide,
                    *method,
                )
            });
        });
    }

    group.finish();
}

fn benchmark_gradient_depth(c: &mut Criterion) {
    let estimator = GradientDepthEstimator::default();
    let frame = generate_mock_frame(640, 360);

    c.bench_function("gradient_depth_640x360", |b| {
        b.iter(|| estimator.estimate(black_box(&frame)).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_render_sizes,
    benchmark_output_formats,
    benchmark_hole_fill_methods,
    benchmark_gradient_depth
);
criterion_main!(benches);
