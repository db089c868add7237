use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use depthfuse_depth::{backproject, backproject_depth_only, DepthGrid, PinholeIntrinsics};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_frame(width: usize, height: usize) -> (DepthGrid, RgbImage) {
    let mut rng = StdRng::seed_from_u64(42);
    // about 10% invalid or out of range
    let data = (0..width * height)
        .map(|_| rng.gen_range(0u16..5500))
        .collect();
    let color = RgbImage::from_fn(width as u32, height as u32, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    (DepthGrid::new(width, height, data), color)
}

fn bench_backproject(c: &mut Criterion) {
    let mut group = c.benchmark_group("backproject");
    for (w, h) in [(160, 120), (640, 480), (1280, 720)] {
        let (depth, color) = random_frame(w, h);
        let intrinsics = PinholeIntrinsics::from_vertical_fov(w, h, 60.0);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{h}")),
            &(depth, color),
            |b, (depth, color)| b.iter(|| backproject(depth, color, &intrinsics)),
        );
    }
    group.finish();
}

fn bench_backproject_depth_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("backproject_depth_only");
    for (w, h) in [(160, 120), (640, 480), (1280, 720)] {
        let (depth, _) = random_frame(w, h);
        let intrinsics = PinholeIntrinsics::from_vertical_fov(w, h, 60.0);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{h}")),
            &depth,
            |b, depth| b.iter(|| backproject_depth_only(depth, &intrinsics)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_backproject, bench_backproject_depth_only);
criterion_main!(benches);
