use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use depthfuse_core::{Colors, PointCloud};
use depthfuse_filters::voxel_downsample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Points inside a 2 m cube, roughly the extent of a room-scale capture.
fn random_colored_cloud(n: usize) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(7);
    let mut coord = |_| rng.gen_range(-1.0f32..1.0);
    let x = (0..n).map(&mut coord).collect();
    let y = (0..n).map(&mut coord).collect();
    let z = (0..n).map(&mut coord).collect();
    let mut colors = Colors::with_capacity(n);
    for i in 0..n {
        let v = (i % 256) as f32 / 255.0;
        colors.r.push(v);
        colors.g.push(1.0 - v);
        colors.b.push(0.5);
    }
    PointCloud::from_xyz_rgb(x, y, z, colors)
}

fn bench_voxel(c: &mut Criterion) {
    let mut group = c.benchmark_group("voxel_downsample");
    for size in [19_200, 172_800, 1_000_000] {
        let cloud = random_colored_cloud(size);
        for voxel in [0.005f32, 0.05] {
            group.bench_with_input(
                BenchmarkId::new(format!("voxel_{voxel}"), size),
                &cloud,
                |b, cloud| b.iter(|| voxel_downsample(cloud, voxel)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_voxel);
criterion_main!(benches);
