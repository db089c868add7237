use depthfuse_core::{Colors, PointCloud};
use hashbrown::HashMap;

/// Voxel edge in metres (5 mm).
pub const DEFAULT_VOXEL_SIZE: f32 = 0.005;

#[derive(Default, Clone, Copy)]
struct VoxelAccum {
    sx: f64,
    sy: f64,
    sz: f64,
    sr: f64,
    sg: f64,
    sb: f64,
    n: usize,
}

type VoxelKey = (i64, i64, i64);

fn voxel_key(p: [f32; 3], voxel_size: f32) -> VoxelKey {
    (
        (p[0] / voxel_size).floor() as i64,
        (p[1] / voxel_size).floor() as i64,
        (p[2] / voxel_size).floor() as i64,
    )
}

/// Merge all points sharing a voxel cell into their centroid.
///
/// Colors, when present, are averaged the same way. Output is ordered by
/// voxel index so the result is deterministic. Non-finite points are dropped.
///
/// A centroid stays inside the cell it was computed from, so running this
/// again with the same `voxel_size` returns the same number of points.
///
/// # Panics
///
/// Panics if `voxel_size` is not finite and positive.
pub fn voxel_downsample(cloud: &PointCloud, voxel_size: f32) -> PointCloud {
    assert!(
        voxel_size.is_finite() && voxel_size > 0.0,
        "voxel_size must be > 0 and finite"
    );

    if cloud.is_empty() {
        return PointCloud::new();
    }

    let mut bins: HashMap<VoxelKey, VoxelAccum> = HashMap::new();

    for i in 0..cloud.len() {
        let p = cloud.point(i);
        if !p.iter().all(|v| v.is_finite()) {
            continue;
        }

        let entry = bins.entry(voxel_key(p, voxel_size)).or_default();
        entry.sx += p[0] as f64;
        entry.sy += p[1] as f64;
        entry.sz += p[2] as f64;
        if let Some(c) = cloud.color(i) {
            entry.sr += c[0] as f64;
            entry.sg += c[1] as f64;
            entry.sb += c[2] as f64;
        }
        entry.n += 1;
    }

    if bins.is_empty() {
        return PointCloud::new();
    }

    let mut cells: Vec<(VoxelKey, VoxelAccum)> = bins.into_iter().collect();
    cells.sort_unstable_by_key(|(key, _)| *key);

    let n = cells.len();
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n);
    let mut colors = Colors::with_capacity(if cloud.has_colors() { n } else { 0 });

    for (key, a) in cells {
        let denom = a.n as f64;
        let centroid = [
            (a.sx / denom) as f32,
            (a.sy / denom) as f32,
            (a.sz / denom) as f32,
        ];
        let [cx, cy, cz] = clamp_to_cell(centroid, key, voxel_size);
        x.push(cx);
        y.push(cy);
        z.push(cz);

        if cloud.has_colors() {
            colors.r.push((a.sr / denom) as f32);
            colors.g.push((a.sg / denom) as f32);
            colors.b.push((a.sb / denom) as f32);
        }
    }

    if cloud.has_colors() {
        PointCloud::from_xyz_rgb(x, y, z, colors)
    } else {
        PointCloud::from_xyz(x, y, z)
    }
}

/// Rounding to f32 can push a centroid onto a neighbouring cell boundary;
/// nudge it back so re-binning sees the same cell.
fn clamp_to_cell(p: [f32; 3], key: VoxelKey, voxel_size: f32) -> [f32; 3] {
    let mut out = p;
    let cell = [key.0, key.1, key.2];
    for axis in 0..3 {
        let mut v = out[axis];
        let mut guard = 0;
        while (v / voxel_size).floor() as i64 > cell[axis] && guard < 8 {
            v = prev_float(v);
            guard += 1;
        }
        while ((v / voxel_size).floor() as i64) < cell[axis] && guard < 16 {
            v = next_float(v);
            guard += 1;
        }
        out[axis] = v;
    }
    out
}

fn next_float(v: f32) -> f32 {
    if v == 0.0 {
        return f32::from_bits(1);
    }
    let bits = v.to_bits();
    if v > 0.0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

fn prev_float(v: f32) -> f32 {
    -next_float(-v)
}

#[cfg(test)]
mod tests {
    use super::voxel_downsample;
    use depthfuse_core::{Colors, PointCloud};
    use proptest::prelude::*;

    #[test]
    fn voxel_downsample_reduces_points() {
        let cloud = PointCloud::from_xyz(
            vec![0.0, 0.5, 0.0, 0.5, 0.0, 0.5, 0.0, 0.5],
            vec![0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 0.5, 0.5],
            vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 0.5],
        );
        let out = voxel_downsample(&cloud, 1.0);
        assert_eq!(out.len(), 1);
        assert!((out.x[0] - 0.25).abs() < 1e-6);
        assert!((out.y[0] - 0.25).abs() < 1e-6);
        assert!((out.z[0] - 0.25).abs() < 1e-6);
        assert!(!out.has_colors());
    }

    #[test]
    fn points_one_millimetre_apart_merge() {
        let cloud = PointCloud::from_xyz_rgb(
            vec![0.0011, 0.0021],
            vec![0.001, 0.001],
            vec![-1.0021, -1.0021],
            Colors {
                r: vec![0.0, 1.0],
                g: vec![0.2, 0.4],
                b: vec![1.0, 1.0],
            },
        );
        let out = voxel_downsample(&cloud, 0.005);
        assert_eq!(out.len(), 1);
        let c = out.color(0).unwrap();
        assert!((c[0] - 0.5).abs() < 1e-6);
        assert!((c[1] - 0.3).abs() < 1e-6);
        assert!((c[2] - 1.0).abs() < 1e-6);
        assert!((out.x[0] - 0.0016).abs() < 1e-6);
    }

    #[test]
    fn voxel_downsample_empty_cloud() {
        let out = voxel_downsample(&PointCloud::new(), 1.0);
        assert!(out.is_empty());
    }

    #[test]
    fn voxel_downsample_single_point() {
        let cloud = PointCloud::from_xyz(vec![1.0], vec![2.0], vec![3.0]);
        let out = voxel_downsample(&cloud, 1.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out.point(0), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let cloud = PointCloud::from_xyz(vec![f32::NAN, 1.0], vec![0.0, 0.0], vec![0.0, 0.0]);
        let out = voxel_downsample(&cloud, 0.5);
        assert_eq!(out.len(), 1);
    }

    #[test]
    #[should_panic]
    fn zero_voxel_size_panics() {
        let cloud = PointCloud::from_xyz(vec![1.0], vec![2.0], vec![3.0]);
        let _ = voxel_downsample(&cloud, 0.0);
    }

    proptest! {
        #[test]
        fn voxel_downsample_never_increases_points(
            pts in prop::collection::vec((-100.0f32..100.0f32, -100.0f32..100.0f32, -100.0f32..100.0f32), 1..3000),
            voxel_size in 0.01f32..10.0f32,
        ) {
            let cloud = PointCloud::from_xyz(
                pts.iter().map(|p| p.0).collect(),
                pts.iter().map(|p| p.1).collect(),
                pts.iter().map(|p| p.2).collect(),
            );
            let out = voxel_downsample(&cloud, voxel_size);
            prop_assert!(out.len() <= cloud.len());
        }

        #[test]
        fn voxel_downsample_is_idempotent(
            pts in prop::collection::vec((-2.0f32..2.0f32, -2.0f32..2.0f32, -5.0f32..0.0f32), 1..2000),
            voxel_size in 0.001f32..0.5f32,
        ) {
            let cloud = PointCloud::from_xyz(
                pts.iter().map(|p| p.0).collect(),
                pts.iter().map(|p| p.1).collect(),
                pts.iter().map(|p| p.2).collect(),
            );
            let once = voxel_downsample(&cloud, voxel_size);
            let twice = voxel_downsample(&once, voxel_size);
            prop_assert_eq!(once.len(), twice.len());
        }
    }
}
