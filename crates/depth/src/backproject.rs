use depthfuse_core::PointCloud;
use image::RgbImage;
use rayon::prelude::*;
use thiserror::Error;

use crate::decode::DepthGrid;
use crate::intrinsics::PinholeIntrinsics;

/// Raw samples per metre.
pub const DEPTH_SCALE: f32 = 1000.0;

/// Samples farther than this (in metres) are discarded. Exactly 5 m is kept.
pub const MAX_DEPTH_M: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackprojectError {
    #[error("color image is {color_width}x{color_height} but depth grid is {depth_width}x{depth_height}")]
    SizeMismatch {
        color_width: u32,
        color_height: u32,
        depth_width: usize,
        depth_height: usize,
    },
}

#[derive(Default)]
struct RowPoints {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

/// Metric depth for a raw sample, or `None` when it is invalid or beyond
/// [`MAX_DEPTH_M`].
#[inline]
fn sample_to_metres(d: u16) -> Option<f32> {
    if d == 0 {
        return None;
    }
    let z = d as f32 / DEPTH_SCALE;
    if z > MAX_DEPTH_M {
        return None;
    }
    Some(z)
}

/// Camera-space position with Y and Z flipped: Y up, Z toward the viewer.
#[inline]
fn to_view_axes(k: &PinholeIntrinsics, x: usize, y: usize, z: f32) -> [f32; 3] {
    let [x3, y3, z3] = k.deproject(x as f32, y as f32, z);
    [x3, -y3, -z3]
}

/// Back-project every valid depth sample into a colored camera-space point.
///
/// `color` must already be resampled to the depth grid's resolution. Points
/// are emitted in row-major pixel order; rows are processed in parallel.
/// An all-invalid grid yields an empty cloud.
pub fn backproject(
    depth: &DepthGrid,
    color: &RgbImage,
    intrinsics: &PinholeIntrinsics,
) -> Result<PointCloud, BackprojectError> {
    if color.width() as usize != depth.width || color.height() as usize != depth.height {
        return Err(BackprojectError::SizeMismatch {
            color_width: color.width(),
            color_height: color.height(),
            depth_width: depth.width,
            depth_height: depth.height,
        });
    }

    if depth.is_empty() {
        return Ok(PointCloud::new());
    }

    let rows: Vec<RowPoints> = depth
        .data
        .par_chunks(depth.width)
        .enumerate()
        .map(|(y, row)| {
            let mut out = RowPoints::default();
            for (x, &d) in row.iter().enumerate() {
                let Some(z) = sample_to_metres(d) else {
                    continue;
                };
                let px = color.get_pixel(x as u32, y as u32).0;
                out.positions.push(to_view_axes(intrinsics, x, y, z));
                out.colors.push([
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                ]);
            }
            out
        })
        .collect();

    let total: usize = rows.iter().map(|r| r.positions.len()).sum();
    let mut cloud = PointCloud::with_capacity(total, true);
    for row in rows {
        for (p, c) in row.positions.into_iter().zip(row.colors) {
            cloud.push_colored(p, c);
        }
    }

    Ok(cloud)
}

/// Same per-pixel rule as [`backproject`] without color lookup.
pub fn backproject_depth_only(depth: &DepthGrid, intrinsics: &PinholeIntrinsics) -> PointCloud {
    if depth.is_empty() {
        return PointCloud::new();
    }

    let rows: Vec<Vec<[f32; 3]>> = depth
        .data
        .par_chunks(depth.width)
        .enumerate()
        .map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(|(x, &d)| sample_to_metres(d).map(|z| to_view_axes(intrinsics, x, y, z)))
                .collect()
        })
        .collect();

    let total: usize = rows.iter().map(Vec::len).sum();
    let mut cloud = PointCloud::with_capacity(total, false);
    for p in rows.into_iter().flatten() {
        cloud.push(p);
    }
    cloud
}
