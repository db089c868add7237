//! Builds a small capture session on disk, fuses it, and writes the result
//! as PLY next to the session.
//!
//! Run with `cargo run --example synthetic_session`.

use std::fs;
use std::path::Path;

use depthfuse_io::write_ply;
use depthfuse_session::{reconstruct_session, FuseOptions, Outcome};
use image::{Rgb, RgbImage};
use serde_json::json;

const WIDTH: usize = 160;
const HEIGHT: usize = 120;

/// A tilted floor: depth grows towards the bottom rows.
fn floor_depth(offset_mm: u16) -> Vec<u8> {
    (0..HEIGHT)
        .flat_map(|v| (0..WIDTH).map(move |_| 800 + offset_mm + v as u16 * 10))
        .flat_map(|d| d.to_le_bytes())
        .collect()
}

fn write_frame(dir: &Path, index: usize, offset_mm: u16, tint: [u8; 3]) -> serde_json::Value {
    let image = format!("rgb_{index}.png");
    let depth = format!("depth_{index}.bin");
    RgbImage::from_fn(640, 480, |x, _| {
        let shade = (x / 3) as u8;
        Rgb([tint[0].saturating_add(shade), tint[1], tint[2]])
    })
    .save(dir.join(&image))
    .expect("write color image");
    fs::write(dir.join(&depth), floor_depth(offset_mm)).expect("write depth map");

    // camera slides 20 cm along x per frame
    let tx = index as f32 * 0.2;
    let pose = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        tx, 0.0, 0.0, 1.0,
    ];
    json!({
        "imagePath": format!("/sdcard/capture/{image}"),
        "depthPath": format!("/sdcard/capture/{depth}"),
        "relativePose": pose,
    })
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let dir = tempfile::tempdir().expect("create temp dir");
    let entries: Vec<_> = (0..4)
        .map(|i| write_frame(dir.path(), i, i as u16 * 5, [40 * i as u8, 120, 200]))
        .collect();
    fs::write(
        dir.path().join("captures.json"),
        serde_json::to_string_pretty(&entries).expect("serialize manifest"),
    )
    .expect("write manifest");

    let fusion = reconstruct_session(dir.path(), FuseOptions::default()).expect("fuse session");
    let report = &fusion.report;
    println!(
        "fused {} of {} frames: {} points, {} after decimation",
        report.fused_count(),
        report.total_frames,
        report.points_before_decimation,
        report.points_after_decimation
    );

    match fusion.outcome {
        Outcome::Cloud(cloud) => {
            let aabb = cloud.aabb();
            println!("Bounding box: min={:?}, max={:?}", aabb.min, aabb.max);
            let out = std::env::temp_dir().join("synthetic_session.ply");
            write_ply(&out, &cloud).expect("write ply");
            println!("wrote {}", out.display());
        }
        Outcome::NothingToShow => println!("No points to visualize."),
    }
}
