//! Helpers that lay out capture sessions on disk the way the capture app
//! exports them.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use serde_json::{json, Value};

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Column-major pose translating by `t`.
pub fn translation(t: [f32; 3]) -> [f32; 16] {
    let mut m = IDENTITY;
    m[12] = t[0];
    m[13] = t[1];
    m[14] = t[2];
    m
}

pub fn depth_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|d| d.to_le_bytes()).collect()
}

pub fn write_depth(dir: &Path, name: &str, samples: &[u16]) {
    fs::write(dir.join(name), depth_bytes(samples)).unwrap();
}

pub fn write_color(dir: &Path, name: &str, width: u32, height: u32, rgb: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(rgb))
        .save(dir.join(name))
        .unwrap();
}

/// Manifest entry with device-style absolute paths.
pub fn entry(image: &str, depth: &str, pose: &[f32]) -> Value {
    json!({
        "imagePath": format!("/storage/emulated/0/Android/data/capture/{image}"),
        "depthPath": format!("/storage/emulated/0/Android/data/capture/{depth}"),
        "relativePose": pose,
        "timestamp": 0,
    })
}

pub fn write_manifest(dir: &Path, entries: Vec<Value>) {
    fs::write(
        dir.join("captures.json"),
        serde_json::to_string_pretty(&Value::Array(entries)).unwrap(),
    )
    .unwrap();
}

/// Uniform 160x120 frame at `depth_mm` with matching color image.
pub fn write_uniform_frame(dir: &Path, index: usize, depth_mm: u16, rgb: [u8; 3]) -> (String, String) {
    let image = format!("rgb_{index}.png");
    let depth = format!("depth_{index}.bin");
    write_color(dir, &image, 640, 480, rgb);
    write_depth(dir, &depth, &vec![depth_mm; 160 * 120]);
    (image, depth)
}
