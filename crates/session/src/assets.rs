use std::fs;
use std::path::Path;

use depthfuse_depth::{decode_depth, DepthGrid, Resolution};
use image::{imageops, RgbImage};

use crate::options::ResampleFilter;
use crate::report::SkipReason;

/// Read and decode a raw depth blob.
pub fn load_depth(path: &Path) -> Result<(DepthGrid, Resolution), SkipReason> {
    if !path.is_file() {
        return Err(SkipReason::MissingDepth(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|e| SkipReason::UnreadableDepth {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(decode_depth(&bytes)?)
}

/// Open a color image as RGB8 at `width` x `height`.
pub fn load_color(
    path: &Path,
    width: usize,
    height: usize,
    filter: ResampleFilter,
) -> Result<RgbImage, SkipReason> {
    if !path.is_file() {
        return Err(SkipReason::MissingImage(path.to_path_buf()));
    }
    let img = image::open(path).map_err(|e| SkipReason::UnreadableImage {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(resample(img.to_rgb8(), width, height, filter))
}

/// Resize `img` to the depth resolution; a no-op when sizes already agree.
pub fn resample(img: RgbImage, width: usize, height: usize, filter: ResampleFilter) -> RgbImage {
    let (w, h) = (width as u32, height as u32);
    if img.dimensions() == (w, h) {
        return img;
    }
    imageops::resize(&img, w, h, filter.filter_type())
}
