use depthfuse_core::PointCloud;
use depthfuse_depth::backproject;
use depthfuse_filters::voxel_downsample;
use tracing::{info, warn};

use crate::error::Result;
use crate::fuse::prepare_frame;
use crate::manifest::Session;
use crate::options::FuseOptions;
use crate::report::SkipReason;

/// Result of reconstructing a single frame in camera space.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Cloud(PointCloud),
    NothingToShow,
    Skipped(SkipReason),
}

/// Back-project one frame without pose alignment, then decimate it.
///
/// An index past the end of the manifest is an error; problems with the
/// frame's own assets come back as [`FrameOutcome::Skipped`].
pub fn reconstruct_frame(
    session: &Session,
    index: usize,
    options: &FuseOptions,
) -> Result<FrameOutcome> {
    options.validate()?;
    let record = match session.frame(index)? {
        Ok(record) => record,
        Err(reason) => {
            warn!(frame = index, %reason, "cannot reconstruct frame");
            return Ok(FrameOutcome::Skipped(reason.clone()));
        }
    };

    let frame = match prepare_frame(session, record, options) {
        Ok(frame) => frame,
        Err(reason) => {
            warn!(frame = index, %reason, "cannot reconstruct frame");
            return Ok(FrameOutcome::Skipped(reason));
        }
    };

    let points = match backproject(&frame.depth, &frame.color, &frame.intrinsics) {
        Ok(points) => points,
        Err(e) => return Ok(FrameOutcome::Skipped(e.into())),
    };
    info!(frame = index, points = points.len(), "generated points");

    if points.is_empty() {
        return Ok(FrameOutcome::NothingToShow);
    }

    let cloud = match options.voxel_size {
        Some(voxel) => {
            let decimated = voxel_downsample(&points, voxel);
            info!(frame = index, points = decimated.len(), "downsampled");
            decimated
        }
        None => points,
    };
    Ok(FrameOutcome::Cloud(cloud))
}
