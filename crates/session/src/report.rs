use std::path::PathBuf;

use depthfuse_depth::{BackprojectError, DecodeError};
use depthfuse_pose::PoseError;
use thiserror::Error;

/// Why a frame was left out. Never fatal for the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("frame record is missing `{0}`")]
    MissingField(&'static str),

    #[error("malformed frame record: {0}")]
    MalformedRecord(String),

    #[error("invalid pose: {0}")]
    InvalidPose(PoseError),

    #[error("pose is all zeros, no anchor was placed when the frame was captured")]
    NoAnchor,

    #[error("image not found: {}", .0.display())]
    MissingImage(PathBuf),

    #[error("depth map not found: {}", .0.display())]
    MissingDepth(PathBuf),

    #[error("failed to read depth map {}: {message}", .path.display())]
    UnreadableDepth { path: PathBuf, message: String },

    #[error("failed to open image {}: {message}", .path.display())]
    UnreadableImage { path: PathBuf, message: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Backproject(#[from] BackprojectError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameStatus {
    /// Points from this frame were appended to the combined cloud.
    Fused { points: usize },
    /// Every depth sample was invalid or out of range.
    Empty,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub index: usize,
    pub status: FrameStatus,
}

/// Per-frame outcome of one fusion run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    pub frames: Vec<FrameReport>,
    /// Frames in the manifest, processed or not.
    pub total_frames: usize,
    /// Set when the run stopped early on request.
    pub cancelled: bool,
    pub points_before_decimation: usize,
    pub points_after_decimation: usize,
}

impl SessionReport {
    pub(crate) fn record(&mut self, index: usize, status: FrameStatus) {
        self.frames.push(FrameReport { index, status });
    }

    pub fn fused_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| matches!(f.status, FrameStatus::Fused { .. }))
            .count()
    }

    pub fn empty_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| f.status == FrameStatus::Empty)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (usize, &SkipReason)> + '_ {
        self.frames.iter().filter_map(|f| match &f.status {
            FrameStatus::Skipped(reason) => Some((f.index, reason)),
            _ => None,
        })
    }

    pub fn processed_count(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_status() {
        let mut report = SessionReport {
            total_frames: 4,
            ..SessionReport::default()
        };
        report.record(0, FrameStatus::Fused { points: 10 });
        report.record(1, FrameStatus::Skipped(SkipReason::NoAnchor));
        report.record(2, FrameStatus::Empty);
        report.record(3, FrameStatus::Fused { points: 3 });

        assert_eq!(report.fused_count(), 2);
        assert_eq!(report.empty_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.processed_count(), 4);
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped, vec![(1, &SkipReason::NoAnchor)]);
    }

    #[test]
    fn skip_reasons_render_readably() {
        let reason = SkipReason::MissingDepth(PathBuf::from("/s/depth_1.bin"));
        assert_eq!(reason.to_string(), "depth map not found: /s/depth_1.bin");
        let reason = SkipReason::from(DecodeError::UnknownResolution { num_pixels: 7 });
        assert_eq!(
            reason.to_string(),
            "cannot determine depth resolution for 7 pixels"
        );
    }
}
