use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use depthfuse_core::PointCloud;
use depthfuse_depth::{backproject, DepthGrid, PinholeIntrinsics};
use depthfuse_filters::voxel_downsample;
use depthfuse_pose::{apply_transform_in_place, RigidTransform};
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::assets::{load_color, load_depth};
use crate::error::Result;
use crate::manifest::{FrameRecord, Session};
use crate::options::FuseOptions;
use crate::report::{FrameReport, FrameStatus, SessionReport, SkipReason};

/// Final product of a fusion run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Cloud(PointCloud),
    /// No frame contributed a single point. Not an error.
    NothingToShow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fusion {
    pub outcome: Outcome,
    pub report: SessionReport,
}

impl Fusion {
    pub fn cloud(&self) -> Option<&PointCloud> {
        match &self.outcome {
            Outcome::Cloud(cloud) => Some(cloud),
            Outcome::NothingToShow => None,
        }
    }

    pub fn into_cloud(self) -> Option<PointCloud> {
        match self.outcome {
            Outcome::Cloud(cloud) => Some(cloud),
            Outcome::NothingToShow => None,
        }
    }
}

/// Depth, color and intrinsics of one frame, ready for back-projection.
pub(crate) struct PreparedFrame {
    pub depth: DepthGrid,
    pub color: RgbImage,
    pub intrinsics: PinholeIntrinsics,
}

fn required<'a, T>(field: &'a Option<T>, name: &'static str) -> std::result::Result<&'a T, SkipReason> {
    field.as_ref().ok_or(SkipReason::MissingField(name))
}

/// Resolve, load and align the assets of one frame record.
pub(crate) fn prepare_frame(
    session: &Session,
    record: &FrameRecord,
    options: &FuseOptions,
) -> std::result::Result<PreparedFrame, SkipReason> {
    let image_path = session.resolve_asset(required(&record.image_path, "imagePath")?);
    let depth_path = session.resolve_asset(required(&record.depth_path, "depthPath")?);

    if !image_path.is_file() {
        return Err(SkipReason::MissingImage(image_path));
    }
    let (depth, res) = load_depth(&depth_path)?;
    let color = load_color(&image_path, res.width, res.height, options.resample)?;
    let intrinsics =
        PinholeIntrinsics::from_vertical_fov(res.width, res.height, options.vertical_fov_deg);

    debug!(
        image = %file_name(&image_path),
        depth = %file_name(&depth_path),
        width = res.width,
        height = res.height,
        valid = depth.valid_count(),
        "prepared frame"
    );

    Ok(PreparedFrame {
        depth,
        color,
        intrinsics,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn frame_pose(record: &FrameRecord) -> std::result::Result<RigidTransform, SkipReason> {
    let values = required(&record.relative_pose, "relativePose")?;
    let pose = RigidTransform::from_column_major(values).map_err(SkipReason::InvalidPose)?;
    if pose.is_degenerate() {
        return Err(SkipReason::NoAnchor);
    }
    Ok(pose)
}

/// Fuses the frames of a session into one anchor-frame point cloud.
#[derive(Debug, Clone)]
pub struct SessionFuser {
    options: FuseOptions,
}

impl SessionFuser {
    pub fn new(options: FuseOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &FuseOptions {
        &self.options
    }

    pub fn fuse(&self, session: &Session) -> Fusion {
        self.fuse_with_cancel(session, &AtomicBool::new(false))
    }

    /// Fuse every frame in capture order.
    ///
    /// A failing frame is recorded in the report and skipped. `cancel` is
    /// checked before each frame; once set, the remaining frames are left
    /// unprocessed and whatever was fused so far is still decimated and
    /// returned.
    pub fn fuse_with_cancel(&self, session: &Session, cancel: &AtomicBool) -> Fusion {
        self.fuse_with_progress(session, cancel, |_| {})
    }

    /// Like [`SessionFuser::fuse_with_cancel`], calling `on_frame` with each
    /// frame's report as soon as that frame is done.
    pub fn fuse_with_progress(
        &self,
        session: &Session,
        cancel: &AtomicBool,
        mut on_frame: impl FnMut(&FrameReport),
    ) -> Fusion {
        let total = session.len();
        let mut report = SessionReport {
            total_frames: total,
            ..SessionReport::default()
        };
        let mut combined = PointCloud::new();

        info!(frames = total, dir = %session.dir().display(), "fusing session");

        for (index, entry) in session.frames().iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                warn!(processed = index, total, "fusion cancelled");
                report.cancelled = true;
                break;
            }

            let fused = match entry {
                Ok(record) => self.fuse_frame(session, record),
                Err(reason) => Err(reason.clone()),
            };
            match fused {
                Ok(mut points) if !points.is_empty() => {
                    let n = points.len();
                    combined.append(&mut points);
                    report.record(index, FrameStatus::Fused { points: n });
                    info!(frame = index + 1, total, points = n, "processed frame");
                }
                Ok(_) => {
                    report.record(index, FrameStatus::Empty);
                    warn!(frame = index + 1, total, "frame produced no valid points");
                }
                Err(reason) => {
                    warn!(frame = index + 1, total, %reason, "skipping frame");
                    report.record(index, FrameStatus::Skipped(reason));
                }
            }
            if let Some(done) = report.frames.last() {
                on_frame(done);
            }
        }

        report.points_before_decimation = combined.len();

        if combined.is_empty() {
            info!("no points to show");
            return Fusion {
                outcome: Outcome::NothingToShow,
                report,
            };
        }

        let cloud = match self.options.voxel_size {
            Some(voxel) => {
                let decimated = voxel_downsample(&combined, voxel);
                info!(
                    before = combined.len(),
                    after = decimated.len(),
                    voxel,
                    "decimated combined cloud"
                );
                decimated
            }
            None => combined,
        };
        report.points_after_decimation = cloud.len();

        Fusion {
            outcome: Outcome::Cloud(cloud),
            report,
        }
    }

    fn fuse_frame(
        &self,
        session: &Session,
        record: &FrameRecord,
    ) -> std::result::Result<PointCloud, SkipReason> {
        required(&record.image_path, "imagePath")?;
        required(&record.depth_path, "depthPath")?;
        let pose = frame_pose(record)?;

        let frame = prepare_frame(session, record, &self.options)?;
        let mut points = backproject(&frame.depth, &frame.color, &frame.intrinsics)?;
        apply_transform_in_place(&mut points, &pose);
        Ok(points)
    }
}

/// Open the session in `dir` and fuse it with `options`.
pub fn reconstruct_session(dir: impl AsRef<Path>, options: FuseOptions) -> Result<Fusion> {
    let fuser = SessionFuser::new(options)?;
    let session = Session::open_with_manifest(dir, &fuser.options().manifest_name)?;
    Ok(fuser.fuse(&session))
}
