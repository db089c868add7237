use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use depthfuse_core::PointCloud;
use depthfuse_io::{write_ply, write_ply_binary};
use depthfuse_session::{
    reconstruct_frame, FrameOutcome, FuseOptions, Outcome, ResampleFilter, Session, SessionFuser,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "depthfuse")]
#[command(about = "Reconstruct colored point clouds from AR capture sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fuse every frame of a session into one anchor-frame point cloud
    Fuse {
        /// Extracted session directory containing captures.json
        session: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Reconstruct a single frame in camera space
    Frame {
        /// Extracted session directory containing captures.json
        session: PathBuf,

        /// Frame index in the manifest
        #[arg(default_value = "0")]
        index: usize,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Write the resulting cloud as PLY
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write binary little-endian PLY instead of ASCII
    #[arg(long)]
    binary: bool,

    /// JSON file with reconstruction options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Voxel edge in metres for decimation
    #[arg(long)]
    voxel_size: Option<f32>,

    /// Keep every point
    #[arg(long, conflicts_with = "voxel_size")]
    no_decimate: bool,

    /// Assumed vertical field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// Color resampling filter: nearest or triangle
    #[arg(long)]
    resample: Option<ResampleFilter>,
}

impl CommonArgs {
    fn options(&self) -> Result<FuseOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => FuseOptions::from_json_file(path)?,
            None => FuseOptions::default(),
        };
        if let Some(fov) = self.fov {
            options.vertical_fov_deg = fov;
        }
        if let Some(voxel) = self.voxel_size {
            options.voxel_size = Some(voxel);
        }
        if self.no_decimate {
            options.voxel_size = None;
        }
        if let Some(resample) = self.resample {
            options.resample = resample;
        }
        options.validate()?;
        Ok(options)
    }

    fn export(&self, cloud: &PointCloud) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.output else {
            return Ok(());
        };
        if self.binary {
            write_ply_binary(path, cloud)?;
        } else {
            write_ply(path, cloud)?;
        }
        info!(path = %path.display(), points = cloud.len(), "wrote point cloud");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default, e.g. RUST_LOG=depthfuse_session=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fuse { session, common } => fuse(&session, &common),
        Commands::Frame {
            session,
            index,
            common,
        } => frame(&session, index, &common),
    }
}

fn fuse(dir: &Path, common: &CommonArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = common.options()?;
    let fuser = SessionFuser::new(options)?;
    let session = Session::open_with_manifest(dir, &fuser.options().manifest_name)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_handler.store(true, std::sync::atomic::Ordering::SeqCst);
    })?;

    let fusion = fuser.fuse_with_cancel(&session, &cancel);
    let report = &fusion.report;
    info!(
        fused = report.fused_count(),
        empty = report.empty_count(),
        skipped = report.skipped_count(),
        total = report.total_frames,
        "session summary"
    );
    for (index, reason) in report.skipped() {
        warn!(frame = index, %reason, "skipped");
    }

    match &fusion.outcome {
        Outcome::Cloud(cloud) => {
            let aabb = cloud.aabb();
            info!(
                points = cloud.len(),
                min = ?aabb.min,
                max = ?aabb.max,
                "combined point cloud"
            );
            common.export(cloud)
        }
        Outcome::NothingToShow => {
            println!("No points to visualize.");
            Ok(())
        }
    }
}

fn frame(dir: &Path, index: usize, common: &CommonArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = common.options()?;
    let session = Session::open_with_manifest(dir, &options.manifest_name)?;

    match reconstruct_frame(&session, index, &options)? {
        FrameOutcome::Cloud(cloud) => common.export(&cloud),
        FrameOutcome::NothingToShow => {
            println!("No valid points generated.");
            Ok(())
        }
        FrameOutcome::Skipped(reason) => {
            println!("Frame {index} skipped: {reason}");
            Ok(())
        }
    }
}
