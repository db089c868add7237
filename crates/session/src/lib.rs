#![forbid(unsafe_code)]
//! Capture-session handling: manifest parsing, per-frame asset loading and
//! multi-frame fusion into one anchor-frame point cloud.

pub mod assets;
pub mod error;
pub mod frame;
pub mod fuse;
pub mod manifest;
pub mod options;
pub mod report;

pub use error::{Result, SessionError};
pub use frame::{reconstruct_frame, FrameOutcome};
pub use fuse::{reconstruct_session, Fusion, Outcome, SessionFuser};
pub use manifest::{
    asset_file_name, parse_entry, FrameEntry, FrameRecord, Session, MANIFEST_FILE_NAME,
};
pub use options::{FuseOptions, ResampleFilter};
pub use report::{FrameReport, FrameStatus, SessionReport, SkipReason};
