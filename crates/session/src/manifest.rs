use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::report::SkipReason;

/// Name of the manifest inside a session directory.
pub const MANIFEST_FILE_NAME: &str = "captures.json";

/// One manifest entry as written by the capture app.
///
/// Fields are optional here; a missing field makes the frame skippable
/// rather than the whole manifest invalid. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_path: Option<String>,

    /// Flattened 4x4 anchor-from-camera matrix, column-major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_pose: Option<Vec<f32>>,
}

/// Last component of a path recorded on the capture device.
///
/// Recorded paths are absolute on the device, so only the file name is
/// meaningful on the processing machine. Both separators are accepted.
pub fn asset_file_name(recorded: &str) -> &str {
    recorded.rsplit(['/', '\\']).next().unwrap_or(recorded)
}

/// Ordered frames of one capture session plus the directory holding its
/// assets.
#[derive(Debug, Clone)]
pub struct Session {
    dir: PathBuf,
    frames: Vec<FrameEntry>,
}

/// A manifest element: the parsed record, or why it could not be parsed.
pub type FrameEntry = std::result::Result<FrameRecord, SkipReason>;

/// Parse one manifest element. A wrongly typed field affects only this frame.
pub fn parse_entry(value: serde_json::Value) -> FrameEntry {
    serde_json::from_value(value).map_err(|e| SkipReason::MalformedRecord(e.to_string()))
}

impl Session {
    /// Load [`MANIFEST_FILE_NAME`] from `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_manifest(dir, MANIFEST_FILE_NAME)
    }

    pub fn open_with_manifest(dir: impl AsRef<Path>, manifest_name: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(manifest_name);
        if !path.is_file() {
            return Err(SessionError::ManifestNotFound(path));
        }

        let text = fs::read_to_string(&path).map_err(|source| SessionError::ManifestRead {
            path: path.clone(),
            source,
        })?;
        let values: Vec<serde_json::Value> = serde_json::from_str(&text)
            .map_err(|source| SessionError::ManifestParse { path, source })?;
        let frames: Vec<FrameEntry> = values.into_iter().map(parse_entry).collect();

        tracing::debug!(dir = %dir.display(), frames = frames.len(), "loaded session manifest");
        Ok(Self { dir, frames })
    }

    pub fn from_frames(dir: impl Into<PathBuf>, frames: Vec<FrameRecord>) -> Self {
        Self {
            dir: dir.into(),
            frames: frames.into_iter().map(Ok).collect(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frames(&self) -> &[FrameEntry] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Result<&FrameEntry> {
        self.frames.get(index).ok_or(SessionError::FrameOutOfRange {
            index,
            len: self.frames.len(),
        })
    }

    /// Where a recorded device path lives inside this session directory.
    pub fn resolve_asset(&self, recorded: &str) -> PathBuf {
        self.dir.join(asset_file_name(recorded))
    }
}
