use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Failures that abort a whole request. Per-frame problems are reported as
/// [`crate::SkipReason`] instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("failed to read session manifest {}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session manifest {}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("frame {index} not found, session has {len} frames")]
    FrameOutOfRange { index: usize, len: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("failed to read config {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
