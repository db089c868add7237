use std::fmt;
use std::path::Path;
use std::str::FromStr;

use depthfuse_depth::DEFAULT_VERTICAL_FOV_DEG;
use depthfuse_filters::DEFAULT_VOXEL_SIZE;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::manifest::MANIFEST_FILE_NAME;

/// How color images are resampled to the depth resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    #[default]
    Nearest,
    Triangle,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResampleFilter::Nearest),
            "triangle" | "bilinear" => Ok(ResampleFilter::Triangle),
            other => Err(format!("unknown resample filter '{other}'")),
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleFilter::Nearest => f.write_str("nearest"),
            ResampleFilter::Triangle => f.write_str("triangle"),
        }
    }
}

/// Tunables for a reconstruction run.
///
/// The field of view is an assumption, not a measurement: sessions carry no
/// device intrinsics, so every frame uses the same vertical FOV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuseOptions {
    pub vertical_fov_deg: f32,
    /// Voxel edge in metres for the final decimation; `None` keeps every
    /// point.
    pub voxel_size: Option<f32>,
    pub resample: ResampleFilter,
    pub manifest_name: String,
}

impl Default for FuseOptions {
    fn default() -> Self {
        Self {
            vertical_fov_deg: DEFAULT_VERTICAL_FOV_DEG,
            voxel_size: Some(DEFAULT_VOXEL_SIZE),
            resample: ResampleFilter::default(),
            manifest_name: MANIFEST_FILE_NAME.to_string(),
        }
    }
}

impl FuseOptions {
    pub fn validate(&self) -> Result<()> {
        let fov = self.vertical_fov_deg;
        if !fov.is_finite() || fov <= 0.0 || fov >= 180.0 {
            return Err(SessionError::InvalidOptions(format!(
                "vertical_fov_deg must be in (0, 180), got {fov}"
            )));
        }
        if let Some(v) = self.voxel_size {
            if !v.is_finite() || v <= 0.0 {
                return Err(SessionError::InvalidOptions(format!(
                    "voxel_size must be positive and finite, got {v}"
                )));
            }
        }
        if self.manifest_name.is_empty() {
            return Err(SessionError::InvalidOptions(
                "manifest_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load options from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let options: FuseOptions =
            serde_json::from_str(&text).map_err(|source| SessionError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        options.validate()?;
        Ok(options)
    }
}
