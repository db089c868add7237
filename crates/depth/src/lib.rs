#![forbid(unsafe_code)]
//! Raw depth decoding and depth-to-point back-projection.

pub mod backproject;
pub mod decode;
pub mod intrinsics;
pub mod resolution;

pub use backproject::{
    backproject, backproject_depth_only, BackprojectError, DEPTH_SCALE, MAX_DEPTH_M,
};
pub use decode::{decode_depth, DecodeError, DepthGrid};
pub use intrinsics::{PinholeIntrinsics, DEFAULT_VERTICAL_FOV_DEG};
pub use resolution::{
    infer_aspect_fallback, infer_resolution, lookup_known_resolution, Resolution,
    ResolutionSource, KNOWN_RESOLUTIONS,
};
