#![forbid(unsafe_code)]
//! Rigid transforms that carry camera-space points into the anchor frame.

pub mod transform;

pub use transform::{apply_transform, apply_transform_in_place, PoseError, RigidTransform};
