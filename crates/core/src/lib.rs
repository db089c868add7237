#![forbid(unsafe_code)]
//! Point buffers shared by every stage of the reconstruction pipeline.

pub mod bbox;
pub mod cloud;
pub mod point;

pub use bbox::Aabb;
pub use cloud::{Colors, PointCloud};
pub use point::PointXYZRGB;
