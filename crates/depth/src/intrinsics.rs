/// Vertical field of view assumed when nothing better is known.
pub const DEFAULT_VERTICAL_FOV_DEG: f32 = 60.0;

/// Pinhole camera model without distortion.
///
/// This is always an estimate: capture sessions do not record device
/// intrinsics, so the focal length is derived from an assumed vertical field
/// of view and the principal point is placed at the image centre. Pixels are
/// assumed square (`fx == fy`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub width: usize,
    pub height: usize,
}

impl PinholeIntrinsics {
    /// `f = height / (2 tan(fov / 2))`, principal point at `(w / 2, h / 2)`.
    pub fn from_vertical_fov(width: usize, height: usize, fov_deg: f32) -> Self {
        let fov_rad = fov_deg.to_radians();
        let focal = height as f32 / (2.0 * (fov_rad / 2.0).tan());

        Self {
            fx: focal,
            fy: focal,
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
            width,
            height,
        }
    }

    /// Ray through pixel `(u, v)` scaled to depth `z`, in image axes
    /// (x right, y down, z forward).
    pub fn deproject(&self, u: f32, v: f32, z: f32) -> [f32; 3] {
        [(u - self.cx) * z / self.fx, (v - self.cy) * z / self.fy, z]
    }
}
