use depthfuse_core::PointCloud;
use nalgebra::Matrix4;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoseError {
    #[error("pose must have 16 values, got {len}")]
    WrongLength { len: usize },

    #[error("pose contains non-finite values")]
    NonFinite,
}

/// Rotation plus translation; no scale or shear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: [[f32; 3]; 3],
    pub translation: [f32; 3],
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0, 0.0, 0.0],
        }
    }

    pub fn from_translation(t: [f32; 3]) -> Self {
        Self {
            translation: t,
            ..Self::identity()
        }
    }

    /// Build a transform from a flattened 4x4 matrix stored column-major.
    ///
    /// Capture sessions record poses as sixteen values in column-major order
    /// (the first four values are the first column). Read row-major, the
    /// matrix would come out transposed, so this is the single place where
    /// that convention is applied. The bottom row is assumed to be
    /// `[0, 0, 0, 1]` and is not read.
    pub fn from_column_major(values: &[f32]) -> Result<Self, PoseError> {
        if values.len() != 16 {
            return Err(PoseError::WrongLength { len: values.len() });
        }
        if !values.iter().all(|v| v.is_finite()) {
            return Err(PoseError::NonFinite);
        }

        let m = Matrix4::from_column_slice(values);
        Ok(Self::from_matrix(&m))
    }

    pub fn from_matrix(m: &Matrix4<f32>) -> Self {
        Self {
            rotation: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
            translation: [m[(0, 3)], m[(1, 3)], m[(2, 3)]],
        }
    }

    /// True when the rotation block is all zeros, which is what capture
    /// devices write when no anchor had been placed.
    pub fn is_degenerate(&self) -> bool {
        self.rotation.iter().flatten().all(|&v| v == 0.0)
    }

    /// R * p + t
    pub fn apply_to_point(&self, p: &[f32; 3]) -> [f32; 3] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            r[0][0] * p[0] + r[0][1] * p[1] + r[0][2] * p[2] + t[0],
            r[1][0] * p[0] + r[1][1] * p[1] + r[1][2] * p[2] + t[1],
            r[2][0] * p[0] + r[2][1] * p[1] + r[2][2] * p[2] + t[2],
        ]
    }
}

/// Transform every position of `cloud` in place. Colors are untouched.
pub fn apply_transform_in_place(cloud: &mut PointCloud, transform: &RigidTransform) {
    for i in 0..cloud.len() {
        let [x, y, z] = transform.apply_to_point(&cloud.point(i));
        cloud.x[i] = x;
        cloud.y[i] = y;
        cloud.z[i] = z;
    }
}

/// Transformed copy of `cloud`.
pub fn apply_transform(cloud: &PointCloud, transform: &RigidTransform) -> PointCloud {
    let mut out = cloud.clone();
    apply_transform_in_place(&mut out, transform);
    out
}
