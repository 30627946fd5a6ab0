//! Orthonormal tangent frame around the shading normal
use glam::DMat3;

use crate::Vec3d;

/// Rotation between world space and the local shading frame, in which the normal is the z-axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingFrame {
    /// tangent, bitangent and normal are the rows of this matrix
    to_local: DMat3,
}

impl ShadingFrame {
    /// Builds a frame with an arbitrary but deterministic tangent. `normal` must be normalized.
    #[must_use]
    pub fn from_normal(normal: Vec3d) -> Self {
        let mut tan = Vec3d::Z;
        if normal.dot(tan).abs() > 0.9999 {
            tan = Vec3d::Y;
        }
        let bi = normal.cross(tan).normalize();
        let tan = bi.cross(normal).normalize();

        Self {
            to_local: DMat3 {
                x_axis: tan,
                y_axis: bi,
                z_axis: normal,
            }
            .transpose(),
        }
    }

    #[must_use]
    pub fn tangent(&self) -> Vec3d {
        self.to_local.row(0)
    }

    #[must_use]
    pub fn bitangent(&self) -> Vec3d {
        self.to_local.row(1)
    }

    #[must_use]
    pub fn normal(&self) -> Vec3d {
        self.to_local.row(2)
    }

    /// world space to local space
    #[must_use]
    pub fn to_local(&self, omega: Vec3d) -> Vec3d {
        self.to_local * omega
    }

    /// local space to world space. The frame is a pure rotation, so the transposed is the
    /// inverse.
    #[must_use]
    pub fn from_local(&self, omega: Vec3d) -> Vec3d {
        self.to_local.transpose() * omega
    }
}
