//! This module contains the math utils that mainly comes from `cgmath`,
//! plus the handful of 4x4 pose helpers the transform graph needs on top.

pub use cgmath::prelude::*;
pub use cgmath::{Deg, Matrix4, Point3, Rad, Vector3, Vector4};

/// Extracts the translation component of a pose, normalized by `w`.
pub fn translation(m: &Matrix4<f32>) -> Vector3<f32> {
    let w = if m.w.w.abs() <= ::std::f32::EPSILON {
        1.0
    } else {
        m.w.w
    };

    Vector3::new(m.w.x / w, m.w.y / w, m.w.z / w)
}

/// Euclidean distance between the translation components of two poses.
#[inline]
pub fn translation_distance(lhs: &Matrix4<f32>, rhs: &Matrix4<f32>) -> f32 {
    (translation(lhs) - translation(rhs)).magnitude()
}

/// Inverts a pose, substituting identity when the matrix is singular.
pub fn invert_or_identity(m: &Matrix4<f32>) -> Matrix4<f32> {
    m.invert().unwrap_or_else(|| {
        warn!("Inverting a singular matrix, falling back to identity.");
        Matrix4::identity()
    })
}

/// The fixed rotation between a ground-plane style anchor and the frame
/// its children are placed in.
#[inline]
pub fn adapter_rotation() -> Matrix4<f32> {
    Matrix4::from_angle_x(Deg(-90.0))
}

/// Builds the scale/translate term contributed by a linked 2d entity.
#[inline]
pub fn placement(x: f32, y: f32, scale: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, 0.0)) * Matrix4::from_scale(scale)
}
