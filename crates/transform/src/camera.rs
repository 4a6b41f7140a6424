use crate::TransformError;
use crate::matrix::{Mat4, identity, look_at, multiply, perspective, rotate_x, rotate_y};
use crate::vector::Vec3;

/// Ratio of the X-axis spin to the Y-axis spin in the model matrix.
const X_SPIN_RATIO: f32 = 0.7;

/// Fixed camera framing the sphere at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            fov_y: 45.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            eye: [0.0, 0.0, 5.0],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

impl SceneCamera {
    pub fn projection(&self, aspect: f32) -> Result<Mat4, TransformError> {
        perspective(self.fov_y, aspect, self.near, self.far)
    }

    pub fn view(&self) -> Result<Mat4, TransformError> {
        look_at(self.eye, self.center, self.up)
    }

    pub fn view_projection(&self, aspect: f32) -> Result<Mat4, TransformError> {
        Ok(multiply(&self.projection(aspect)?, &self.view()?))
    }

    /// Model matrix spinning about Y by `rotation` and about X by `0.7 * rotation`.
    pub fn model(rotation: f32) -> Mat4 {
        rotate_x(&rotate_y(&identity(), rotation), X_SPIN_RATIO * rotation)
    }

    /// `projection * view * model` for the given aspect and spin.
    pub fn transform(&self, aspect: f32, rotation: f32) -> Result<Mat4, TransformError> {
        Ok(multiply(&self.view_projection(aspect)?, &Self::model(rotation)))
    }
}

/// Combined projection-view-model matrix for the default scene camera.
pub fn transformation_matrix(aspect: f32, rotation: f32) -> Result<Mat4, TransformError> {
    SceneCamera::default().transform(aspect, rotation)
}
