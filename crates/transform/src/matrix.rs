use crate::TransformError;
use crate::vector::{Vec3, cross, dot, normalize, sub};

/// Homogeneous 4x4 matrix, row-major.
pub type Mat4 = [f32; 16];

#[rustfmt::skip]
pub const IDENTITY: Mat4 = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

pub fn identity() -> Mat4 {
    IDENTITY
}

/// Row-by-column product `a * b`. Order matters.
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[row * 4 + col] = a[row * 4] * b[col]
                + a[row * 4 + 1] * b[4 + col]
                + a[row * 4 + 2] * b[8 + col]
                + a[row * 4 + 3] * b[12 + col];
        }
    }
    out
}

pub fn transpose(m: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[col * 4 + row] = m[row * 4 + col];
        }
    }
    out
}

/// Apply `m` to the point `p` (w = 1). Returns homogeneous clip coordinates.
pub fn transform_point(m: &Mat4, p: Vec3) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (row, slot) in out.iter_mut().enumerate() {
        *slot = m[row * 4] * p[0] + m[row * 4 + 1] * p[1] + m[row * 4 + 2] * p[2] + m[row * 4 + 3];
    }
    out
}

/// Right-handed perspective projection with depth mapped to `[0, 1]`.
///
/// `fov_y` is the vertical field of view in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<Mat4, TransformError> {
    if !(near.is_finite() && far.is_finite() && near > 0.0 && near < far) {
        return Err(TransformError::InvalidProjection(format!(
            "clip planes must satisfy 0 < near < far, got near={near} far={far}"
        )));
    }
    if !(aspect.is_finite() && aspect > 0.0) {
        return Err(TransformError::InvalidProjection(format!(
            "aspect must be positive, got {aspect}"
        )));
    }
    if !(fov_y > 0.0 && fov_y < std::f32::consts::PI) {
        return Err(TransformError::InvalidProjection(format!(
            "vertical fov must be in (0, pi), got {fov_y}"
        )));
    }

    let f = 1.0 / (fov_y * 0.5).tan();
    let range_inv = 1.0 / (near - far);

    #[rustfmt::skip]
    let m = [
        f / aspect, 0.0, 0.0,               0.0,
        0.0,        f,   0.0,               0.0,
        0.0,        0.0, far * range_inv,   near * far * range_inv,
        0.0,        0.0, -1.0,              0.0,
    ];
    Ok(m)
}

/// View matrix looking from `eye` towards `center`.
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Result<Mat4, TransformError> {
    let z = normalize(sub(eye, center)).ok_or(TransformError::DegenerateBasis)?;
    let x = normalize(cross(up, z)).ok_or(TransformError::DegenerateBasis)?;
    let y = cross(z, x);

    #[rustfmt::skip]
    let m = [
        x[0], x[1], x[2], -dot(x, eye),
        y[0], y[1], y[2], -dot(y, eye),
        z[0], z[1], z[2], -dot(z, eye),
        0.0,  0.0,  0.0,  1.0,
    ];
    Ok(m)
}

/// `m * Rx(angle)`.
pub fn rotate_x(m: &Mat4, angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let rotation = [
        1.0, 0.0, 0.0, 0.0,
        0.0, c,   -s,  0.0,
        0.0, s,   c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    ];
    multiply(m, &rotation)
}

/// `m * Ry(angle)`.
pub fn rotate_y(m: &Mat4, angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let rotation = [
        c,   0.0, s,   0.0,
        0.0, 1.0, 0.0, 0.0,
        -s,  0.0, c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    ];
    multiply(m, &rotation)
}
