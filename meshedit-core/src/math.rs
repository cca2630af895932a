/// Numeric helpers layered on top of nalgebra: tolerance, checked inversion, Euler decomposition
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{CoreError, CoreResult};

/// Tolerance used for degeneracy, parallelism and positional equality tests.
pub const EPSILON: f32 = 1e-6;

/// Epsilon-tolerant positional equality, component by component.
pub fn same_position(a: &Point3<f32>, b: &Point3<f32>) -> bool {
    (a - b).iter().all(|d| d.abs() <= EPSILON)
}

/// Invert a matrix, refusing singular or non-finite input.
pub fn try_invert(matrix: &Matrix4<f32>) -> CoreResult<Matrix4<f32>> {
    let determinant = matrix.determinant();
    if !determinant.is_finite() || determinant.abs() < EPSILON {
        return Err(CoreError::SingularMatrix { determinant });
    }
    matrix
        .try_inverse()
        .ok_or(CoreError::SingularMatrix { determinant })
}

/// Extract XYZ Euler angles (radians) from the rotation part of `Rz * Ry * Rx`.
///
/// At gimbal lock (Y rotation of ±90°) X and Z rotate about the same axis, so
/// the Z angle is pinned to zero and the combined rotation is reported on X.
pub fn euler_angles(rotation: &Matrix4<f32>) -> Vector3<f32> {
    let r20 = rotation[(2, 0)];

    if r20.abs() < 1.0 - EPSILON {
        let y = (-r20).asin();
        let x = rotation[(2, 1)].atan2(rotation[(2, 2)]);
        let z = rotation[(1, 0)].atan2(rotation[(0, 0)]);
        Vector3::new(x, y, z)
    } else if r20 < 0.0 {
        let x = rotation[(0, 1)].atan2(rotation[(0, 2)]);
        Vector3::new(x, std::f32::consts::FRAC_PI_2, 0.0)
    } else {
        let x = (-rotation[(0, 1)]).atan2(-rotation[(0, 2)]);
        Vector3::new(x, -std::f32::consts::FRAC_PI_2, 0.0)
    }
}

/// Conjugate a transform so that it acts about `pivot` instead of the origin.
pub fn about_pivot(pivot: &Point3<f32>, matrix: &Matrix4<f32>) -> Matrix4<f32> {
    Matrix4::new_translation(&pivot.coords) * matrix * Matrix4::new_translation(&-pivot.coords)
}

/// Translation column of a homogeneous matrix.
pub fn translation_of(matrix: &Matrix4<f32>) -> Vector3<f32> {
    Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

/// Diagonal scale factors of a homogeneous matrix.
pub fn scale_of(matrix: &Matrix4<f32>) -> Vector3<f32> {
    Vector3::new(matrix[(0, 0)], matrix[(1, 1)], matrix[(2, 2)])
}
