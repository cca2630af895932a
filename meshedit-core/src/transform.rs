/// 3D transformation matrices, object transform state and drag-to-matrix conversion
use nalgebra::{Matrix4, Point3, Vector3};

use crate::math::{self, EPSILON};

/// Smallest relative scale a single drag frame may apply
const MIN_SCALE_FACTOR: f32 = 0.01;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Read the Euler angles back out of a rotation matrix
    pub fn from_matrix(rotation: &Matrix4<f32>) -> Self {
        let angles = math::euler_angles(rotation);
        Self::new(angles.x, angles.y, angles.z)
    }

    /// Angles in degrees, for display
    pub fn degrees(&self) -> (f32, f32, f32) {
        (self.x.to_degrees(), self.y.to_degrees(), self.z.to_degrees())
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: X, then Y, then Z
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Translation for one GRAB frame.
    ///
    /// The pointer delta is measured on the near plane, so it is scaled by the
    /// object's distance from the camera to keep drag speed steady across zoom levels.
    pub fn grab(direction: &Vector3<f32>, delta: &Vector3<f32>, camera_distance: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&(direction.component_mul(delta) * camera_distance))
    }

    /// Relative scale for one SCALE frame.
    ///
    /// `previous_radius` and `radius` are the pointer's screen distances from the
    /// viewport centre on the last and the current frame. The target scale is
    /// `current * (1 + growth)`; dividing out `current` leaves the relative factor.
    /// Axes with a zero `direction` component keep a factor of one.
    pub fn relative_scale(
        direction: &Vector3<f32>,
        previous_radius: f32,
        radius: f32,
        camera_distance: f32,
        sensitivity: f32,
    ) -> Matrix4<f32> {
        let growth = (radius - previous_radius) * camera_distance / sensitivity.max(EPSILON);
        let factor = (1.0 + growth).max(MIN_SCALE_FACTOR);
        let factors = direction.map(|d| if d.abs() < EPSILON { 1.0 } else { factor });
        Matrix4::new_nonuniform_scaling(&factors)
    }

    /// Rotation for one ROTATE frame: `angle` spread over the axes enabled in `direction`
    pub fn rotate(direction: &Vector3<f32>, angle: f32) -> Matrix4<f32> {
        let scaled = direction * angle;
        Self::rotation_matrix(&RotationState::new(scaled.x, scaled.y, scaled.z))
    }
}

/// Per-object placement: where it is, how big it is and how it is turned
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTransform {
    pub position: Point3<f32>,
    pub scale: Vector3<f32>,
    /// Cumulative orientation
    pub rotation: Matrix4<f32>,
    /// Same orientation as Euler angles, kept for display
    pub euler: RotationState,
}

impl ObjectTransform {
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Compose the model matrix (translate * rotate * scale)
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position.coords)
            * self.rotation
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Accumulate a rotation and refresh the display angles
    pub fn rotate_by(&mut self, rotation: &Matrix4<f32>) {
        self.rotation = rotation * self.rotation;
        self.euler = RotationState::from_matrix(&self.rotation);
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            scale: Vector3::repeat(1.0),
            rotation: Matrix4::identity(),
            euler: RotationState::zero(),
        }
    }
}
