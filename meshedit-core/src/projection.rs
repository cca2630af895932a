/// Camera, viewport and world <-> screen mapping
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

use crate::error::{CoreError, CoreResult};
use crate::math::{self, EPSILON};
use crate::raycast::Ray;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Screen rectangle the scene is drawn into (pixels, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Canned camera angles, bound to the digit keys 1-6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetView {
    Front,
    Back,
    Right,
    Left,
    Top,
    Bottom,
}

impl PresetView {
    /// Map digit keys 1-6 to views
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(PresetView::Front),
            2 => Some(PresetView::Back),
            3 => Some(PresetView::Right),
            4 => Some(PresetView::Left),
            5 => Some(PresetView::Top),
            6 => Some(PresetView::Bottom),
            _ => None,
        }
    }

    /// Direction from the target towards the camera, and the matching up vector
    fn orientation(self) -> (Vector3<f32>, Vector3<f32>) {
        let y = Vector3::y();
        match self {
            PresetView::Front => (Vector3::z(), y),
            PresetView::Back => (-Vector3::z(), y),
            PresetView::Right => (Vector3::x(), y),
            PresetView::Left => (-Vector3::x(), y),
            PresetView::Top => (Vector3::y(), -Vector3::z()),
            PresetView::Bottom => (-Vector3::y(), Vector3::z()),
        }
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: Viewport::new(width, height).aspect(),
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = self.distance();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Switch between perspective and orthographic projection
    pub fn toggle_projection(&mut self) {
        self.mode = match self.mode {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        };
    }

    /// Distance from the camera to its target
    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Screen-right direction in world space
    pub fn right(&self) -> Vector3<f32> {
        (self.target - self.position)
            .cross(&self.up)
            .try_normalize(EPSILON)
            .unwrap_or_else(Vector3::x)
    }

    /// Swing the camera around its target to a preset angle, keeping the distance
    pub fn set_preset(&mut self, view: PresetView) {
        let (towards_camera, up) = view.orientation();
        self.position = self.target + towards_camera * self.distance();
        self.up = up;
    }

    /// Dolly towards (positive steps) or away from the target, never closer than `min_distance`
    pub fn zoom(&mut self, steps: f32, speed: f32, min_distance: f32) {
        let offset = self.position - self.target;
        let distance = offset.norm();
        if distance < EPSILON {
            return;
        }
        let wanted = (distance * (1.0 - steps * speed)).max(min_distance);
        self.position = self.target + offset * (wanted / distance);
    }

    /// Project a 3D point to 2D screen space
    pub fn project_to_screen(&self, point: &Point3<f32>, viewport: &Viewport) -> Option<Point3<f32>> {
        project(point, &self.view_matrix(), &self.projection_matrix(), viewport)
    }

    /// Ray from the near plane through the far plane under a screen position
    pub fn screen_ray(&self, screen: &Point2<f32>, viewport: &Viewport) -> CoreResult<Ray> {
        let view = self.view_matrix();
        let projection = self.projection_matrix();
        let near = unproject(&Point3::new(screen.x, screen.y, 0.0), &view, &projection, viewport)?;
        let far = unproject(&Point3::new(screen.x, screen.y, 1.0), &view, &projection, viewport)?;
        Ok(Ray::towards(near, far))
    }

    /// World position under a screen position, on the near plane
    pub fn unproject_near(&self, screen: &Point2<f32>, viewport: &Viewport) -> CoreResult<Point3<f32>> {
        unproject(
            &Point3::new(screen.x, screen.y, 0.0),
            &self.view_matrix(),
            &self.projection_matrix(),
            viewport,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Project a world point to `(screen_x, screen_y, depth)` with depth in `[0, 1]`.
/// `None` for points behind the camera.
pub fn project(
    point: &Point3<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
    viewport: &Viewport,
) -> Option<Point3<f32>> {
    let clip = projection * view * point.to_homogeneous();

    // Prevent division by near-zero or negative w (behind the eye)
    if clip.w < EPSILON {
        return None;
    }

    let ndc = clip.xyz() / clip.w;
    let screen_x = viewport.x + (ndc.x + 1.0) * 0.5 * viewport.width;
    let screen_y = viewport.y + (1.0 - ndc.y) * 0.5 * viewport.height;
    Some(Point3::new(screen_x, screen_y, (ndc.z + 1.0) * 0.5))
}

/// Map `(screen_x, screen_y, depth)` back to world space.
///
/// Fails with [`CoreError::SingularMatrix`] when `projection * view` can't be inverted.
pub fn unproject(
    screen: &Point3<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
    viewport: &Viewport,
) -> CoreResult<Point3<f32>> {
    let inverse = math::try_invert(&(projection * view))?;

    let ndc = Vector4::new(
        (screen.x - viewport.x) / viewport.width * 2.0 - 1.0,
        1.0 - (screen.y - viewport.y) / viewport.height * 2.0,
        screen.z * 2.0 - 1.0,
        1.0,
    );
    let world = inverse * ndc;
    if world.w.abs() < EPSILON || !world.w.is_finite() {
        return Err(CoreError::SingularMatrix {
            determinant: world.w,
        });
    }
    Ok(Point3::from(world.xyz() / world.w))
}
