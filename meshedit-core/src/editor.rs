//! Selection & transform state machine
//!
//! The [`Editor`] owns the scene, the selection and a [`SceneContext`] (camera,
//! viewport, cursor). Input collaborators feed it [`InputEvent`]s; renderers and
//! UI read the scene, the selection and the current [`Mode`] back out.

use nalgebra::{Matrix4, Point2, Point3, Vector3};
use tracing::{debug, trace, warn};

use crate::config::EditorConfig;
use crate::error::CoreResult;
use crate::geometry::Vertex;
use crate::math::EPSILON;
use crate::mode::{Axis, Category, Mode, ModeKind};
use crate::projection::{Camera, PresetView, Viewport};
use crate::raycast::{self, Ray};
use crate::scene::{ObjectId, Scene, Transformable};
use crate::selection::Selection;
use crate::transform::Transform;

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    /// Digit 1-6: preset camera angle
    View(u8),
    G,
    S,
    R,
    E,
    F,
    M,
    X,
    Y,
    Z,
    LeftShift,
}

/// Discrete input from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    ButtonDown,
    ButtonUp,
    Scroll(f32),
    KeyDown(Key),
}

/// Camera, viewport and cursor: everything needed to turn screen input into world space
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub camera: Camera,
    pub viewport: Viewport,
    pub cursor: Point2<f32>,
}

impl SceneContext {
    pub fn new(viewport: Viewport) -> Self {
        let mut camera = Camera::default();
        camera.aspect = viewport.aspect();
        Self {
            camera,
            viewport,
            cursor: viewport.center(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.camera.aspect = self.viewport.aspect();
    }

    /// Pick ray under the cursor
    pub fn cursor_ray(&self) -> CoreResult<Ray> {
        self.camera.screen_ray(&self.cursor, &self.viewport)
    }

    /// Cursor position unprojected onto the near plane
    pub fn cursor_world(&self) -> CoreResult<Point3<f32>> {
        self.camera.unproject_near(&self.cursor, &self.viewport)
    }

    pub fn camera_distance(&self, point: &Point3<f32>) -> f32 {
        nalgebra::distance(point, &self.camera.position)
    }
}

/// Interactive editing session
pub struct Editor {
    scene: Scene,
    selection: Selection,
    context: SceneContext,
    config: EditorConfig,
    /// OBJECT or EDIT
    view: Mode,
    /// NONE, or the transform / mesh-data operation in progress
    active: Mode,
}

impl Editor {
    pub fn new(scene: Scene, viewport: Viewport) -> Self {
        Self::with_config(scene, viewport, EditorConfig::default())
    }

    pub fn with_config(scene: Scene, viewport: Viewport, config: EditorConfig) -> Self {
        Self {
            scene,
            selection: Selection::default(),
            context: SceneContext::new(viewport),
            config,
            view: Mode::new(ModeKind::Object),
            active: Mode::default(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SceneContext {
        &mut self.context
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The operation in progress, or the view mode when idle
    pub fn mode(&self) -> Mode {
        if self.active.kind == ModeKind::None {
            self.view
        } else {
            self.active
        }
    }

    pub fn view_mode(&self) -> ModeKind {
        self.view.kind
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => self.pointer_moved(Point2::new(x, y)),
            InputEvent::ButtonDown => {
                if self.active.is_operation() {
                    trace!("picking disabled during {}", self.active);
                } else {
                    self.pick();
                }
            }
            InputEvent::ButtonUp => {
                if self.active.is_operation() {
                    self.commit();
                }
            }
            InputEvent::Scroll(steps) => self.zoom(steps),
            InputEvent::KeyDown(key) => self.key_down(key),
        }
    }

    fn key_down(&mut self, key: Key) {
        match key {
            Key::Tab => self.toggle_edit_mode(),
            Key::View(digit) => {
                if let Some(view) = PresetView::from_digit(digit) {
                    self.set_view(view);
                }
            }
            Key::G => self.enter_mode(ModeKind::Grab),
            Key::S => self.enter_mode(ModeKind::Scale),
            Key::R => self.enter_mode(ModeKind::Rotate),
            Key::E => self.enter_mode(ModeKind::Extrude),
            Key::F => self.enter_mode(ModeKind::Fill),
            Key::M => self.enter_mode(ModeKind::Merge),
            Key::X => self.set_axis(Axis::X),
            Key::Y => self.set_axis(Axis::Y),
            Key::Z => self.set_axis(Axis::Z),
            Key::LeftShift => self.toggle_shading(),
        }
    }

    fn has_selection(&self) -> bool {
        match self.view.kind {
            ModeKind::Edit => !self.selection.vertices().is_empty(),
            _ => self.selection.count() > 0,
        }
    }

    /// Switch between OBJECT and EDIT view. EDIT needs a selected object.
    pub fn toggle_edit_mode(&mut self) {
        if self.active.is_operation() {
            debug!("ignoring view toggle during {}", self.active);
            return;
        }
        match self.view.kind {
            ModeKind::Edit => {
                self.view = Mode::new(ModeKind::Object);
                self.selection.clear_vertices();
            }
            _ if self.selection.count() == 0 => {
                debug!("nothing selected, staying in object mode");
                return;
            }
            _ => self.view = Mode::new(ModeKind::Edit),
        }
        debug!(view = %self.view, "view mode changed");
    }

    /// Start a transform or mesh-data operation on the current selection
    pub fn enter_mode(&mut self, kind: ModeKind) {
        if !matches!(kind.category(), Category::Transform | Category::MeshData) {
            return;
        }
        if self.active.is_operation() {
            debug!("{} already active, ignoring {}", self.active, kind.label());
            return;
        }
        if !self.has_selection() {
            debug!("nothing selected, ignoring {}", kind.label());
            return;
        }
        self.active = Mode::new(kind);
        self.selection.reset_anchor();
        debug!(mode = %self.active, "operation started");
    }

    /// Lock the running operation to one axis
    pub fn set_axis(&mut self, axis: Axis) {
        if !self.active.is_operation() {
            debug!(?axis, "no operation running, ignoring axis");
            return;
        }
        self.active.axis = axis;
        debug!(mode = %self.active, "axis constraint set");
    }

    /// Finish the running operation
    pub fn commit(&mut self) {
        debug!(mode = %self.active, "operation committed");
        self.selection.reset_anchor();
        self.active = Mode::default();
    }

    fn set_view(&mut self, view: PresetView) {
        if self.active.is_operation() {
            return;
        }
        self.context.camera.set_preset(view);
        debug!(?view, "camera moved to preset");
    }

    fn zoom(&mut self, steps: f32) {
        if self.active.is_operation() {
            return;
        }
        self.context
            .camera
            .zoom(steps, self.config.zoom_speed, self.config.min_camera_distance);
    }

    fn toggle_shading(&mut self) {
        for id in self.selection.objects().to_vec() {
            if let Some(mesh) = self.scene.mesh_mut(id) {
                mesh.toggle_shading();
                debug!(mesh = mesh.name(), shading = ?mesh.shading(), "shading toggled");
            }
        }
    }

    /// Pick under the cursor: an object in OBJECT view, a face in EDIT view
    pub fn pick(&mut self) {
        let result = match self.view.kind {
            ModeKind::Edit => self.pick_face(),
            _ => self.pick_object(),
        };
        if let Err(err) = result {
            warn!(%err, "pick abandoned for this frame");
        }
    }

    fn pick_object(&mut self) -> CoreResult<()> {
        let ray = self.context.cursor_ray()?;
        let hit = raycast::pick_nearest(
            &ray,
            self.scene
                .iter()
                .filter(|(_, object)| raycast::intersects_any(&ray, object.bounding_proxy()))
                .map(|(id, object)| (id, object.position())),
        );

        match hit {
            Some(id) => {
                self.selection.select(id);
                debug!(object = id.0, "object picked");
            }
            None if self.config.clear_selection_on_miss => self.selection.clear(),
            None => {}
        }
        Ok(())
    }

    fn pick_face(&mut self) -> CoreResult<()> {
        let ray = self.context.cursor_ray()?;
        let scene = &self.scene;
        let candidates = self
            .selection
            .objects()
            .iter()
            .filter_map(|&id| scene.mesh(id).map(|mesh| (id, mesh)))
            .flat_map(|(id, mesh)| {
                mesh.triangles()
                    .iter()
                    .enumerate()
                    .filter(move |(_, triangle)| raycast::intersects(&ray, triangle))
                    .map(move |(face, triangle)| ((id, face), triangle.centroid()))
            });

        match raycast::pick_nearest(&ray, candidates) {
            Some((id, face)) => {
                let corners: Vec<Vertex> = self
                    .scene
                    .mesh(id)
                    .and_then(|mesh| {
                        let triangle = mesh.triangle(face)?;
                        Some(triangle.indices().map(|i| mesh.vertices()[i as usize]).to_vec())
                    })
                    .unwrap_or_default();
                self.selection.select_vertices(corners);
                debug!(object = id.0, face, "face picked");
            }
            None if self.config.clear_selection_on_miss => self.selection.clear_vertices(),
            None => {}
        }
        Ok(())
    }

    fn pointer_moved(&mut self, cursor: Point2<f32>) {
        self.context.cursor = cursor;
        if !self.active.is_operation() {
            return;
        }
        if let Err(err) = self.drag_frame() {
            warn!(%err, mode = %self.active, "transform frame abandoned");
        }
    }

    /// One frame of the running operation. On error nothing has been modified.
    fn drag_frame(&mut self) -> CoreResult<()> {
        let kind = self.active.kind;
        if kind.category() != Category::Transform {
            trace!("{} has no drag behaviour", kind.label());
            return Ok(());
        }

        let direction = self.active.axis.direction();
        if direction == Vector3::zeros() {
            return Ok(());
        }

        let world = self.context.cursor_world()?;
        let anchor = self.selection.anchor().unwrap_or(world);
        let delta = world - anchor;

        match self.view.kind {
            ModeKind::Edit => self.drag_vertices(kind, &direction, &anchor, &delta)?,
            _ => self.drag_objects(kind, &direction, &anchor, &delta)?,
        }

        self.selection.set_anchor(world);
        Ok(())
    }

    fn drag_objects(
        &mut self,
        kind: ModeKind,
        direction: &Vector3<f32>,
        anchor: &Point3<f32>,
        delta: &Vector3<f32>,
    ) -> CoreResult<()> {
        // Build every matrix before touching the scene so a failure leaves it intact
        let mut frames = Vec::with_capacity(self.selection.count());
        for &id in self.selection.objects() {
            if let Some(object) = self.scene.get(id) {
                let matrix = self.frame_matrix(kind, direction, anchor, delta, &object.position())?;
                frames.push((id, matrix));
            }
        }

        for (id, matrix) in frames {
            if let Some(object) = self.scene.get_mut(id) {
                trace!(object = id.0, ?matrix, "applying {}", kind.label());
                object.apply_transformation(kind, &matrix);
            }
        }
        Ok(())
    }

    fn drag_vertices(
        &mut self,
        kind: ModeKind,
        direction: &Vector3<f32>,
        anchor: &Point3<f32>,
        delta: &Vector3<f32>,
    ) -> CoreResult<()> {
        let Some(pivot) = self.selection.vertex_centroid() else {
            return Ok(());
        };
        let matrix = self.frame_matrix(kind, direction, anchor, delta, &pivot)?;
        let selected = self.selection.vertices().to_vec();
        let objects: Vec<ObjectId> = self.selection.objects().to_vec();

        let mut moved = Vec::with_capacity(selected.len());
        for id in objects {
            let Some(mesh) = self.scene.mesh_mut(id) else {
                continue;
            };
            let handles: Vec<u32> = selected.iter().flat_map(|v| mesh.find_vertices(v)).collect();
            if handles.is_empty() {
                continue;
            }
            mesh.apply_transform_to_vertices(kind, &matrix, &handles, &pivot);
            moved.extend(handles.iter().map(|&h| mesh.vertices()[h as usize]));
        }

        self.selection.select_vertices(moved);
        Ok(())
    }

    /// Matrix for one frame of `kind`, acting on something pivoting at `pivot`
    fn frame_matrix(
        &self,
        kind: ModeKind,
        direction: &Vector3<f32>,
        anchor: &Point3<f32>,
        delta: &Vector3<f32>,
        pivot: &Point3<f32>,
    ) -> CoreResult<Matrix4<f32>> {
        let distance = self.context.camera_distance(pivot);

        let matrix = match kind {
            ModeKind::Grab => Transform::grab(direction, delta, distance),
            ModeKind::Scale => {
                if delta.norm() < EPSILON {
                    return Ok(Matrix4::identity());
                }
                let viewport = &self.context.viewport;
                let Some(previous) = self.context.camera.project_to_screen(anchor, viewport) else {
                    return Ok(Matrix4::identity());
                };
                let center = viewport.center();
                let previous_radius = (previous.xy() - center).norm();
                let radius = (self.context.cursor - center).norm();
                // Per-frame factor from the radius change (1 + dr * d / s), not the
                // absolute radius divided by the current scale, so a still pointer is identity
                Transform::relative_scale(
                    direction,
                    previous_radius,
                    radius,
                    distance,
                    self.config.scaling_sensitivity,
                )
            }
            ModeKind::Rotate => {
                let sign = if delta.dot(&self.context.camera.right()) < 0.0 {
                    -1.0
                } else {
                    1.0
                };
                Transform::rotate(direction, sign * delta.norm() * self.config.rotation_speed)
            }
            _ => Matrix4::identity(),
        };
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn editor_with_cube() -> Editor {
        let mut scene = Scene::new();
        scene.add(Mesh::cube(1.0));
        Editor::new(scene, Viewport::new(800, 600))
    }

    fn click(editor: &mut Editor, x: f32, y: f32) {
        editor.handle_event(InputEvent::PointerMoved { x, y });
        editor.handle_event(InputEvent::ButtonDown);
        editor.handle_event(InputEvent::ButtonUp);
    }

    #[test]
    fn test_starts_in_object_mode() {
        let editor = editor_with_cube();
        assert_eq!(editor.mode(), Mode::new(ModeKind::Object));
        assert!(editor.selection().objects().is_empty());
    }

    #[test]
    fn test_edit_mode_needs_selection() {
        let mut editor = editor_with_cube();
        editor.handle_event(InputEvent::KeyDown(Key::Tab));
        assert_eq!(editor.view_mode(), ModeKind::Object);

        click(&mut editor, 400.0, 300.0);
        editor.handle_event(InputEvent::KeyDown(Key::Tab));
        assert_eq!(editor.view_mode(), ModeKind::Edit);
        editor.handle_event(InputEvent::KeyDown(Key::Tab));
        assert_eq!(editor.view_mode(), ModeKind::Object);
    }

    #[test]
    fn test_transform_needs_selection() {
        let mut editor = editor_with_cube();
        editor.handle_event(InputEvent::KeyDown(Key::G));
        assert_eq!(editor.mode().kind, ModeKind::Object);
    }

    #[test]
    fn test_axis_ignored_without_operation() {
        let mut editor = editor_with_cube();
        click(&mut editor, 400.0, 300.0);
        editor.handle_event(InputEvent::KeyDown(Key::X));
        assert_eq!(editor.mode().axis, Axis::None);

        editor.handle_event(InputEvent::KeyDown(Key::S));
        editor.handle_event(InputEvent::KeyDown(Key::X));
        assert_eq!(editor.mode(), Mode::new(ModeKind::Scale).with_axis(Axis::X));
    }

    #[test]
    fn test_entering_mode_resets_axis() {
        let mut editor = editor_with_cube();
        click(&mut editor, 400.0, 300.0);
        editor.handle_event(InputEvent::KeyDown(Key::R));
        editor.handle_event(InputEvent::KeyDown(Key::Z));
        editor.handle_event(InputEvent::ButtonUp);
        editor.handle_event(InputEvent::KeyDown(Key::G));
        assert_eq!(editor.mode(), Mode::new(ModeKind::Grab));
    }

    #[test]
    fn test_release_commits() {
        let mut editor = editor_with_cube();
        click(&mut editor, 400.0, 300.0);
        editor.handle_event(InputEvent::KeyDown(Key::G));
        editor.handle_event(InputEvent::KeyDown(Key::Y));
        editor.handle_event(InputEvent::PointerMoved { x: 410.0, y: 300.0 });
        assert!(editor.selection().anchor().is_some());

        editor.handle_event(InputEvent::ButtonUp);
        assert_eq!(editor.mode(), Mode::new(ModeKind::Object));
        assert!(editor.selection().anchor().is_none());
        assert_eq!(editor.selection().primary(), Some(ObjectId(0)));
    }

    #[test]
    fn test_click_on_empty_space_clears() {
        let mut editor = editor_with_cube();
        click(&mut editor, 400.0, 300.0);
        click(&mut editor, 10.0, 10.0);
        assert!(editor.selection().objects().is_empty());
    }

    #[test]
    fn test_click_on_empty_space_can_keep_selection() {
        let mut scene = Scene::new();
        scene.add(Mesh::cube(1.0));
        let config = EditorConfig {
            clear_selection_on_miss: false,
            ..EditorConfig::default()
        };
        let mut editor = Editor::with_config(scene, Viewport::new(800, 600), config);
        click(&mut editor, 400.0, 300.0);
        click(&mut editor, 10.0, 10.0);
        assert_eq!(editor.selection().count(), 1);
    }

    #[test]
    fn test_shift_toggles_shading_of_selection() {
        let mut editor = editor_with_cube();
        editor.handle_event(InputEvent::KeyDown(Key::LeftShift));
        assert_eq!(editor.scene().mesh(ObjectId(0)).unwrap().shading(), crate::ShadingMode::Flat);

        click(&mut editor, 400.0, 300.0);
        editor.handle_event(InputEvent::KeyDown(Key::LeftShift));
        assert_eq!(editor.scene().mesh(ObjectId(0)).unwrap().shading(), crate::ShadingMode::Smooth);
    }

    #[test]
    fn test_camera_locked_during_operation() {
        let mut editor = editor_with_cube();
        click(&mut editor, 400.0, 300.0);
        editor.handle_event(InputEvent::KeyDown(Key::G));
        let camera = editor.context().camera.clone();
        editor.handle_event(InputEvent::KeyDown(Key::View(5)));
        editor.handle_event(InputEvent::Scroll(3.0));
        assert_eq!(editor.context().camera, camera);

        editor.handle_event(InputEvent::ButtonUp);
        editor.handle_event(InputEvent::KeyDown(Key::View(5)));
        assert!((editor.context().camera.position - Point3::new(0.0, 5.0, 0.0)).norm() < 1e-5);
    }
}
