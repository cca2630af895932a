use meshedit_core::{
    silhouette, Axis, Editor, InputEvent, Key, Light, Mesh, Mode, ModeKind, ObjectId, Scene,
    Transformable, Viewport,
};
use nalgebra::{Point3, Vector3};

fn cube_editor() -> Editor {
    let mut scene = Scene::new();
    scene.add(Mesh::cube(1.0));
    Editor::new(scene, Viewport::new(800, 600))
}

fn move_to(editor: &mut Editor, x: f32, y: f32) {
    editor.handle_event(InputEvent::PointerMoved { x, y });
}

fn click(editor: &mut Editor, x: f32, y: f32) {
    move_to(editor, x, y);
    editor.handle_event(InputEvent::ButtonDown);
    editor.handle_event(InputEvent::ButtonUp);
}

fn cube(editor: &Editor) -> &Mesh {
    editor.scene().mesh(ObjectId(0)).unwrap()
}

#[test]
fn test_click_selects_cube_under_cursor() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    assert_eq!(editor.selection().primary(), Some(ObjectId(0)));
}

#[test]
fn test_nearest_object_wins() {
    let mut scene = Scene::new();
    scene.add(Mesh::cube(1.0).with_name("Far").placed_at(Point3::new(0.0, 0.0, -3.0)));
    scene.add(Mesh::cube(1.0).with_name("Near"));
    let mut editor = Editor::new(scene, Viewport::new(800, 600));

    click(&mut editor, 400.0, 300.0);
    let picked = editor.selection().primary().unwrap();
    assert_eq!(editor.scene().get(picked).unwrap().name(), "Near");
}

#[test]
fn test_grab_follows_pointer() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);

    editor.handle_event(InputEvent::KeyDown(Key::G));
    assert_eq!(editor.mode(), Mode::new(ModeKind::Grab));
    move_to(&mut editor, 400.0, 300.0);
    move_to(&mut editor, 450.0, 300.0);
    editor.handle_event(InputEvent::ButtonUp);

    let position = cube(&editor).position();
    assert!(position.x > 0.01);
    assert!(position.y.abs() < 1e-4);
    assert!(position.z.abs() < 1e-4);
    assert_eq!(editor.mode(), Mode::new(ModeKind::Object));
    assert!(editor.selection().anchor().is_none());
}

#[test]
fn test_axis_locked_grab() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);

    editor.handle_event(InputEvent::KeyDown(Key::G));
    editor.handle_event(InputEvent::KeyDown(Key::Y));
    move_to(&mut editor, 400.0, 300.0);
    move_to(&mut editor, 460.0, 250.0);

    let position = cube(&editor).position();
    assert_eq!(position.x, 0.0);
    assert_eq!(position.z, 0.0);
    assert!(position.y > 0.0);
}

#[test]
fn test_scale_on_one_axis() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);

    editor.handle_event(InputEvent::KeyDown(Key::S));
    editor.handle_event(InputEvent::KeyDown(Key::Y));
    move_to(&mut editor, 400.0, 300.0);
    move_to(&mut editor, 400.0, 100.0);

    let scale = cube(&editor).scale();
    assert!(scale.y > 1.5);
    assert_eq!(scale.x, 1.0);
    assert_eq!(scale.z, 1.0);
}

#[test]
fn test_scale_without_movement_is_identity() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);

    editor.handle_event(InputEvent::KeyDown(Key::S));
    for _ in 0..5 {
        move_to(&mut editor, 520.0, 180.0);
    }
    assert_eq!(cube(&editor).scale(), Vector3::repeat(1.0));
    assert_eq!(cube(&editor).position(), Point3::origin());
}

#[test]
fn test_rotate_about_z() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);

    editor.handle_event(InputEvent::KeyDown(Key::R));
    editor.handle_event(InputEvent::KeyDown(Key::Z));
    move_to(&mut editor, 400.0, 300.0);
    move_to(&mut editor, 440.0, 300.0);

    let euler = cube(&editor).transform().euler;
    assert!(euler.z.abs() > 0.0);
    assert!(euler.x.abs() < 1e-5);
    assert!(euler.y.abs() < 1e-5);
    assert_eq!(cube(&editor).position(), Point3::origin());
}

#[test]
fn test_light_grabs_but_does_not_scale() {
    let mut scene = Scene::new();
    scene.add(Light::new("Lamp", Point3::origin()));
    let mut editor = Editor::new(scene, Viewport::new(800, 600));
    click(&mut editor, 400.0, 300.0);
    assert_eq!(editor.selection().primary(), Some(ObjectId(0)));

    editor.handle_event(InputEvent::KeyDown(Key::S));
    move_to(&mut editor, 400.0, 300.0);
    move_to(&mut editor, 400.0, 100.0);
    editor.handle_event(InputEvent::ButtonUp);
    let light = editor.scene().get(ObjectId(0)).unwrap();
    assert_eq!(light.scale(), Vector3::repeat(1.0));

    editor.handle_event(InputEvent::KeyDown(Key::G));
    move_to(&mut editor, 400.0, 300.0);
    move_to(&mut editor, 300.0, 300.0);
    editor.handle_event(InputEvent::ButtonUp);
    assert!(editor.scene().get(ObjectId(0)).unwrap().position().x < 0.0);
}

#[test]
fn test_edit_mode_face_pick_and_vertex_grab() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    editor.handle_event(InputEvent::KeyDown(Key::Tab));
    assert_eq!(editor.view_mode(), ModeKind::Edit);

    // Lower-right half of the front face
    click(&mut editor, 420.0, 320.0);
    let selected = editor.selection().vertices().to_vec();
    assert_eq!(selected.len(), 3);
    assert!(selected.iter().all(|v| v.position.z == 0.5));

    editor.handle_event(InputEvent::KeyDown(Key::G));
    editor.handle_event(InputEvent::KeyDown(Key::Y));
    move_to(&mut editor, 420.0, 320.0);
    move_to(&mut editor, 420.0, 200.0);
    editor.handle_event(InputEvent::ButtonUp);

    let mesh = cube(&editor);
    assert_eq!(mesh.position(), Point3::origin());
    let moved: Vec<_> = mesh
        .vertices()
        .iter()
        .filter(|v| (v.position.y.abs() - 0.5).abs() > 1e-3)
        .collect();
    assert_eq!(moved.len(), 3);

    // Selection follows the moved vertices
    for vertex in editor.selection().vertices() {
        assert_eq!(mesh.find_vertices(vertex).len(), 1);
    }
    assert_eq!(mesh.edge_count(), 18);
}

#[test]
fn test_leaving_edit_mode_clears_vertices() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    editor.handle_event(InputEvent::KeyDown(Key::Tab));
    click(&mut editor, 420.0, 320.0);
    assert!(!editor.selection().vertices().is_empty());

    editor.handle_event(InputEvent::KeyDown(Key::Tab));
    assert_eq!(editor.view_mode(), ModeKind::Object);
    assert!(editor.selection().vertices().is_empty());
    assert_eq!(editor.selection().primary(), Some(ObjectId(0)));
}

#[test]
fn test_edit_mode_operation_needs_vertices() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    editor.handle_event(InputEvent::KeyDown(Key::Tab));
    editor.handle_event(InputEvent::KeyDown(Key::G));
    assert_eq!(editor.mode(), Mode::new(ModeKind::Edit));
}

#[test]
fn test_mesh_data_mode_leaves_geometry_alone() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    editor.handle_event(InputEvent::KeyDown(Key::Tab));
    click(&mut editor, 420.0, 320.0);
    let before = cube(&editor).positions_buffer();

    editor.handle_event(InputEvent::KeyDown(Key::E));
    assert_eq!(editor.mode().kind, ModeKind::Extrude);
    editor.handle_event(InputEvent::KeyDown(Key::X));
    assert_eq!(editor.mode().axis, Axis::X);
    move_to(&mut editor, 500.0, 500.0);
    editor.handle_event(InputEvent::ButtonUp);

    assert_eq!(cube(&editor).positions_buffer(), before);
    assert_eq!(editor.mode(), Mode::new(ModeKind::Edit));
}

#[test]
fn test_second_operation_ignored_while_active() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    editor.handle_event(InputEvent::KeyDown(Key::G));
    editor.handle_event(InputEvent::KeyDown(Key::R));
    assert_eq!(editor.mode().kind, ModeKind::Grab);
}

#[test]
fn test_degenerate_camera_abandons_frame() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    editor.handle_event(InputEvent::KeyDown(Key::G));

    let camera = &mut editor.context_mut().camera;
    camera.position = camera.target;
    move_to(&mut editor, 400.0, 300.0);
    move_to(&mut editor, 500.0, 300.0);

    assert_eq!(cube(&editor).position(), Point3::origin());
    assert!(editor.selection().anchor().is_none());
    assert_eq!(editor.mode().kind, ModeKind::Grab);
}

#[test]
fn test_degenerate_camera_pick_keeps_selection() {
    let mut editor = cube_editor();
    click(&mut editor, 400.0, 300.0);
    editor.handle_event(InputEvent::KeyDown(Key::Tab));
    click(&mut editor, 420.0, 320.0);
    let vertices = editor.selection().vertices().to_vec();
    assert_eq!(vertices.len(), 3);

    let camera = &mut editor.context_mut().camera;
    camera.position = camera.target;

    // Edit view: the face pick is abandoned, vertices stay selected
    click(&mut editor, 10.0, 10.0);
    assert_eq!(editor.selection().vertices().len(), 3);
    for (kept, before) in editor.selection().vertices().iter().zip(&vertices) {
        assert!(kept.same_position(before));
    }

    // Object view: the object pick is abandoned, the object stays selected
    editor.handle_event(InputEvent::KeyDown(Key::Tab));
    click(&mut editor, 10.0, 10.0);
    assert_eq!(editor.selection().primary(), Some(ObjectId(0)));
}

#[test]
fn test_silhouette_follows_camera() {
    let mut editor = cube_editor();
    let eye = editor.context().camera.position;
    assert_eq!(silhouette::silhouette_edges(cube(&editor), &eye).len(), 4);

    // Zoom never passes through the minimum distance
    for _ in 0..100 {
        editor.handle_event(InputEvent::Scroll(1.0));
    }
    let camera = &editor.context().camera;
    assert!((camera.distance() - editor.config().min_camera_distance).abs() < 1e-4);
}
