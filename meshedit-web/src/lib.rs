/// MeshEdit Web - WASM bindings around the editing core
///
/// The page owns the canvas and the WebGL context. It forwards pointer and
/// keyboard events here and pulls vertex buffers, silhouette edges and the
/// camera matrix back out every frame.
use meshedit_core::{
    silhouette, Editor, EditorConfig, InputEvent, Key, Light, Mesh, ObjectId, ProjectionMode, Scene,
    Transformable, Viewport,
};
use nalgebra::Point3;
use wasm_bindgen::prelude::*;
use web_sys::console;

/// Map a DOM `KeyboardEvent.key` / `code` value to an editor key
pub fn parse_key(key: &str) -> Option<Key> {
    let mapped = match key {
        "Tab" => Key::Tab,
        "Shift" | "ShiftLeft" => Key::LeftShift,
        "g" | "G" => Key::G,
        "s" | "S" => Key::S,
        "r" | "R" => Key::R,
        "e" | "E" => Key::E,
        "f" | "F" => Key::F,
        "m" | "M" => Key::M,
        "x" | "X" => Key::X,
        "y" | "Y" => Key::Y,
        "z" | "Z" => Key::Z,
        digit => match digit.parse::<u8>() {
            Ok(d @ 1..=6) => Key::View(d),
            _ => return None,
        },
    };
    Some(mapped)
}

fn default_scene() -> Scene {
    let mut scene = Scene::new();
    scene.add(Mesh::cube(2.0));
    scene.add(Light::new("Light", Point3::new(2.5, 2.0, 1.5)));
    scene
}

#[wasm_bindgen]
pub struct WebEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WebEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> WebEditor {
        WebEditor {
            editor: Editor::new(default_scene(), Viewport::new(width, height)),
        }
    }

    /// Build an editor with settings from a JSON document
    pub fn with_config(width: u32, height: u32, json: &str) -> Result<WebEditor, JsValue> {
        let config = EditorConfig::from_json(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(WebEditor {
            editor: Editor::with_config(default_scene(), Viewport::new(width, height), config),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.editor.context_mut().resize(width, height);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.editor.handle_event(InputEvent::PointerMoved { x, y });
    }

    pub fn pointer_down(&mut self) {
        self.editor.handle_event(InputEvent::ButtonDown);
    }

    pub fn pointer_up(&mut self) {
        self.editor.handle_event(InputEvent::ButtonUp);
    }

    pub fn scroll(&mut self, steps: f32) {
        self.editor.handle_event(InputEvent::Scroll(steps));
    }

    /// Returns false for keys the editor doesn't use
    pub fn key_down(&mut self, key: &str) -> bool {
        match parse_key(key) {
            Some(key) => {
                self.editor.handle_event(InputEvent::KeyDown(key));
                true
            }
            None => {
                console::warn_1(&format!("meshedit: unmapped key {key:?}").into());
                false
            }
        }
    }

    /// Flip between perspective and orthographic; returns true when orthographic
    pub fn toggle_projection(&mut self) -> bool {
        let camera = &mut self.editor.context_mut().camera;
        camera.toggle_projection();
        camera.mode == ProjectionMode::Orthographic
    }

    /// Current mode, e.g. `GRAB [X]`
    pub fn mode_label(&self) -> String {
        self.editor.mode().to_string()
    }

    pub fn object_count(&self) -> usize {
        self.editor.scene().len()
    }

    pub fn object_name(&self, object: usize) -> Option<String> {
        self.editor
            .scene()
            .get(ObjectId(object))
            .map(|o| o.name().to_string())
    }

    pub fn selected_object(&self) -> Option<u32> {
        self.editor.selection().primary().map(|id| id.0 as u32)
    }

    /// Flat `[x, y, z, ...]` positions of an object's pick geometry
    pub fn positions(&self, object: usize) -> Vec<f32> {
        match self.editor.scene().get(ObjectId(object)) {
            Some(o) => match o.as_mesh() {
                Some(mesh) => mesh.positions_buffer(),
                None => o
                    .bounding_proxy()
                    .iter()
                    .flat_map(|t| t.corners().iter().flat_map(|p| [p.x, p.y, p.z]))
                    .collect(),
            },
            None => Vec::new(),
        }
    }

    /// Index buffer matching [`WebEditor::positions`]
    pub fn indices(&self, object: usize) -> Vec<u32> {
        match self.editor.scene().get(ObjectId(object)) {
            Some(o) => match o.as_mesh() {
                Some(mesh) => mesh.face_indices().to_vec(),
                None => (0..o.bounding_proxy().len() as u32 * 3).collect(),
            },
            None => Vec::new(),
        }
    }

    /// Vertex handle pairs of the edges outlining a mesh from the current camera
    pub fn silhouette_edges(&self, object: usize) -> Vec<u32> {
        let eye = self.editor.context().camera.position;
        self.editor
            .scene()
            .mesh(ObjectId(object))
            .map(|mesh| {
                silhouette::silhouette_edges(mesh, &eye)
                    .into_iter()
                    .flat_map(|edge| {
                        let (a, b) = edge.vertices();
                        [a, b]
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flat `[x, y, z, ...]` positions of the selected vertices
    pub fn selected_vertices(&self) -> Vec<f32> {
        self.editor
            .selection()
            .vertices()
            .iter()
            .flat_map(|v| [v.position.x, v.position.y, v.position.z])
            .collect()
    }

    /// Column-major `projection * view`, ready for `uniformMatrix4fv`
    pub fn view_projection(&self) -> Vec<f32> {
        let camera = &self.editor.context().camera;
        (camera.projection_matrix() * camera.view_matrix()).as_slice().to_vec()
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console::log_1(&"meshedit: core loaded".into());
    Ok(())
}
