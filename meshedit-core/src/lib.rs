/// MeshEdit Core Library - Mesh model, picking and the editing state machine
///
/// This library holds everything the front ends share: geometry primitives,
/// the mesh and its edge topology, ray casting, silhouette detection,
/// camera projection and the selection/transform state machine.

pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod math;
pub mod mesh;
pub mod mode;
pub mod projection;
pub mod raycast;
pub mod scene;
pub mod selection;
pub mod silhouette;
pub mod transform;

// Re-export commonly used types
pub use config::EditorConfig;
pub use editor::{Editor, InputEvent, Key, SceneContext};
pub use error::{CoreError, CoreResult};
pub use geometry::{Edge, ShadingMode, Triangle, Vertex};
pub use mesh::Mesh;
pub use mode::{Axis, Category, Mode, ModeKind};
pub use projection::{Camera, PresetView, ProjectionMode, Viewport};
pub use raycast::Ray;
pub use scene::{Light, ObjectId, Scene, SceneObject, Transformable};
pub use selection::Selection;
pub use silhouette::EdgeClass;
pub use transform::{ObjectTransform, RotationState, Transform};
