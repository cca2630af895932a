//! Error types for the editing core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building meshes or mapping between screen and world space.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Matrix cannot be inverted (determinant within epsilon of zero, or not finite).
    #[error("matrix is singular (determinant {determinant})")]
    SingularMatrix {
        /// Determinant of the rejected matrix.
        determinant: f32,
    },

    /// Face index buffer does not describe whole triangles.
    #[error("face index buffer has {len} entries, expected a multiple of 3")]
    InvalidFaceIndices {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("vertex index {index} out of range for {vertex_count} vertices")]
    VertexOutOfRange {
        /// Offending index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// An edge is shared by more than two triangles.
    #[error("edge ({a}, {b}) is shared by {count} triangles")]
    NonManifoldEdge {
        /// Smaller vertex handle of the edge.
        a: u32,
        /// Larger vertex handle of the edge.
        b: u32,
        /// Number of adjacent triangles.
        count: usize,
    },

    /// Editor configuration could not be parsed.
    #[error("invalid editor configuration: {0}")]
    Config(#[from] serde_json::Error),
}
