//! Silhouette (outline) edge classification

use nalgebra::Point3;

use crate::geometry::{Edge, Triangle};
use crate::mesh::Mesh;

/// Per-edge result handed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeClass {
    pub edge: Edge,
    pub silhouette: bool,
}

/// Decide whether an edge outlines the mesh as seen from `viewpoint`.
///
/// Boundary edges (one face) always do. Interior edges do when one neighbour
/// faces the viewer and the other faces away. Edges touching a degenerate face
/// never do.
pub fn is_silhouette_edge(adjacent: &[&Triangle], viewpoint: &Point3<f32>) -> bool {
    if adjacent.iter().any(|t| t.is_degenerate()) {
        return false;
    }
    match adjacent {
        [_] => true,
        [a, b] => a.faces_towards(viewpoint) != b.faces_towards(viewpoint),
        _ => false,
    }
}

/// Classify every edge of the mesh, in topology order
pub fn classify_edges(mesh: &Mesh, viewpoint: &Point3<f32>) -> Vec<EdgeClass> {
    mesh.edges()
        .map(|(edge, faces)| {
            let adjacent: Vec<&Triangle> = faces.iter().filter_map(|&f| mesh.triangle(f)).collect();
            EdgeClass {
                edge: *edge,
                silhouette: is_silhouette_edge(&adjacent, viewpoint),
            }
        })
        .collect()
}

/// Only the silhouette edges
pub fn silhouette_edges(mesh: &Mesh, viewpoint: &Point3<f32>) -> Vec<Edge> {
    classify_edges(mesh, viewpoint)
        .into_iter()
        .filter(|class| class.silhouette)
        .map(|class| class.edge)
        .collect()
}
