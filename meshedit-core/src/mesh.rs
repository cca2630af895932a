/// Indexed triangle mesh with an edge-adjacency (topology) index
use std::collections::BTreeMap;

use nalgebra::{Matrix4, Point3, Vector3};
use tracing::trace;

use crate::error::{CoreError, CoreResult};
use crate::geometry::{Edge, ShadingMode, Triangle, Vertex};
use crate::math::{self, EPSILON};
use crate::mode::ModeKind;
use crate::transform::ObjectTransform;

/// Faces whose normals agree this closely are treated as one flat surface
const COPLANAR_DOT: f32 = 1.0 - 1e-4;

/// A triangle mesh that owns its vertices, faces, adjacency and placement
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    face_indices: Vec<u32>,
    triangles: Vec<Triangle>,
    topology: BTreeMap<Edge, Vec<usize>>,
    transform: ObjectTransform,
    shading: ShadingMode,
}

impl Mesh {
    /// Build a mesh from a vertex arena and a flat index buffer (3 handles per face).
    ///
    /// Rejects index buffers that don't describe whole triangles, out-of-range
    /// handles, and edges shared by more than two faces.
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, face_indices: Vec<u32>) -> CoreResult<Self> {
        if face_indices.len() % 3 != 0 {
            return Err(CoreError::InvalidFaceIndices {
                len: face_indices.len(),
            });
        }
        if let Some(&index) = face_indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(CoreError::VertexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        let mesh = Self::assemble(name.into(), vertices, face_indices);

        if let Some((edge, faces)) = mesh.topology.iter().find(|(_, faces)| faces.len() > 2) {
            let (a, b) = edge.vertices();
            return Err(CoreError::NonManifoldEdge {
                a,
                b,
                count: faces.len(),
            });
        }
        Ok(mesh)
    }

    /// Create an axis-aligned cube centred on the origin (8 shared vertices, 12 faces)
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Vertex::new(-half, -half, -half),
            Vertex::new(half, -half, -half),
            Vertex::new(half, half, -half),
            Vertex::new(-half, half, -half),
            Vertex::new(-half, -half, half),
            Vertex::new(half, -half, half),
            Vertex::new(half, half, half),
            Vertex::new(-half, half, half),
        ];
        #[rustfmt::skip]
        let faces = vec![
            4, 5, 6, 4, 6, 7, // front
            0, 2, 1, 0, 3, 2, // back
            1, 2, 6, 1, 6, 5, // right
            0, 4, 7, 0, 7, 3, // left
            3, 7, 6, 3, 6, 2, // top
            0, 1, 5, 0, 5, 4, // bottom
        ];
        Self::assemble("Cube".to_string(), vertices, faces)
    }

    /// Create a square in the XZ plane facing +Y (an open mesh)
    pub fn plane(size: f32) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Vertex::new(-half, 0.0, -half).with_uv(0.0, 0.0),
            Vertex::new(half, 0.0, -half).with_uv(1.0, 0.0),
            Vertex::new(half, 0.0, half).with_uv(1.0, 1.0),
            Vertex::new(-half, 0.0, half).with_uv(0.0, 1.0),
        ];
        Self::assemble("Plane".to_string(), vertices, vec![0, 2, 1, 0, 3, 2])
    }

    /// Derive faces, adjacency and normals from buffers whose indices are in range
    fn assemble(name: String, vertices: Vec<Vertex>, face_indices: Vec<u32>) -> Self {
        let triangles = face_indices
            .chunks_exact(3)
            .map(|face| {
                let indices = [face[0], face[1], face[2]];
                Triangle::new(indices, indices.map(|i| vertices[i as usize].position))
            })
            .collect();
        let mut mesh = Self {
            name,
            vertices,
            face_indices,
            triangles,
            topology: BTreeMap::new(),
            transform: ObjectTransform::default(),
            shading: ShadingMode::default(),
        };
        mesh.build_topology_index();
        mesh.compute_vertex_normals();
        mesh
    }

    /// Move a freshly built mesh so its pivot sits at `position`
    pub fn placed_at(mut self, position: Point3<f32>) -> Self {
        let offset = position - self.transform.position;
        self.apply_transform(ModeKind::Grab, &Matrix4::new_translation(&offset));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Clear and repopulate the edge -> adjacent faces map from the index buffer
    pub fn build_topology_index(&mut self) {
        self.topology.clear();
        for (face, triangle) in self.triangles.iter().enumerate() {
            for edge in triangle.edges() {
                self.topology.entry(edge).or_default().push(face);
            }
        }
    }

    /// Faces bordering `edge` (empty when the edge isn't part of the mesh)
    pub fn adjacent_triangles(&self, edge: &Edge) -> &[usize] {
        self.topology.get(edge).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every edge with its adjacent faces, in ascending edge order
    pub fn edges(&self) -> impl Iterator<Item = (&Edge, &[usize])> {
        self.topology.iter().map(|(edge, faces)| (edge, faces.as_slice()))
    }

    pub fn edge_count(&self) -> usize {
        self.topology.len()
    }

    /// Edges bordering a single face
    pub fn boundary_edges(&self) -> Vec<Edge> {
        self.edges()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| *edge)
            .collect()
    }

    /// Edges where the surface bends: boundary edges plus edges between
    /// faces that are not coplanar. A cube has twelve of them.
    pub fn feature_edges(&self) -> Vec<Edge> {
        self.edges()
            .filter(|(_, faces)| match faces {
                [_] => true,
                [a, b] => {
                    let (ta, tb) = (&self.triangles[*a], &self.triangles[*b]);
                    !ta.is_degenerate() && !tb.is_degenerate() && ta.normal().dot(&tb.normal()) < COPLANAR_DOT
                }
                _ => false,
            })
            .map(|(edge, _)| *edge)
            .collect()
    }

    /// Unit normal of a face; zero for degenerate or unknown faces
    pub fn face_normal(&self, face: usize) -> Vector3<f32> {
        self.triangles
            .get(face)
            .map(Triangle::normal)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Normal a renderer should use at `corner` (0..3) of `face`, honouring the shading mode
    pub fn shading_normal(&self, face: usize, corner: usize) -> Vector3<f32> {
        match self.shading {
            ShadingMode::Flat => self.face_normal(face),
            ShadingMode::Smooth => self
                .triangles
                .get(face)
                .and_then(|t| t.indices().get(corner).copied())
                .and_then(|i| self.vertices.get(i as usize))
                .map(|v| v.normal)
                .unwrap_or_else(Vector3::zeros),
        }
    }

    /// Recompute per-vertex normals as the average of adjacent non-degenerate face normals
    pub fn compute_vertex_normals(&mut self) {
        for vertex in &mut self.vertices {
            vertex.normal = Vector3::zeros();
        }
        for triangle in self.triangles.iter().filter(|t| !t.is_degenerate()) {
            let normal = triangle.normal();
            for index in triangle.indices() {
                self.vertices[index as usize].normal += normal;
            }
        }
        for vertex in &mut self.vertices {
            vertex.normal = vertex.normal.try_normalize(EPSILON).unwrap_or_else(Vector3::zeros);
        }
    }

    /// Apply one frame of an object-level transform.
    ///
    /// GRAB reads the translation column, SCALE the diagonal (relative factors,
    /// applied about the mesh position), ROTATE the whole matrix (about the mesh
    /// position). Every other mode leaves the mesh untouched.
    pub fn apply_transform(&mut self, kind: ModeKind, matrix: &Matrix4<f32>) {
        let pivot = self.transform.position;
        match kind {
            ModeKind::Grab => {
                let delta = math::translation_of(matrix);
                self.transform.position += delta;
                for vertex in &mut self.vertices {
                    vertex.position += delta;
                }
            }
            ModeKind::Scale => {
                let factors = math::scale_of(matrix);
                if !valid_scale(&factors) {
                    trace!(?factors, "rejecting collapsing scale");
                    return;
                }
                self.transform.scale = self.transform.scale.component_mul(&factors);
                for vertex in &mut self.vertices {
                    vertex.position = pivot + (vertex.position - pivot).component_mul(&factors);
                }
            }
            ModeKind::Rotate => {
                self.transform.rotate_by(matrix);
                let about = math::about_pivot(&pivot, matrix);
                for vertex in &mut self.vertices {
                    vertex.position = about.transform_point(&vertex.position);
                }
            }
            other => {
                trace!(mode = ?other, mesh = %self.name, "mode has no transform, ignoring");
                return;
            }
        }
        self.refresh_geometry();
    }

    /// Apply one frame of a transform to a subset of vertices, about `pivot`.
    ///
    /// This changes the mesh's shape, so the topology index is rebuilt afterwards.
    pub fn apply_transform_to_vertices(
        &mut self,
        kind: ModeKind,
        matrix: &Matrix4<f32>,
        handles: &[u32],
        pivot: &Point3<f32>,
    ) {
        let local = match kind {
            ModeKind::Grab => Matrix4::new_translation(&math::translation_of(matrix)),
            ModeKind::Scale if valid_scale(&math::scale_of(matrix)) => math::about_pivot(pivot, matrix),
            ModeKind::Rotate => math::about_pivot(pivot, matrix),
            other => {
                trace!(mode = ?other, mesh = %self.name, "mode has no vertex transform, ignoring");
                return;
            }
        };

        for &handle in handles {
            if let Some(vertex) = self.vertices.get_mut(handle as usize) {
                vertex.position = local.transform_point(&vertex.position);
            }
        }
        self.refresh_geometry();
        self.build_topology_index();
    }

    /// Handles of every vertex sitting at `vertex`'s position
    pub fn find_vertices(&self, vertex: &Vertex) -> Vec<u32> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.same_position(vertex))
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Vertex positions as a flat `[x, y, z, ...]` buffer for renderers
    pub fn positions_buffer(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.position.x, v.position.y, v.position.z])
            .collect()
    }

    fn refresh_geometry(&mut self) {
        for triangle in &mut self.triangles {
            let corners = triangle.indices().map(|i| self.vertices[i as usize].position);
            triangle.refresh(corners);
        }
        self.compute_vertex_normals();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn face_indices(&self) -> &[u32] {
        &self.face_indices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle(&self, face: usize) -> Option<&Triangle> {
        self.triangles.get(face)
    }

    pub fn transform(&self) -> &ObjectTransform {
        &self.transform
    }

    pub fn position(&self) -> Point3<f32> {
        self.transform.position
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.transform.scale
    }

    pub fn shading(&self) -> ShadingMode {
        self.shading
    }

    pub fn toggle_shading(&mut self) {
        self.shading = self.shading.toggled();
    }
}

fn valid_scale(factors: &Vector3<f32>) -> bool {
    factors.iter().all(|f| f.is_finite() && *f > EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn adjacency(mesh: &Mesh) -> Vec<(Edge, Vec<usize>)> {
        mesh.edges().map(|(e, faces)| (*e, faces.to_vec())).collect()
    }

    #[test]
    fn test_cube_is_closed_manifold() {
        let cube = Mesh::cube(1.0);
        assert_eq!(cube.vertices().len(), 8);
        assert_eq!(cube.triangles().len(), 12);
        // 12 box edges plus one diagonal per side
        assert_eq!(cube.edge_count(), 18);
        assert!(cube.edges().all(|(_, faces)| faces.len() == 2));
        assert!(cube.boundary_edges().is_empty());
        assert_eq!(cube.feature_edges().len(), 12);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube(2.0);
        for (face, triangle) in cube.triangles().iter().enumerate() {
            let outward = triangle.centroid().coords;
            assert!(cube.face_normal(face).dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_plane_has_boundary() {
        let plane = Mesh::plane(2.0);
        assert_eq!(plane.edge_count(), 5);
        assert_eq!(plane.boundary_edges().len(), 4);
        assert_eq!(plane.adjacent_triangles(&Edge::new(2, 0)).len(), 2);
        assert!((plane.face_normal(0) - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_topology_rebuild_is_idempotent() {
        let mut cube = Mesh::cube(1.0);
        let before = adjacency(&cube);
        cube.build_topology_index();
        cube.build_topology_index();
        assert_eq!(adjacency(&cube), before);
    }

    #[test]
    fn test_rejects_partial_triangle() {
        let vertices = vec![Vertex::new(0.0, 0.0, 0.0), Vertex::new(1.0, 0.0, 0.0)];
        let result = Mesh::new("bad", vertices, vec![0, 1]);
        assert!(matches!(result, Err(CoreError::InvalidFaceIndices { len: 2 })));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let vertices = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
        ];
        let result = Mesh::new("bad", vertices, vec![0, 1, 3]);
        assert!(matches!(result, Err(CoreError::VertexOutOfRange { index: 3, .. })));
    }

    #[test]
    fn test_rejects_non_manifold_edge() {
        // Three fins sharing edge (0, 1)
        let vertices = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
            Vertex::new(0.0, -1.0, 0.0),
            Vertex::new(0.0, 0.0, 1.0),
        ];
        let result = Mesh::new("fins", vertices, vec![0, 1, 2, 1, 0, 3, 0, 1, 4]);
        assert!(matches!(
            result,
            Err(CoreError::NonManifoldEdge { a: 0, b: 1, count: 3 })
        ));
    }

    #[test]
    fn test_grab_moves_position_and_vertices() {
        let mut cube = Mesh::cube(1.0);
        let before: Vec<_> = cube.vertices().iter().map(|v| v.position).collect();
        let topology = adjacency(&cube);

        let matrix = Transform::grab(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(0.1, 0.0, 0.0), 10.0);
        cube.apply_transform(ModeKind::Grab, &matrix);

        assert!((cube.position() - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
        for (vertex, old) in cube.vertices().iter().zip(&before) {
            assert!((vertex.position - old - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
        }
        assert_eq!(adjacency(&cube), topology);
    }

    #[test]
    fn test_scale_along_y_only() {
        let mut cube = Mesh::cube(2.0).placed_at(Point3::new(3.0, 0.0, 0.0));
        let before: Vec<_> = cube.vertices().iter().map(|v| v.position).collect();

        cube.apply_transform(ModeKind::Scale, &Transform::scale_matrix(1.0, 2.0, 1.0));

        assert_eq!(cube.scale(), Vector3::new(1.0, 2.0, 1.0));
        for (vertex, old) in cube.vertices().iter().zip(&before) {
            assert!((vertex.position.x - old.x).abs() < 1e-6);
            assert!((vertex.position.z - old.z).abs() < 1e-6);
            assert!((vertex.position.y - old.y * 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scale_is_relative_to_own_pivot() {
        let mut cube = Mesh::cube(2.0).placed_at(Point3::new(5.0, 5.0, 5.0));
        cube.apply_transform(ModeKind::Scale, &Transform::scale_matrix(0.5, 0.5, 0.5));
        assert_eq!(cube.position(), Point3::new(5.0, 5.0, 5.0));
        for vertex in cube.vertices() {
            let offset = vertex.position - cube.position();
            assert!(offset.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6));
        }
    }

    #[test]
    fn test_zero_scale_is_rejected() {
        let mut cube = Mesh::cube(1.0);
        cube.apply_transform(ModeKind::Scale, &Transform::scale_matrix(1.0, 0.0, 1.0));
        assert_eq!(cube.scale(), Vector3::repeat(1.0));
        assert!(cube.triangles().iter().all(|t| !t.is_degenerate()));
    }

    #[test]
    fn test_rotate_about_position() {
        let mut cube = Mesh::cube(2.0).placed_at(Point3::new(0.0, 0.0, -4.0));
        let quarter = Transform::rotate(&Vector3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2);
        cube.apply_transform(ModeKind::Rotate, &quarter);

        assert_eq!(cube.position(), Point3::new(0.0, 0.0, -4.0));
        assert!((cube.transform().euler.z - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        // Corner (1, -1, -3) swings to (1, 1, -3)
        let moved = cube.vertices()[5].position;
        assert!((moved - Point3::new(1.0, 1.0, -3.0)).norm() < 1e-5);
    }

    #[test]
    fn test_unimplemented_modes_are_noops() {
        let mut cube = Mesh::cube(1.0);
        let before = cube.positions_buffer();
        let matrix = Transform::translation_matrix(5.0, 5.0, 5.0);
        for kind in [ModeKind::Extrude, ModeKind::Fill, ModeKind::Merge, ModeKind::None] {
            cube.apply_transform(kind, &matrix);
        }
        assert_eq!(cube.positions_buffer(), before);
        assert_eq!(cube.position(), Point3::origin());
    }

    #[test]
    fn test_vertex_transform_moves_only_handles() {
        let mut plane = Mesh::plane(2.0);
        let lift = Transform::translation_matrix(0.0, 1.0, 0.0);
        plane.apply_transform_to_vertices(ModeKind::Grab, &lift, &[2], &Point3::origin());

        assert!((plane.vertices()[2].position.y - 1.0).abs() < 1e-6);
        assert_eq!(plane.vertices()[0].position.y, 0.0);
        assert_eq!(plane.position(), Point3::origin());
        assert_eq!(plane.edge_count(), 5);
        // The lifted corner bends the surface along the diagonal
        assert_eq!(plane.feature_edges().len(), 5);
    }

    #[test]
    fn test_smooth_shading_uses_vertex_normals() {
        let mut cube = Mesh::cube(1.0);
        assert_eq!(cube.shading(), ShadingMode::Flat);
        assert!((cube.shading_normal(0, 0) - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        cube.toggle_shading();
        let corner = cube.shading_normal(0, 0);
        // Corner normals point diagonally out of the cube
        assert!((corner.norm() - 1.0).abs() < 1e-5);
        assert!(corner.x < 0.0 && corner.y < 0.0 && corner.z > 0.0);
    }

    #[test]
    fn test_find_vertices_by_position() {
        let cube = Mesh::cube(1.0);
        assert_eq!(cube.find_vertices(&Vertex::new(0.5, 0.5, 0.5)), vec![6]);
        assert!(cube.find_vertices(&Vertex::new(0.0, 0.0, 0.0)).is_empty());
    }
}
