//! Selected objects, selected vertices and the drag anchor

use nalgebra::Point3;

use crate::geometry::Vertex;
use crate::scene::ObjectId;

/// Selection state for both Object and Edit mode
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Selected objects (in order of selection)
    objects: Vec<ObjectId>,
    /// Selected vertices, unique by position
    vertices: Vec<Vertex>,
    /// World position at the previous drag frame; `None` when no drag is running
    anchor: Option<Point3<f32>>,
}

impl Selection {
    /// Primary (first) selected object
    pub fn primary(&self) -> Option<ObjectId> {
        self.objects.first().copied()
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    /// Select a single object (clears previous selection)
    pub fn select(&mut self, id: ObjectId) {
        self.objects.clear();
        self.objects.push(id);
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Membership by position, not identity
    pub fn contains_vertex(&self, vertex: &Vertex) -> bool {
        self.vertices.iter().any(|v| v.same_position(vertex))
    }

    /// Add a vertex unless one at the same position is already selected
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        if self.contains_vertex(&vertex) {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    /// Replace the vertex selection
    pub fn select_vertices(&mut self, vertices: impl IntoIterator<Item = Vertex>) {
        self.vertices.clear();
        for vertex in vertices {
            self.add_vertex(vertex);
        }
    }

    pub fn clear_vertices(&mut self) {
        self.vertices.clear();
    }

    /// Centroid of the selected vertices
    pub fn vertex_centroid(&self) -> Option<Point3<f32>> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Point3::origin().coords, |acc, v| acc + v.position.coords);
        Some(Point3::from(sum / self.vertices.len() as f32))
    }

    pub fn anchor(&self) -> Option<Point3<f32>> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Point3<f32>) {
        self.anchor = Some(anchor);
    }

    pub fn reset_anchor(&mut self) {
        self.anchor = None;
    }

    /// Clear everything
    pub fn clear(&mut self) {
        self.objects.clear();
        self.vertices.clear();
        self.anchor = None;
    }

    pub fn count(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_empty() {
        let s = Selection::default();
        assert!(s.primary().is_none());
        assert!(s.objects().is_empty());
        assert!(s.vertices().is_empty());
        assert!(s.anchor().is_none());
    }

    #[test]
    fn test_select_clears_previous() {
        let mut s = Selection::default();
        s.select(ObjectId(0));
        s.select(ObjectId(1));
        assert_eq!(s.count(), 1);
        assert!(!s.is_selected(ObjectId(0)));
        assert!(s.is_selected(ObjectId(1)));
    }

    #[test]
    fn test_vertices_unique_by_position() {
        let mut s = Selection::default();
        assert!(s.add_vertex(Vertex::new(1.0, 0.0, 0.0)));
        assert!(!s.add_vertex(Vertex::new(1.0, 0.0, 0.0 + 1e-7)));
        assert!(s.add_vertex(Vertex::new(0.0, 1.0, 0.0)));
        assert_eq!(s.vertices().len(), 2);
        assert!(s.contains_vertex(&Vertex::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_vertex_centroid() {
        let mut s = Selection::default();
        assert!(s.vertex_centroid().is_none());
        s.select_vertices([Vertex::new(0.0, 0.0, 0.0), Vertex::new(2.0, 4.0, 0.0)]);
        assert_eq!(s.vertex_centroid(), Some(Point3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_clear_resets_anchor() {
        let mut s = Selection::default();
        s.select(ObjectId(3));
        s.set_anchor(Point3::new(1.0, 1.0, 1.0));
        s.clear();
        assert_eq!(s.count(), 0);
        assert!(s.anchor().is_none());
    }
}
