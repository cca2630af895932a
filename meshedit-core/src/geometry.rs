/// Geometry primitives for the mesh data model
use nalgebra::{Point3, Vector3};

use crate::math::{self, EPSILON};

/// A mesh vertex. Identity inside a mesh is its index; across meshes it is its position.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    /// Averaged normal, recomputed by the owning mesh
    pub normal: Vector3<f32>,
    pub uv: Option<[f32; 2]>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self::at(Point3::new(x, y, z))
    }

    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            uv: None,
        }
    }

    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.uv = Some([u, v]);
        self
    }

    /// Epsilon-tolerant positional equality
    pub fn same_position(&self, other: &Vertex) -> bool {
        math::same_position(&self.position, &other.position)
    }
}

/// An undirected edge between two vertex handles, smaller handle first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    a: u32,
    b: u32,
}

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn vertices(&self) -> (u32, u32) {
        (self.a, self.b)
    }
}

/// Which normal a renderer should light a face with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    #[default]
    Flat,
    Smooth,
}

impl ShadingMode {
    pub fn toggled(self) -> Self {
        match self {
            ShadingMode::Flat => ShadingMode::Smooth,
            ShadingMode::Smooth => ShadingMode::Flat,
        }
    }
}

/// A triangle face: three vertex handles plus cached corner positions, normal and centroid
#[derive(Debug, Clone)]
pub struct Triangle {
    indices: [u32; 3],
    corners: [Point3<f32>; 3],
    cross: Vector3<f32>,
    centroid: Point3<f32>,
}

impl Triangle {
    pub fn new(indices: [u32; 3], corners: [Point3<f32>; 3]) -> Self {
        let mut triangle = Self {
            indices,
            corners,
            cross: Vector3::zeros(),
            centroid: Point3::origin(),
        };
        triangle.refresh(corners);
        triangle
    }

    /// Build a free-standing triangle from positions alone
    pub fn from_points(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self::new([0, 1, 2], [v0, v1, v2])
    }

    /// Recompute the cached values after the corners moved
    pub(crate) fn refresh(&mut self, corners: [Point3<f32>; 3]) {
        let [v0, v1, v2] = corners;
        self.corners = corners;
        self.cross = (v1 - v0).cross(&(v2 - v0));
        self.centroid = Point3::from((v0.coords + v1.coords + v2.coords) / 3.0);
    }

    pub fn indices(&self) -> [u32; 3] {
        self.indices
    }

    pub fn corners(&self) -> &[Point3<f32>; 3] {
        &self.corners
    }

    /// The three edges of this face in winding order
    pub fn edges(&self) -> [Edge; 3] {
        let [i0, i1, i2] = self.indices;
        [Edge::new(i0, i1), Edge::new(i1, i2), Edge::new(i2, i0)]
    }

    pub fn centroid(&self) -> Point3<f32> {
        self.centroid
    }

    pub fn area(&self) -> f32 {
        self.cross.norm() * 0.5
    }

    pub fn is_degenerate(&self) -> bool {
        self.cross.norm() < EPSILON
    }

    /// Unit face normal; the zero vector for a degenerate triangle
    pub fn normal(&self) -> Vector3<f32> {
        self.cross.try_normalize(EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Whether the face points towards `viewpoint`
    pub fn faces_towards(&self, viewpoint: &Point3<f32>) -> bool {
        self.normal().dot(&(viewpoint - self.centroid)) > 0.0
    }
}
