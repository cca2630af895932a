//! Scene objects and the capability interface picking and transforms work through.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Triangle;
use crate::mesh::Mesh;
use crate::mode::ModeKind;

/// Edge length of the pick proxy drawn around a light
const LIGHT_PROXY_SIZE: f32 = 0.25;

/// Handle of an object in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// What picking and the transform engine need from an object
pub trait Transformable {
    fn name(&self) -> &str;

    /// Apply one frame of a transform; modes the object doesn't support are ignored
    fn apply_transformation(&mut self, kind: ModeKind, matrix: &Matrix4<f32>);

    /// Pivot used for distance tests and as the transform centre
    fn position(&self) -> Point3<f32>;

    fn scale(&self) -> Vector3<f32>;

    /// Triangles a pick ray is tested against
    fn bounding_proxy(&self) -> &[Triangle];
}

impl Transformable for Mesh {
    fn name(&self) -> &str {
        Mesh::name(self)
    }

    fn apply_transformation(&mut self, kind: ModeKind, matrix: &Matrix4<f32>) {
        self.apply_transform(kind, matrix);
    }

    fn position(&self) -> Point3<f32> {
        Mesh::position(self)
    }

    fn scale(&self) -> Vector3<f32> {
        Mesh::scale(self)
    }

    fn bounding_proxy(&self) -> &[Triangle] {
        self.triangles()
    }
}

/// A point light. It can be picked and grabbed but not scaled or rotated.
#[derive(Debug, Clone)]
pub struct Light {
    pub intensity: f32,
    proxy: Mesh,
}

impl Light {
    pub fn new(name: impl Into<String>, position: Point3<f32>) -> Self {
        Self {
            intensity: 1.0,
            proxy: Mesh::cube(LIGHT_PROXY_SIZE).with_name(name).placed_at(position),
        }
    }
}

impl Transformable for Light {
    fn name(&self) -> &str {
        self.proxy.name()
    }

    fn apply_transformation(&mut self, kind: ModeKind, matrix: &Matrix4<f32>) {
        if kind == ModeKind::Grab {
            self.proxy.apply_transform(kind, matrix);
        }
    }

    fn position(&self) -> Point3<f32> {
        self.proxy.position()
    }

    fn scale(&self) -> Vector3<f32> {
        Vector3::repeat(1.0)
    }

    fn bounding_proxy(&self) -> &[Triangle] {
        self.proxy.triangles()
    }
}

/// Everything the editor can select
#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh(Mesh),
    Light(Light),
}

impl SceneObject {
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            SceneObject::Mesh(mesh) => Some(mesh),
            SceneObject::Light(_) => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match self {
            SceneObject::Mesh(mesh) => Some(mesh),
            SceneObject::Light(_) => None,
        }
    }

    fn inner(&self) -> &dyn Transformable {
        match self {
            SceneObject::Mesh(mesh) => mesh,
            SceneObject::Light(light) => light,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Transformable {
        match self {
            SceneObject::Mesh(mesh) => mesh,
            SceneObject::Light(light) => light,
        }
    }
}

impl Transformable for SceneObject {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn apply_transformation(&mut self, kind: ModeKind, matrix: &Matrix4<f32>) {
        self.inner_mut().apply_transformation(kind, matrix);
    }

    fn position(&self) -> Point3<f32> {
        self.inner().position()
    }

    fn scale(&self) -> Vector3<f32> {
        self.inner().scale()
    }

    fn bounding_proxy(&self) -> &[Triangle] {
        self.inner().bounding_proxy()
    }
}

impl From<Mesh> for SceneObject {
    fn from(mesh: Mesh) -> Self {
        SceneObject::Mesh(mesh)
    }
}

impl From<Light> for SceneObject {
    fn from(light: Light) -> Self {
        SceneObject::Light(light)
    }
}

/// Ordered collection of scene objects
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        self.objects.push(object.into());
        ObjectId(self.objects.len() - 1)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn mesh(&self, id: ObjectId) -> Option<&Mesh> {
        self.get(id).and_then(SceneObject::as_mesh)
    }

    pub fn mesh_mut(&mut self, id: ObjectId) -> Option<&mut Mesh> {
        self.get_mut(id).and_then(SceneObject::as_mesh_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
