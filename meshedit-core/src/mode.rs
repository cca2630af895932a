//! Interaction modes: what the pointer currently does, grouped by category, with an optional axis lock

use std::fmt;

use nalgebra::Vector3;

/// Specific interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModeKind {
    #[default]
    None,
    Object,
    Edit,
    Grab,
    Scale,
    Rotate,
    Extrude,
    Fill,
    Merge,
}

/// Coarse grouping of modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    None,
    View,
    Transform,
    MeshData,
}

/// Axis constraint for transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    #[default]
    None,
    X,
    Y,
    Z,
}

impl ModeKind {
    pub fn category(self) -> Category {
        match self {
            ModeKind::None => Category::None,
            ModeKind::Object | ModeKind::Edit => Category::View,
            ModeKind::Grab | ModeKind::Scale | ModeKind::Rotate => Category::Transform,
            ModeKind::Extrude | ModeKind::Fill | ModeKind::Merge => Category::MeshData,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModeKind::None => "NONE",
            ModeKind::Object => "OBJECT",
            ModeKind::Edit => "EDIT",
            ModeKind::Grab => "GRAB",
            ModeKind::Scale => "SCALE",
            ModeKind::Rotate => "ROTATE",
            ModeKind::Extrude => "EXTRUDE",
            ModeKind::Fill => "FILL",
            ModeKind::Merge => "MERGE",
        }
    }
}

impl Axis {
    /// Unit direction the transform is limited to; unconstrained means all three axes
    pub fn direction(self) -> Vector3<f32> {
        match self {
            Axis::None => Vector3::new(1.0, 1.0, 1.0),
            Axis::X => Vector3::new(1.0, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, 1.0, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

/// A mode together with its category and axis constraint.
///
/// Two modes are equal only when kind, category and axis all match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode {
    pub kind: ModeKind,
    pub category: Category,
    pub axis: Axis,
}

impl Mode {
    pub fn new(kind: ModeKind) -> Self {
        Self {
            kind,
            category: kind.category(),
            axis: Axis::None,
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// A transform or mesh-data operation is in progress
    pub fn is_operation(&self) -> bool {
        matches!(self.category, Category::Transform | Category::MeshData)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Axis::None => write!(f, "{}", self.kind.label()),
            Axis::X => write!(f, "{} [X]", self.kind.label()),
            Axis::Y => write!(f, "{} [Y]", self.kind.label()),
            Axis::Z => write!(f, "{} [Z]", self.kind.label()),
        }
    }
}
