/// Scene geometry: cube primitives and their wireframe layout
use nalgebra::Vector3;
use std::fmt;

use crate::color::Color;
use crate::transform::{Axis, EulerAngles};

/// Smallest edge length a cube may have
pub const MIN_SIZE: f64 = 0.1;

/// Corner pairs forming the twelve cube edges
pub const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// For each local axis, the corners at the negative end of the four edges
/// running along it
pub const GUIDE_ANCHORS: [(Axis, [usize; 4]); 3] = [
    (Axis::X, [0, 3, 4, 7]),
    (Axis::Y, [0, 1, 2, 3]),
    (Axis::Z, [0, 1, 4, 5]),
];

/// Stable identifier of a scene item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u32);

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A box primitive placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct CubeGeometry {
    pub id: GeometryId,
    pub name: String,
    pub center: Vector3<f64>,
    pub size: Vector3<f64>,
    pub rotation: EulerAngles,
    pub color: Color,
    pub visible: bool,
    pub show_edge_guides: bool,
    pub show_full_guide: bool,
}

impl CubeGeometry {
    /// A 2×2×2 cube at the origin with edge guides enabled
    pub fn new(id: GeometryId, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            center: Vector3::zeros(),
            size: Vector3::new(2.0, 2.0, 2.0),
            rotation: EulerAngles::zero(),
            color,
            visible: true,
            show_edge_guides: true,
            show_full_guide: false,
        }
    }

    /// World-space corners, indexed as in [`CUBE_EDGES`]
    pub fn corners(&self) -> [Vector3<f64>; 8] {
        let q = self.rotation.quaternion();
        let h = self.size * 0.5;
        let local = [
            Vector3::new(-h.x, -h.y, -h.z),
            Vector3::new(h.x, -h.y, -h.z),
            Vector3::new(h.x, -h.y, h.z),
            Vector3::new(-h.x, -h.y, h.z),
            Vector3::new(-h.x, h.y, -h.z),
            Vector3::new(h.x, h.y, -h.z),
            Vector3::new(h.x, h.y, h.z),
            Vector3::new(-h.x, h.y, h.z),
        ];
        local.map(|v| q * v + self.center)
    }

    /// Unit direction of a local axis in world space
    pub fn local_axis(&self, axis: Axis) -> Vector3<f64> {
        (self.rotation.quaternion() * axis.unit()).normalize()
    }
}

/// Closed set of scene item kinds
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryItem {
    Cube(CubeGeometry),
}

impl GeometryItem {
    pub fn id(&self) -> GeometryId {
        match self {
            GeometryItem::Cube(cube) => cube.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GeometryItem::Cube(cube) => &cube.name,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            GeometryItem::Cube(cube) => cube.visible,
        }
    }

    pub fn as_cube(&self) -> Option<&CubeGeometry> {
        match self {
            GeometryItem::Cube(cube) => Some(cube),
        }
    }
}
