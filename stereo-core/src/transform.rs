/// Euler rotation state for the camera and for scene geometry
use nalgebra::{UnitQuaternion, Vector3};

/// Degree step used when snap-to-grid is enabled for direct angle input
pub const SNAP_DEGREES: f64 = 5.0;

/// Coordinate axis selector for per-axis edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit vector along this axis
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    pub fn component(self, v: &Vector3<f64>) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    pub fn set_component(self, v: &mut Vector3<f64>, value: f64) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }

    /// Parse a lowercase or uppercase axis letter
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }
}

/// Rotation around three axes (in radians), composed in X, Y, Z order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EulerAngles {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_degrees(x: f64, y: f64, z: f64) -> Self {
        Self::new(x.to_radians(), y.to_radians(), z.to_radians())
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set(&mut self, axis: Axis, radians: f64) {
        match axis {
            Axis::X => self.x = radians,
            Axis::Y => self.y = radians,
            Axis::Z => self.z = radians,
        }
    }

    /// Composed rotation `Rx * Ry * Rz`
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.x);
        let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.y);
        let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.z);

        rx * ry * rz
    }
}

/// Orientation of the virtual camera.
///
/// The camera looks along +Y with +Z up, so `pitch` turns about X, `roll`
/// about the viewing axis Y and `yaw` about the up axis Z. World points are
/// brought into camera space with the inverse of [`CameraOrientation::rotation`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraOrientation {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

impl CameraOrientation {
    pub fn new(pitch: f64, roll: f64, yaw: f64) -> Self {
        Self { pitch, roll, yaw }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn angles(&self) -> EulerAngles {
        EulerAngles::new(self.pitch, self.roll, self.yaw)
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.angles().quaternion()
    }

    pub fn inverse_rotation(&self) -> UnitQuaternion<f64> {
        self.rotation().inverse()
    }

    /// Apply a pointer drag of `(dx, dy)` screen pixels
    pub fn drag(&mut self, dx: f64, dy: f64, sensitivity: f64) {
        self.yaw -= dx * sensitivity;
        self.pitch -= dy * sensitivity;
    }

    /// Angle about `axis` in whole degrees, as shown by angle inputs
    pub fn axis_degrees(&self, axis: Axis) -> f64 {
        self.angles().get(axis).to_degrees()
    }

    /// Set the angle about `axis` from a degree input clamped to [-180, 180]
    pub fn set_axis_degrees(&mut self, axis: Axis, degrees: f64, snap: bool) {
        let degrees = if degrees.is_finite() { degrees } else { 0.0 };
        let mut degrees = degrees.clamp(-180.0, 180.0);
        if snap {
            degrees = (degrees / SNAP_DEGREES).round() * SNAP_DEGREES;
        }
        let radians = degrees.to_radians();
        match axis {
            Axis::X => self.pitch = radians,
            Axis::Y => self.roll = radians,
            Axis::Z => self.yaw = radians,
        }
    }
}
