use super::angle::Orientation;
use super::vec::Vec3;

/// Unit quaternion for camera and controller orientations.
///
/// Conventions (matching the rendering collaborator):
/// - Right-handed, Y-up; the camera looks along local -Z.
/// - Yaw about +Y, pitch about +X, roll about +Z, composed Y * X * Z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let half = angle * 0.5;
        let s = half.sin();
        Self::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    pub fn from_orientation(o: Orientation) -> Self {
        let yaw = Self::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), o.yaw);
        let pitch = Self::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), o.pitch);
        let roll = Self::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), o.roll);
        yaw.mul(pitch).mul(roll)
    }

    /// Hamilton product; `a.mul(b)` applies `b` first, then `a`.
    pub fn mul(self, b: Self) -> Self {
        let a = self;
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Inverse, assuming unit length (all quaternions here are rotations).
    pub fn inverse(self) -> Self {
        self.conjugate()
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn normalized(self) -> Self {
        let n = self.dot(self).sqrt();
        if n <= 0.0 {
            return Self::IDENTITY;
        }
        let inv = 1.0 / n;
        Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        // q v q^-1 via the expanded cross-product form.
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v).scale(2.0);
        v + t.scale(self.w) + u.cross(t)
    }

    /// The direction the camera looks when carrying this orientation.
    pub fn forward(self) -> Vec3 {
        self.rotate(Vec3::new(0.0, 0.0, -1.0))
    }
}
