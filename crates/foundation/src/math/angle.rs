use std::f64::consts::PI;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Camera orientation as yaw/pitch/roll, in radians.
///
/// Backend records carry these in degrees; conversion happens once at the
/// loader boundary so everything downstream is radians-only.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orientation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    pub const LEVEL: Self = Self {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_degrees(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::new(deg_to_rad(yaw), deg_to_rad(pitch), deg_to_rad(roll))
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::{Orientation, deg_to_rad};
    use std::f64::consts::PI;

    #[test]
    fn degrees_convert_to_radians() {
        assert!((deg_to_rad(90.0) - PI / 2.0).abs() < 1e-12);
        assert!((deg_to_rad(-180.0) + PI).abs() < 1e-12);
    }

    #[test]
    fn from_degrees_converts_all_components() {
        let o = Orientation::from_degrees(90.0, -45.0, 180.0);
        assert!((o.yaw - PI / 2.0).abs() < 1e-12);
        assert!((o.pitch + PI / 4.0).abs() < 1e-12);
        assert!((o.roll - PI).abs() < 1e-12);
    }
}
