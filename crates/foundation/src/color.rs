/// HSLA color. Hue in degrees [0, 360), saturation/lightness/alpha in [0, 1].
///
/// Hosts consume HSLA directly (it maps onto CSS gradient stops); conversion
/// to other color spaces is their concern.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hsla {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Hsla {
    pub fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }
}
