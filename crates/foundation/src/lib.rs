//! Small shared primitives: colors, math, time. No dependencies.

pub mod color;
pub mod math;
pub mod time;

pub use color::*;
pub use time::*;
