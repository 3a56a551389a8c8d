pub mod orientation;
pub mod transition;

pub use orientation::*;
pub use transition::*;
