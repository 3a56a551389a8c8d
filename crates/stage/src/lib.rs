pub mod label;
pub mod layout;
pub mod marker;
pub mod picking;

pub use label::*;
pub use layout::*;
pub use marker::*;
pub use picking::*;
