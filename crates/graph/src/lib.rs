pub mod loader;
pub mod records;
pub mod scene;

pub use loader::*;
pub use records::*;
pub use scene::*;
