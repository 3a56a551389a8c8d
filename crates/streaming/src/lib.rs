pub mod cache;
pub mod preload;
pub mod texture;

pub use cache::*;
pub use preload::*;
pub use texture::*;
