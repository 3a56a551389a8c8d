pub mod engine;
pub mod hosts;

pub use engine::*;
pub use hosts::*;
