mod backends;
mod common;
mod filters;
mod gpu;
mod image;
mod kernels;
mod registry;

pub mod prelude;

pub use prelude::*;
