//! HTTP handlers.

pub mod products;
pub use products::*;
