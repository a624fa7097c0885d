//! Cache implementations for derived grid values.

mod projection_cache;

pub use projection_cache::{ProjectionCache, ProjectionKey};
