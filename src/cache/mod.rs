//! Cache Module
//!
//! Bounded, self-expiring in-memory stores for computed payloads and proxied images.

mod entry;
mod image_store;
mod store;


// Re-export public types
pub use image_store::ImageStore;
pub use store::BoundedStore;

// == Public Constants ==
/// Size of the space image keys are drawn from
pub const IMAGE_KEY_SPACE: u32 = 1_000_000;

/// Upper bound on key draws before `ImageStore::add` gives up
pub const MAX_KEY_ATTEMPTS: usize = 64;
