//! Request and Response models for the app wrapper API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! query parsing and JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ManifestQuery, UrlQuery, UserManifestData};
pub use responses::{HealthResponse, Manifest, ManifestIcon, StoredImageResponse};
