//! Site Module
//!
//! Fetches remote pages behind an SSRF guard and scans them for a title and
//! a representative icon.

pub mod guard;
mod fetcher;
mod icon;
mod scanner;

pub use fetcher::{FetchConfig, SafeFetcher};
pub use icon::{IconCandidate, SizeClass};
pub use scanner::{PageMetadata, PageScanner};
