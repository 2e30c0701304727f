//! Cache module for holding decoded API responses in memory
//!
//! This module provides a cache keyed by logical resource name (for example
//! `"services"`) with a fixed TTL. Stale entries read as absent and are
//! overwritten by the next successful fetch; write operations drop the entry
//! for the resource they touched.

mod manager;

pub use manager::{CachedData, ResponseCache};
