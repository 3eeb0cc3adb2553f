// src/config/mod.rs
pub mod feeds;
pub mod settings;

pub use feeds::{default_feeds, load_feeds_default, load_feeds_from};
pub use settings::{CacheBackend, DigestSettings};
