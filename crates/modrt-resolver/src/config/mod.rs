//! Resolver configuration
//!
//! Values are layered from lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. A JSON config file
//! 3. Environment variables (`MODRT_*`)
//!
//! # Example
//!
//! ```rust,no_run
//! use modrt_resolver::config::ResolverConfig;
//! use std::path::Path;
//!
//! let config = ResolverConfig::build(Some(Path::new("/etc/modrt/resolver.json")), true).unwrap();
//! println!("Provider policy: {}", config.provider_policy.as_str());
//! ```

mod config;
mod source;

pub use config::ResolverConfig;
pub use source::{ConfigLoader, ConfigSource, RawConfig};
