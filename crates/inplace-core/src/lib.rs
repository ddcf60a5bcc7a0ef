//! # inplace-core
//!
//! Core library for the inplace CLI providing:
//! - Runtime configuration types (network, GitHub, update behaviour)
//! - Hierarchical configuration loading (embedded defaults, file, environment)
//! - The shared configuration error type

pub mod config;
pub mod error;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::RuntimeConfig;
