//! Type definitions for inplace configuration

mod runtime_config;

pub use runtime_config::*;
