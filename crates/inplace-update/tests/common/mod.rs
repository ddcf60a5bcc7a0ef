//! Common test infrastructure for inplace-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Versions, asset names, binary content
//! - `builders`: Fluent builders for releases and their JSON form
//! - `fake_source`: In-memory `ReleaseSource` that records downloads
//! - `mock_server`: Wiremock setup for the GitHub releases API
//! - `updater_helpers`: Fake executables, hashing, and failing streams

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fake_source;
pub mod mock_server;
pub mod updater_helpers;

pub use builders::*;
pub use constants::*;
pub use fake_source::*;
pub use mock_server::*;
pub use updater_helpers::*;
