//! Configuration for the dgen D binding generator.
//!
//! This crate provides:
//! - The configuration format (`dgen.toml`)
//! - Input-root filtering of declaration locations
//!
//! # Example
//!
//! ```toml
//! # dgen.toml
//! [input]
//! paths = ["include"]
//! standard = "c++17"
//!
//! [output]
//! path = "source/bindings.d"
//! extras = ["attr-nogc"]
//! ```

mod config;
mod error;
mod filter;

pub use config::{GenConfig, InputOptions, ManglingScheme, OutputOptions, KNOWN_EXTRAS};
pub use error::{ConfigError, Result};
pub use filter::PathFilter;
