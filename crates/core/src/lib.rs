//! dwarf-glue-core
//!
//! Reads a `readelf --debug-dump=info` dump of a compiled kernel, reconstructs
//! the C signature of each exported function, and generates the Lua call glue
//! that exposes those functions to the embedded interpreter.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends; the CLI is a thin wrapper.

pub mod config;
pub mod diagnostics;
pub mod dump;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
