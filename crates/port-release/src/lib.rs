//! # port-release
//!
//! Release helpers for publishing a library into a private vcpkg registry.
//!
//! ## Tools
//!
//! - `extract-version` - print the version declared in `vcpkg.json`
//! - `generate-port-files` - write `portfile.cmake` and `vcpkg.json` for a release
//! - `merge-registry` - add the private registry to a vcpkg configuration
//!
//! ## Conventions
//!
//! Paths are fixed and resolved against a root directory (the working
//! directory by default). Diagnostics go to stderr; only the value a tool
//! extracts is printed to stdout. Exit code 0 means success, 1 any failure.

pub mod cli;
pub mod error;
pub mod inputs;
pub mod logging;
pub mod manifest;
pub mod port;
pub mod registry;
pub mod version;

pub use error::{PortError, Result};
pub use inputs::{MergeInputs, PortInputs, RepositoryId};
pub use manifest::{MANIFEST_FILE, Manifest, VERSION_FIELDS};
pub use port::{GeneratedPort, PortGenerator, PortManifest};
pub use registry::{ConfigSource, MergeOutcome, RegistryConfig, RegistryEntry, RegistryMerger};
