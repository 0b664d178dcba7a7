//! Source descriptor handling
//!
//! A source descriptor names where a package's source lives: a git URL plus
//! an optional commit, branch or tag. Descriptors come either from the
//! package-specification model (deserialized from YAML/JSON) or from the CLI.
//!
//! ## Module Organization
//!
//! - `reference.rs`: `GitReference` enum (HEAD, commit, branch, tag)
//! - `descriptor.rs`: `SourceDescriptor` struct, validation and serde shape

pub mod descriptor;
pub mod reference;

pub use descriptor::SourceDescriptor;
pub use reference::GitReference;
