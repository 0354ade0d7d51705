//! YAML boundary for the gyr document forest.
//!
//! This crate is the only place gyr touches concrete YAML syntax. Decoding
//! turns a multi-document stream into a forest of [`gyr_tree::Document`]s,
//! preserving document order and mapping key order; encoding writes the
//! forest back as a stream with a `---` separator line before each document.
//! Everything between those two edges works on the tree model alone.
//!
//! # Modules
//!
//! - [`codec`] — [`YamlCodec`]: decode/encode between streams and forests
//! - [`files`] — Convenience loaders for named input files
//! - [`error`] — [`YamlError`] for parse, emit, and I/O failures

pub mod codec;
pub mod error;
pub mod files;

pub use codec::YamlCodec;
pub use error::{YamlError, YamlResult};
pub use files::{documents_from_file, documents_from_files};
