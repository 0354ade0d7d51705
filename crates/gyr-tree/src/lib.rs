//! Document tree model for gyr.
//!
//! This crate provides the format-agnostic tree that the resolution engine
//! operates on. A parsed input stream becomes a forest of [`Document`]s;
//! each document is a tree of [`Node`]s. Codec crates build these trees from
//! concrete formats (YAML today) and serialize them back out; the engine
//! only ever sees this model.
//!
//! # Architecture
//!
//! - **Nodes** are scalars, sequences, or mappings. Mapping entries keep
//!   their document order, and mapping keys are full nodes, so a reference
//!   used as a key is as visible to traversal as one used as a value.
//! - **Paths** ([`NodePath`]) are stable addresses into a forest: a document
//!   index plus the steps from that document's root. Traversal hands out
//!   paths; mutation dereferences them later, after all I/O has finished.
//! - **Traversal** ([`for_each_string`]) visits every string scalar in a
//!   deterministic depth-first order.
//!
//! # Modules
//!
//! - [`node`] — Core tree types: [`Node`], [`Scalar`], [`Document`]
//! - [`path`] — [`NodePath`] addressing and forest navigation
//! - [`walk`] — Deterministic traversal over a forest

pub mod node;
pub mod path;
pub mod walk;

pub use node::{Document, Node, Scalar};
pub use path::{node_at, node_at_mut, NodePath, Step};
pub use walk::for_each_string;
