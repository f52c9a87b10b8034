//! # evostat core
//!
//! Shared types for analysing evolutionary-algorithm experiment logs:
//!
//! - **schema**: the fixed [`Record`](schema::Record) layout, columns, metrics and time axes
//! - **metadata**: decoding the JSON log header and resolving algorithm identities
//! - **context**: the immutable per-log context passed to every component
//! - **style**: colour/marker lookup consumed by renderers
//! - **error**: the error taxonomy shared by all crates
//!
//! ## Quick Start
//!
//! ```rust
//! use evostat_core::prelude::*;
//!
//! let header = LogHeader::from_json(
//!     r#"{"algorithms":[{"algorithm name":"MAP Elite","elitism":"Greedy_selection"}]}"#,
//! ).unwrap();
//! let resolver = MetadataResolver::new(&header);
//! assert_eq!(resolver.resolve(0).unwrap().display_name(), "MAP Elite (G)");
//! ```

pub mod context;
pub mod error;
pub mod metadata;
pub mod schema;
pub mod style;
pub mod prelude;
