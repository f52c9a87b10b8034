//! CLI command implementations.

pub mod init;
pub mod analyze;
pub mod header;
