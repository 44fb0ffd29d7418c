//! CLI command implementations.
//!
//! - **analyze**: score a suite and report on it
//! - **init**: write a default configuration file

pub mod analyze;
pub mod init;

pub use analyze::{analyze_paths, handle_analyze, AnalyzeConfig};
pub use init::init_config;
