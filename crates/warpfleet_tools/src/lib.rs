//! # Warpfleet Tools
//!
//! Command-line tooling over the movement core:
//! - Scenario runner with per-turn summaries
//! - Route and projection inspection
//! - Scenario validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod runner;
pub mod validate;

pub use error::{ToolError, ToolResult};
