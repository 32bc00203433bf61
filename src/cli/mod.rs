//! CLI command handlers
//!
//! This module contains all the command handlers for the cofilter CLI.
//! Each subcommand is implemented in its own module.

pub mod evaluate;
pub mod helpers;
pub mod import;
pub mod predict;
pub mod stats;
