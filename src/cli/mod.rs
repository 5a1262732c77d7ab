//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command};
pub use commands::{
    build_recorder, handle_config_action, run_delete, run_export, run_import, run_list,
    run_record, run_replay,
};
