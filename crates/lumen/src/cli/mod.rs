//! Command-line interface: flattened caption flags plus the `config` subcommand.

pub mod caption;
pub mod config;
