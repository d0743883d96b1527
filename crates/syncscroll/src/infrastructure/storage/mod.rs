//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform-appropriate directory, writes defaults on first run, and validates
//! the values before the session is built from them.

pub mod config;
