//! `chatwire` command-line tool library.
//!
//! Exposes configuration loading and the subcommands for use in tests.
//! Every subcommand drives the generic codecs from `chatwire-proto`
//! through the schema registry.

pub mod commands;
pub mod config;
