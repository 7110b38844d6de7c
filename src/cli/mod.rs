//! Command-line interface: argument parsing, command handlers and the
//! interactive control language.

pub mod args;
pub mod commands;
pub mod control;
pub mod display;
