//! Command-line front end for the college schema tooling.

pub mod commands;
pub mod config;
pub mod handlers;
