//! Command line interface

pub mod commands;
pub mod deployer;
pub mod display;

pub use commands::{CliArgs, Commands};
