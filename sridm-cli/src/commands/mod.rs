//! Command handlers -- one module per subcommand

pub mod config;
pub mod feed;
pub mod file;
pub mod report;
