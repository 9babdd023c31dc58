#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod models;
pub mod query;
pub mod sqlite;
pub mod telemetry;

pub use cli::app::{Cli, Command};
pub use query::{FilterSet, QueryEngine, QueryError};
