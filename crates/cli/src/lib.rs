//! Library side of the `policy-tool` binary: configuration, loading, the
//! JSON Command API and the line-oriented session driver.

pub mod command;
pub mod config;
pub mod data;
pub mod session;

pub use command::{CommandHandler, CommandRequest, CommandResponse};
pub use config::{ConfigOverrides, ResolvedConfig};
pub use data::{load_engine, LoadedEngine};
