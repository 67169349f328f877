//! Testing utilities for radar.
//!
//! - [`TestWorld`]: a temporary workspace on disk plus a way to run the CLI against it
//! - [`ScriptedStore`]: an in-memory job store that replays scripted responses and
//!   records every call
//! - [`fixtures`]: builders for jobs, session entries, raw session log lines and items
//! - [`assertions`]: checks over the CLI's JSON output

pub mod assertions;
pub mod fixtures;
pub mod store;
pub mod world;

pub use store::{ScriptedStore, StoreCall};
pub use world::{CliResult, TestWorld};
