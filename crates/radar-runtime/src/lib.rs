pub mod compare;
pub mod config;
pub mod error;
pub mod live;
pub mod store;

pub use compare::{compare_local, load_side};
pub use config::{Config, PollingConfig, resolve_workspace_path};
pub use error::{Error, Result, StoreError, StoreResult};
pub use live::{LiveSession, LiveSessionController, Phase, SessionView, Transition, observe};
pub use store::{FsJobStore, JobStore};
