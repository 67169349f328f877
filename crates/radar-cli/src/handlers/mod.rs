pub mod compare;
pub mod config;
pub mod jobs;
pub mod session;
pub mod snapshot;
pub mod watch;
