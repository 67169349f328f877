pub mod availability;
pub mod domain;
pub mod error;

pub use availability::Availability;
pub use domain::*;
pub use error::{Error, Result};
