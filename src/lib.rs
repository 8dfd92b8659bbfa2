pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod ranking;
pub mod ratings;
pub mod roster;
pub mod session;
pub mod tui;

pub use error::{RaterError, Result, ValidationError};
pub use session::Session;
