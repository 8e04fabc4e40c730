#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod model;
pub mod quiz;
pub mod time;

pub use error::Error;
pub use generator::{generate, generate_with};
pub use quiz::{Command, SessionState, apply, apply_with};
pub use time::Clock;
