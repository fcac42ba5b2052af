//! Core types and utilities shared by the glare engine and its host

pub mod types;
pub mod error;
pub mod logging;
pub mod time;

pub use types::*;
pub use error::Error;
