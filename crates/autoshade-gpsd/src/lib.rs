//! gpsd client for autoshade - streams position reports from a local gpsd
//!
//! Connect once at startup, then hand the report stream to the glare loop:
//! ```ignore
//! let client = rt.block_on(GpsdClient::connect("localhost", DEFAULT_PORT))?;
//! let mut reports = client.spawn_reports(rt.handle());
//! while let Some(tpv) = reports.try_next() { /* ... */ }
//! ```

pub mod client;
pub mod protocol;

pub use client::{GpsdClient, GpsdError, ReportStream};
pub use protocol::*;

/// Default gpsd host
pub const DEFAULT_HOST: &str = "localhost";

/// Default gpsd port
pub const DEFAULT_PORT: u16 = 2947;

/// Command enabling the JSON watcher stream
pub const WATCH_ENABLE: &str = "?WATCH={\"enable\":true,\"json\":true};\n";

/// Command disabling the watcher stream
pub const WATCH_DISABLE: &str = "?WATCH={\"enable\":false};\n";
