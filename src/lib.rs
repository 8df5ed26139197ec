//! Simulated TriUnity network telemetry API.
//!
//! Every payload is synthesized per request from the wall clock and random
//! draws; nothing is stored between requests.

pub mod api;
pub mod clock;
pub mod config;
pub mod entropy;
pub mod generators;
pub mod prom;
pub mod telemetry;
pub mod version;

pub use api::{router, AppState};
pub use config::ServerConfig;
