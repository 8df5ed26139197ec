//! Metric synthesis
//!
//! Turns a clock reading and a handful of uniform draws into a plausible
//! network snapshot:
//! - `variation` - layered sine cycles plus noise, optionally load shaped
//! - `metrics` - per-field clamping, rounding and AI mode classification
//! - `profile` - constants for each handler draft

pub mod metrics;
pub mod profile;
pub mod variation;

use serde::Serialize;
use thiserror::Error;

pub use metrics::{classify_ai_mode, synthesize, AiMode, MetricsSnapshot};
pub use profile::{ProfileKind, SynthProfile};
pub use variation::Variation;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("clock reading {0}ms precedes the unix epoch")]
    ClockBeforeEpoch(i64),
    #[error("non-finite value while computing {0}")]
    NonFinite(&'static str),
}

/// Older drafts report a label, the latest reports the bit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SecurityLevel {
    Label(&'static str),
    Bits(u32),
}
