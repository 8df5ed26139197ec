//! Per-draft synthesis constants.
//!
//! The API went through three handler drafts that share one formula and
//! differ in constants, ranges and presentation. Each draft is a
//! [`SynthProfile`]; the synthesizer takes one by reference.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::SecurityLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// First draft: metrics-style payloads, GET only.
    Basic,
    /// Second draft: adds status/network envelope fields.
    Standard,
    /// Latest draft: load shaping, submission endpoint, node identity metadata.
    Extended,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Basic => "basic",
            ProfileKind::Standard => "standard",
            ProfileKind::Extended => "extended",
        }
    }

    pub fn profile(&self) -> &'static SynthProfile {
        match self {
            ProfileKind::Basic => &BASIC,
            ProfileKind::Standard => &STANDARD,
            ProfileKind::Extended => &EXTENDED,
        }
    }
}

impl Default for ProfileKind {
    fn default() -> Self {
        ProfileKind::Extended
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sinusoidal term of the variation signal.
#[derive(Debug, Clone, Copy)]
pub struct Cycle {
    pub period_secs: f64,
    pub amplitude: f64,
}

/// `clamp(base + variation * sensitivity, min, max)`, rounded to `decimals`.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub base: f64,
    pub sensitivity: f64,
    pub min: f64,
    pub max: f64,
    pub decimals: u32,
}

impl FieldSpec {
    const fn new(base: f64, sensitivity: f64, min: f64, max: f64, decimals: u32) -> Self {
        Self { base, sensitivity, min, max, decimals }
    }

    pub fn clamped(&self, variation: f64) -> f64 {
        (self.base + variation * self.sensitivity).clamp(self.min, self.max)
    }

    /// Clamp, then floor.
    pub fn integer(&self, variation: f64) -> u64 {
        self.clamped(variation).floor() as u64
    }

    pub fn rounded(&self, variation: f64) -> f64 {
        round_to(self.clamped(variation), self.decimals)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Rounds half away from zero at `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    pub tps: FieldSpec,
    pub block_time_ms: FieldSpec,
    pub finality_time_ms: FieldSpec,
    pub health_percentage: FieldSpec,
    /// `base + (u - 0.5) * sensitivity`; driven by noise, not variation.
    pub uptime_percentage: FieldSpec,
    pub validator_count: FieldSpec,
    pub ai_confidence: FieldSpec,
    pub network_load: FieldSpec,
    pub average_gas_price: FieldSpec,
    pub total_transactions: FieldSpec,
    pub mempool_size: FieldSpec,
    pub peer_count: FieldSpec,
}

#[derive(Debug)]
pub struct SynthProfile {
    pub kind: ProfileKind,
    pub api_version: &'static str,
    pub network_name: &'static str,
    pub chain_id: &'static str,
    pub cycles: [Cycle; 3],
    pub noise_amplitude: f64,
    /// Scale variation by business-hours / weekend load.
    pub load_shaping: bool,
    pub fields: FieldTable,
    pub quantum_security_level: SecurityLevel,
    pub security_audit_score: f64,
    pub genesis_height: u64,
    /// Milliseconds per synthetic block when deriving the chain height.
    pub block_interval_ms: u64,
    /// Accept `POST /api/transactions`.
    pub accepts_submissions: bool,
    /// Envelope carries `status` and `network`.
    pub envelope_status: bool,
    /// Metadata carries node identity and rate-limit fields.
    pub extended_metadata: bool,
    /// CSP, XSS-protection and referrer-policy headers.
    pub extended_headers: bool,
    pub rate_limit_per_minute: u64,
}

pub const CONSENSUS_ALGORITHM: &str = "TriUnity-PoS-AI";

const CYCLES: [Cycle; 3] = [
    Cycle { period_secs: 180.0, amplitude: 0.15 },
    Cycle { period_secs: 420.0, amplitude: 0.08 },
    Cycle { period_secs: 45.0, amplitude: 0.05 },
];

pub static BASIC: SynthProfile = SynthProfile {
    kind: ProfileKind::Basic,
    api_version: "2.2.0",
    network_name: "TriUnity Mainnet",
    chain_id: "triunity-1",
    cycles: CYCLES,
    noise_amplitude: 0.10,
    load_shaping: false,
    fields: FieldTable {
        tps: FieldSpec::new(108_000.0, 25_000.0, 75_000.0, 150_000.0, 0),
        block_time_ms: FieldSpec::new(85.0, 20.0, 70.0, 120.0, 0),
        finality_time_ms: FieldSpec::new(165.0, 30.0, 120.0, 240.0, 0),
        health_percentage: FieldSpec::new(99.97, 0.15, 99.80, 99.99, 2),
        uptime_percentage: FieldSpec::new(99.987, 0.01, 99.980, 99.999, 3),
        validator_count: FieldSpec::new(247.0, 60.0, 200.0, 320.0, 0),
        ai_confidence: FieldSpec::new(92.5, 6.0, 85.0, 99.9, 2),
        network_load: FieldSpec::new(0.68, 0.20, 0.25, 0.95, 3),
        average_gas_price: FieldSpec::new(0.12, 0.08, 0.01, 0.50, 4),
        total_transactions: FieldSpec::new(8_472_000.0, 2_000_000.0, 7_000_000.0, 10_000_000.0, 0),
        mempool_size: FieldSpec::new(4_200.0, 6_000.0, 500.0, 15_000.0, 0),
        peer_count: FieldSpec::new(312.0, 80.0, 150.0, 500.0, 0),
    },
    quantum_security_level: SecurityLevel::Label("256-bit"),
    security_audit_score: 98.7,
    genesis_height: 19_847_392,
    block_interval_ms: 85,
    accepts_submissions: false,
    envelope_status: false,
    extended_metadata: false,
    extended_headers: false,
    rate_limit_per_minute: 600,
};

pub static STANDARD: SynthProfile = SynthProfile {
    kind: ProfileKind::Standard,
    api_version: "2.3.0",
    network_name: "TriUnity Mainnet",
    chain_id: "triunity-1",
    cycles: CYCLES,
    noise_amplitude: 0.10,
    load_shaping: false,
    fields: FieldTable {
        tps: FieldSpec::new(112_000.0, 25_000.0, 80_000.0, 150_000.0, 0),
        block_time_ms: FieldSpec::new(82.0, 18.0, 70.0, 120.0, 0),
        finality_time_ms: FieldSpec::new(160.0, 30.0, 120.0, 240.0, 0),
        health_percentage: FieldSpec::new(99.97, 0.15, 99.80, 99.99, 2),
        uptime_percentage: FieldSpec::new(99.987, 0.01, 99.980, 99.999, 3),
        validator_count: FieldSpec::new(256.0, 60.0, 200.0, 340.0, 0),
        ai_confidence: FieldSpec::new(93.0, 6.0, 85.0, 99.9, 2),
        network_load: FieldSpec::new(0.66, 0.20, 0.25, 0.95, 3),
        average_gas_price: FieldSpec::new(0.11, 0.08, 0.01, 0.50, 4),
        total_transactions: FieldSpec::new(9_120_000.0, 2_000_000.0, 7_000_000.0, 12_000_000.0, 0),
        mempool_size: FieldSpec::new(4_000.0, 6_000.0, 500.0, 15_000.0, 0),
        peer_count: FieldSpec::new(320.0, 80.0, 150.0, 500.0, 0),
    },
    quantum_security_level: SecurityLevel::Label("256-bit"),
    security_audit_score: 98.7,
    genesis_height: 19_847_392,
    block_interval_ms: 85,
    accepts_submissions: false,
    envelope_status: true,
    extended_metadata: false,
    extended_headers: false,
    rate_limit_per_minute: 600,
};

pub static EXTENDED: SynthProfile = SynthProfile {
    kind: ProfileKind::Extended,
    api_version: "3.0.0",
    network_name: "TriUnity Mainnet",
    chain_id: "triunity-1",
    cycles: CYCLES,
    noise_amplitude: 0.10,
    load_shaping: true,
    fields: FieldTable {
        tps: FieldSpec::new(115_000.0, 28_000.0, 80_000.0, 160_000.0, 0),
        block_time_ms: FieldSpec::new(80.0, 18.0, 70.0, 120.0, 0),
        finality_time_ms: FieldSpec::new(155.0, 30.0, 110.0, 240.0, 0),
        health_percentage: FieldSpec::new(99.97, 0.15, 99.80, 99.99, 2),
        uptime_percentage: FieldSpec::new(99.988, 0.01, 99.980, 99.999, 3),
        validator_count: FieldSpec::new(263.0, 64.0, 200.0, 360.0, 0),
        ai_confidence: FieldSpec::new(93.5, 6.0, 85.0, 99.9, 2),
        network_load: FieldSpec::new(0.64, 0.22, 0.25, 0.95, 3),
        average_gas_price: FieldSpec::new(0.10, 0.08, 0.01, 0.50, 4),
        total_transactions: FieldSpec::new(9_850_000.0, 2_500_000.0, 7_000_000.0, 13_000_000.0, 0),
        mempool_size: FieldSpec::new(3_800.0, 6_500.0, 500.0, 15_000.0, 0),
        peer_count: FieldSpec::new(334.0, 90.0, 150.0, 520.0, 0),
    },
    quantum_security_level: SecurityLevel::Bits(256),
    security_audit_score: 98.7,
    genesis_height: 19_847_392,
    block_interval_ms: 85,
    accepts_submissions: true,
    envelope_status: true,
    extended_metadata: true,
    extended_headers: true,
    rate_limit_per_minute: 1_000,
};
