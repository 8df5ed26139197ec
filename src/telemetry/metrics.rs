use serde::Serialize;

use crate::clock::Reading;
use crate::entropy::RandomSource;

use super::profile::{round_to, SynthProfile, CONSENSUS_ALGORITHM};
use super::{SecurityLevel, SynthError, Variation};

/// Share of validators reported as active.
pub const ACTIVE_VALIDATOR_RATIO: f64 = 0.95;

/// How far back the last block may have landed.
const LAST_BLOCK_WINDOW_MS: f64 = 120_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AiMode {
    Emergency,
    #[serde(rename = "High-Performance")]
    HighPerformance,
    Secure,
    Optimal,
    Balanced,
}

impl AiMode {
    pub const ALL: [AiMode; 5] = [
        AiMode::Emergency,
        AiMode::HighPerformance,
        AiMode::Secure,
        AiMode::Optimal,
        AiMode::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiMode::Emergency => "Emergency",
            AiMode::HighPerformance => "High-Performance",
            AiMode::Secure => "Secure",
            AiMode::Optimal => "Optimal",
            AiMode::Balanced => "Balanced",
        }
    }
}

/// Priority ordered; the first rule that matches wins.
pub fn classify_ai_mode(variation: f64, is_business_hours: bool, load_factor: f64) -> AiMode {
    if variation.abs() > 0.25 {
        AiMode::Emergency
    } else if variation > 0.15 && is_business_hours {
        AiMode::HighPerformance
    } else if variation < -0.15 {
        AiMode::Secure
    } else if is_business_hours && variation > 0.05 && load_factor >= 1.0 {
        AiMode::Optimal
    } else {
        AiMode::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    // performance
    pub tps: u64,
    pub block_time_ms: u64,
    pub finality_time_ms: u64,

    // health
    pub health_percentage: f64,
    pub uptime_percentage: f64,

    // validators
    pub validator_count: u64,
    pub active_validators: u64,

    // consensus
    pub ai_mode: AiMode,
    pub ai_confidence: f64,

    // security
    pub quantum_security_level: SecurityLevel,
    pub security_audit_score: f64,

    // load
    pub network_load: f64,
    pub average_gas_price: f64,
    pub mempool_size: u64,
    pub peer_count: u64,
    pub load_factor: f64,

    // chain
    pub current_block_height: u64,
    pub total_transactions: u64,
    pub last_block_timestamp: u64,
    pub protocol_version: String,
    pub consensus_algorithm: String,
}

/// Height of the synthetic chain at `now_ms`.
pub fn block_height(profile: &SynthProfile, now_ms: i64) -> u64 {
    profile.genesis_height + now_ms.max(0) as u64 / profile.block_interval_ms
}

pub fn active_validators(total: u64) -> u64 {
    (total as f64 * ACTIVE_VALIDATOR_RATIO).floor() as u64
}

/// Builds a snapshot from a fresh variation sample.
pub fn synthesize<R: RandomSource + ?Sized>(
    reading: &Reading,
    rng: &mut R,
    profile: &SynthProfile,
) -> Result<MetricsSnapshot, SynthError> {
    let variation = Variation::sample(reading, rng, profile)?;
    Ok(snapshot_from(reading, &variation, rng, profile))
}

/// Deterministic apart from the two noise draws for uptime and last block age.
pub fn snapshot_from<R: RandomSource + ?Sized>(
    reading: &Reading,
    variation: &Variation,
    rng: &mut R,
    profile: &SynthProfile,
) -> MetricsSnapshot {
    let f = &profile.fields;
    let v = variation.value;

    let validator_count = f.validator_count.integer(v);
    let uptime = f.uptime_percentage.rounded(rng.uniform() - 0.5);
    let now_ms = reading.now_ms.max(0) as f64;
    let last_block_timestamp = (now_ms - rng.uniform() * LAST_BLOCK_WINDOW_MS).max(0.0).floor() as u64;

    MetricsSnapshot {
        tps: f.tps.integer(v),
        block_time_ms: f.block_time_ms.integer(v),
        finality_time_ms: f.finality_time_ms.integer(v),
        health_percentage: f.health_percentage.rounded(v),
        uptime_percentage: uptime,
        validator_count,
        active_validators: active_validators(validator_count),
        ai_mode: classify_ai_mode(v, variation.is_business_hours, variation.load_factor),
        ai_confidence: f.ai_confidence.rounded(v),
        quantum_security_level: profile.quantum_security_level,
        security_audit_score: profile.security_audit_score,
        network_load: f.network_load.rounded(v),
        average_gas_price: f.average_gas_price.rounded(v),
        mempool_size: f.mempool_size.integer(v),
        peer_count: f.peer_count.integer(v),
        load_factor: round_to(variation.load_factor, 2),
        current_block_height: block_height(profile, reading.now_ms),
        total_transactions: f.total_transactions.integer(v),
        last_block_timestamp,
        protocol_version: profile.api_version.to_string(),
        consensus_algorithm: CONSENSUS_ALGORITHM.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::profile::{ProfileKind, BASIC, EXTENDED};
    use chrono::{TimeZone, Utc};
    use rand::rngs::mock::StepRng;
    use rand::{rngs::StdRng, SeedableRng};

    fn assert_in_range(profile: &SynthProfile, m: &MetricsSnapshot) {
        let f = &profile.fields;
        let checks = [
            ("tps", f.tps, m.tps as f64),
            ("block_time_ms", f.block_time_ms, m.block_time_ms as f64),
            ("finality_time_ms", f.finality_time_ms, m.finality_time_ms as f64),
            ("health_percentage", f.health_percentage, m.health_percentage),
            ("uptime_percentage", f.uptime_percentage, m.uptime_percentage),
            ("validator_count", f.validator_count, m.validator_count as f64),
            ("ai_confidence", f.ai_confidence, m.ai_confidence),
            ("network_load", f.network_load, m.network_load),
            ("average_gas_price", f.average_gas_price, m.average_gas_price),
            ("total_transactions", f.total_transactions, m.total_transactions as f64),
            ("mempool_size", f.mempool_size, m.mempool_size as f64),
            ("peer_count", f.peer_count, m.peer_count as f64),
        ];
        for (name, spec, value) in checks {
            assert!(spec.contains(value), "{name}={value} outside [{}, {}]", spec.min, spec.max);
        }
        assert_eq!(m.active_validators, active_validators(m.validator_count));
        assert!(m.load_factor >= 0.5 && m.load_factor <= 1.5);
    }

    #[test]
    fn fields_stay_in_range_across_clocks_and_seeds() {
        for kind in [ProfileKind::Basic, ProfileKind::Standard, ProfileKind::Extended] {
            let profile = kind.profile();
            for i in 0..10_000i64 {
                let at = Utc.timestamp_millis_opt(1_600_000_000_000 + i * 37_003).unwrap();
                let reading = Reading::new(at);
                let mut rng = StdRng::seed_from_u64(i as u64);
                let m = synthesize(&reading, &mut rng, profile).unwrap();
                assert_in_range(profile, &m);
                assert!(m.last_block_timestamp as i64 <= reading.now_ms);
                assert!(m.last_block_timestamp as i64 >= reading.now_ms - 120_000);
            }
        }
    }

    #[test]
    fn extreme_draws_stay_in_range() {
        for profile in [&BASIC, &EXTENDED] {
            for i in 0..1_000i64 {
                let reading = Reading::new(Utc.timestamp_millis_opt(i * 11_113_000).unwrap());
                for mut rng in [StepRng::new(0, 0), StepRng::new(u64::MAX, 0)] {
                    let m = synthesize(&reading, &mut rng, profile).unwrap();
                    assert_in_range(profile, &m);
                }
            }
        }
    }

    #[test]
    fn classification_priority() {
        // magnitude beats everything
        assert_eq!(classify_ai_mode(0.3, true, 1.15), AiMode::Emergency);
        assert_eq!(classify_ai_mode(-0.26, false, 1.0), AiMode::Emergency);
        assert_eq!(classify_ai_mode(0.2, true, 1.0), AiMode::HighPerformance);
        // outside business hours a high reading falls through to Balanced
        assert_eq!(classify_ai_mode(0.2, false, 1.0), AiMode::Balanced);
        assert_eq!(classify_ai_mode(-0.2, true, 1.0), AiMode::Secure);
        assert_eq!(classify_ai_mode(0.1, true, 1.15), AiMode::Optimal);
        // weekend business hours are damped below 1.0
        assert_eq!(classify_ai_mode(0.1, true, 0.92), AiMode::Balanced);
        assert_eq!(classify_ai_mode(0.0, true, 1.0), AiMode::Balanced);
        assert_eq!(classify_ai_mode(0.25, false, 1.0), AiMode::Balanced);
    }

    #[test]
    fn classification_is_total() {
        let mut v = -0.5;
        while v <= 0.5 {
            for business in [true, false] {
                for lf in [0.72, 0.9, 0.92, 1.0, 1.15] {
                    assert!(AiMode::ALL.contains(&classify_ai_mode(v, business, lf)));
                }
            }
            v += 0.001;
        }
    }

    #[test]
    fn ai_mode_serializes_with_hyphen() {
        let json = serde_json::to_string(&AiMode::HighPerformance).unwrap();
        assert_eq!(json, "\"High-Performance\"");
        assert_eq!(AiMode::HighPerformance.as_str(), "High-Performance");
    }

    #[test]
    fn quantum_level_shape_follows_profile() {
        let reading = Reading::new(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        let basic = synthesize(&reading, &mut StdRng::seed_from_u64(1), &BASIC).unwrap();
        let ext = synthesize(&reading, &mut StdRng::seed_from_u64(1), &EXTENDED).unwrap();
        assert_eq!(serde_json::to_value(basic.quantum_security_level).unwrap(), "256-bit");
        assert_eq!(serde_json::to_value(ext.quantum_security_level).unwrap(), 256);
    }

    #[test]
    fn block_height_tracks_clock() {
        assert_eq!(block_height(&BASIC, 0), BASIC.genesis_height);
        assert_eq!(block_height(&BASIC, 850), BASIC.genesis_height + 10);
        assert!(block_height(&BASIC, 1_700_000_000_000) > block_height(&BASIC, 1_600_000_000_000));
    }

    #[test]
    fn seeded_synthesis_is_reproducible() {
        let reading = Reading::new(Utc.timestamp_millis_opt(1_700_000_123_456).unwrap());
        let a = synthesize(&reading, &mut StdRng::seed_from_u64(9), &EXTENDED).unwrap();
        let b = synthesize(&reading, &mut StdRng::seed_from_u64(9), &EXTENDED).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unseeded_synthesis_varies() {
        let reading = Reading::new(Utc.timestamp_millis_opt(1_700_000_123_456).unwrap());
        let mut rng = rand::thread_rng();
        let a = synthesize(&reading, &mut rng, &EXTENDED).unwrap();
        let b = synthesize(&reading, &mut rng, &EXTENDED).unwrap();
        assert!(a.last_block_timestamp != b.last_block_timestamp || a.uptime_percentage != b.uptime_percentage);
    }
}
