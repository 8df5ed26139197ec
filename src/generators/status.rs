use serde::Serialize;

use crate::clock::Reading;
use crate::entropy::RandomSource;
use crate::telemetry::metrics::{block_height, classify_ai_mode, AiMode};
use crate::telemetry::profile::{SynthProfile, CONSENSUS_ALGORITHM};
use crate::telemetry::{SynthError, Variation};

use super::NodeIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkState {
    Operational,
    Degraded,
}

impl NetworkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkState::Operational => "operational",
            NetworkState::Degraded => "degraded",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkStatus {
    pub network: String,
    pub status: NetworkState,
    pub chain_id: String,
    pub protocol_version: String,
    pub consensus_algorithm: String,
    pub current_block_height: u64,
    pub ai_mode: AiMode,
    pub validator_count: u64,
    pub node_id: String,
    pub uptime_seconds: u64,
}

pub fn generate_status<R: RandomSource + ?Sized>(
    reading: &Reading,
    rng: &mut R,
    profile: &SynthProfile,
    node: &NodeIdentity,
) -> Result<NetworkStatus, SynthError> {
    let variation = Variation::sample(reading, rng, profile)?;
    let ai_mode = classify_ai_mode(
        variation.value,
        variation.is_business_hours,
        variation.load_factor,
    );
    let status = match ai_mode {
        AiMode::Emergency => NetworkState::Degraded,
        _ => NetworkState::Operational,
    };

    Ok(NetworkStatus {
        network: profile.network_name.to_string(),
        status,
        chain_id: profile.chain_id.to_string(),
        protocol_version: profile.api_version.to_string(),
        consensus_algorithm: CONSENSUS_ALGORITHM.to_string(),
        current_block_height: block_height(profile, reading.now_ms),
        ai_mode,
        validator_count: profile.fields.validator_count.integer(variation.value),
        node_id: node.node_id.clone(),
        uptime_seconds: node.uptime_secs(reading),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::profile::BASIC;
    use chrono::{TimeZone, Utc};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn emergency_mode_means_degraded() {
        let start = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let node = NodeIdentity::new("test", start);
        for seed in 0..2_000u64 {
            let reading = Reading::new(
                Utc.timestamp_millis_opt(1_700_000_000_000 + seed as i64 * 9_001).unwrap(),
            );
            let s = generate_status(&reading, &mut StdRng::seed_from_u64(seed), &BASIC, &node).unwrap();
            assert_eq!(s.status == NetworkState::Degraded, s.ai_mode == AiMode::Emergency);
            assert_eq!(serde_json::to_value(s.status).unwrap(), s.status.as_str());
            assert_eq!(s.node_id, node.node_id);
            assert_eq!(s.consensus_algorithm, "TriUnity-PoS-AI");
        }
    }
}
