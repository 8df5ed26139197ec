use serde::Serialize;

use crate::clock::Reading;
use crate::entropy::RandomSource;
use crate::telemetry::metrics::active_validators;
use crate::telemetry::profile::{round_to, SynthProfile};
use crate::telemetry::{SynthError, Variation};

/// Upper bound on records returned in one listing.
pub const MAX_LISTED_VALIDATORS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorStatus {
    Active,
    Inactive,
    Jailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatorRecord {
    pub id: String,
    pub address: String,
    pub stake: u64,
    pub commission: f64,
    pub uptime_percentage: f64,
    pub status: ValidatorStatus,
    pub blocks_proposed: u64,
    pub last_seen: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatorSet {
    pub total_validators: u64,
    pub active_validators: u64,
    pub total_stake: u64,
    pub validators: Vec<ValidatorRecord>,
}

pub fn generate_validators<R: RandomSource + ?Sized>(
    reading: &Reading,
    rng: &mut R,
    profile: &SynthProfile,
) -> Result<ValidatorSet, SynthError> {
    let variation = Variation::sample(reading, rng, profile)?;
    let total = profile.fields.validator_count.integer(variation.value);
    let listed = total.min(MAX_LISTED_VALIDATORS);
    let now_ms = reading.now_ms.max(0) as u64;

    let validators: Vec<ValidatorRecord> = (0..listed)
        .map(|i| {
            let status = if rng.chance(0.95) {
                ValidatorStatus::Active
            } else if rng.chance(0.8) {
                ValidatorStatus::Inactive
            } else {
                ValidatorStatus::Jailed
            };
            ValidatorRecord {
                id: format!("validator-{:03}", i + 1),
                address: rng.address(),
                stake: rng.between(100_000.0, 1_100_000.0).floor() as u64,
                commission: round_to(rng.between(0.01, 0.10), 4),
                uptime_percentage: round_to(rng.between(98.5, 100.0), 2),
                status,
                blocks_proposed: rng.between(1_000.0, 50_000.0).floor() as u64,
                last_seen: now_ms.saturating_sub(rng.between(0.0, 60_000.0) as u64),
            }
        })
        .collect();

    // listed stake scaled to the whole set
    let listed_stake: u64 = validators.iter().map(|v| v.stake).sum();
    let total_stake = if listed == 0 {
        0
    } else {
        listed_stake / listed * total
    };

    Ok(ValidatorSet {
        total_validators: total,
        active_validators: active_validators(total),
        total_stake,
        validators,
    })
}
