use serde::Serialize;

use crate::clock::Reading;
use crate::entropy::RandomSource;
use crate::telemetry::metrics::block_height;
use crate::telemetry::profile::SynthProfile;
use crate::telemetry::{SynthError, Variation};

pub const BLOCK_PAGE_SIZE: u64 = 10;
pub const BLOCK_GAS_LIMIT: u64 = 30_000_000;

#[derive(Debug, Clone, Serialize)]
pub struct BlockRecord {
    pub height: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: u64,
    pub transaction_count: u64,
    pub size_bytes: u64,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub validator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockList {
    pub latest_height: u64,
    pub block_time_ms: u64,
    pub blocks: Vec<BlockRecord>,
}

/// The ten most recent blocks, newest first.
pub fn generate_blocks<R: RandomSource + ?Sized>(
    reading: &Reading,
    rng: &mut R,
    profile: &SynthProfile,
) -> Result<BlockList, SynthError> {
    let variation = Variation::sample(reading, rng, profile)?;
    let block_time_ms = profile.fields.block_time_ms.integer(variation.value);
    let latest = block_height(profile, reading.now_ms);
    let now_ms = reading.now_ms.max(0) as u64;

    // one extra hash so the oldest listed block has a parent
    let hashes: Vec<String> = (0..=BLOCK_PAGE_SIZE).map(|_| rng.hash()).collect();

    let blocks = (0..BLOCK_PAGE_SIZE)
        .map(|i| {
            let transaction_count = rng.between(800.0, 2_500.0).floor() as u64;
            let gas_used = (rng.between(0.45, 0.98) * BLOCK_GAS_LIMIT as f64).floor() as u64;
            BlockRecord {
                height: latest.saturating_sub(i),
                hash: hashes[i as usize].clone(),
                parent_hash: hashes[i as usize + 1].clone(),
                timestamp: now_ms.saturating_sub(i * block_time_ms),
                transaction_count,
                size_bytes: transaction_count * rng.between(180.0, 260.0).floor() as u64,
                gas_used,
                gas_limit: BLOCK_GAS_LIMIT,
                validator: rng.address(),
            }
        })
        .collect();

    Ok(BlockList {
        latest_height: latest,
        block_time_ms,
        blocks,
    })
}
