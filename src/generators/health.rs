use serde::Serialize;

use crate::clock::Reading;
use crate::entropy::RandomSource;
use crate::telemetry::profile::SynthProfile;
use crate::telemetry::{SynthError, Variation};

use super::NodeIdentity;

/// Below this health percentage the node reports itself as degraded.
pub const DEGRADED_BELOW: f64 = 99.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Ok,
    Warn,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub api: CheckState,
    pub consensus: CheckState,
    pub network: CheckState,
    pub ai_engine: CheckState,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthState,
    pub checks: HealthChecks,
    pub health_percentage: f64,
    pub uptime_seconds: u64,
    pub response_time_ms: u64,
    pub version: String,
}

pub fn generate_health<R: RandomSource + ?Sized>(
    reading: &Reading,
    rng: &mut R,
    profile: &SynthProfile,
    node: &NodeIdentity,
) -> Result<HealthReport, SynthError> {
    let variation = Variation::sample(reading, rng, profile)?;
    let f = &profile.fields;
    let health_percentage = f.health_percentage.rounded(variation.value);
    let status = if health_percentage < DEGRADED_BELOW {
        HealthState::Degraded
    } else {
        HealthState::Healthy
    };

    let check = |ok: bool| if ok { CheckState::Ok } else { CheckState::Warn };
    let checks = HealthChecks {
        api: CheckState::Ok,
        consensus: check(status == HealthState::Healthy),
        network: check(f.network_load.rounded(variation.value) < 0.9),
        ai_engine: check(variation.value.abs() <= 0.25),
    };

    Ok(HealthReport {
        status,
        checks,
        health_percentage,
        uptime_seconds: node.uptime_secs(reading),
        response_time_ms: rng.between(1.0, 15.0).round() as u64,
        version: profile.api_version.to_string(),
    })
}
