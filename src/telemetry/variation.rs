use crate::clock::Reading;
use crate::entropy::RandomSource;

use super::profile::{round_to, SynthProfile};
use super::SynthError;

const BUSINESS_LOAD: f64 = 1.15;
const OFF_HOURS_LOAD: f64 = 0.90;
const WEEKEND_LOAD: f64 = 0.80;

/// The composite signal every metric is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    /// Sum of the cycles plus noise, scaled by `load_factor`.
    pub value: f64,
    pub load_factor: f64,
    pub is_business_hours: bool,
}

impl Variation {
    /// Draws one noise sample; the cyclic part depends only on the clock.
    pub fn sample<R: RandomSource + ?Sized>(
        reading: &Reading,
        rng: &mut R,
        profile: &SynthProfile,
    ) -> Result<Self, SynthError> {
        if reading.now_ms < 0 {
            return Err(SynthError::ClockBeforeEpoch(reading.now_ms));
        }

        let elapsed = reading.elapsed_secs();
        let cyclic: f64 = profile
            .cycles
            .iter()
            .map(|c| (elapsed / c.period_secs).sin() * c.amplitude)
            .sum();
        let noise = (rng.uniform() - 0.5) * profile.noise_amplitude;

        let load_factor = if profile.load_shaping {
            load_factor(reading)
        } else {
            1.0
        };
        let value = (cyclic + noise) * load_factor;
        if !value.is_finite() {
            return Err(SynthError::NonFinite("variation"));
        }

        Ok(Self {
            value,
            load_factor,
            is_business_hours: reading.is_business_hours(),
        })
    }

    /// Largest magnitude `sample` can return for `profile`.
    pub fn bound(profile: &SynthProfile) -> f64 {
        let amp: f64 = profile.cycles.iter().map(|c| c.amplitude).sum::<f64>()
            + profile.noise_amplitude / 2.0;
        let peak_load = if profile.load_shaping { BUSINESS_LOAD } else { 1.0 };
        amp * peak_load
    }
}

pub fn load_factor(reading: &Reading) -> f64 {
    let hours = if reading.is_business_hours() {
        BUSINESS_LOAD
    } else {
        OFF_HOURS_LOAD
    };
    let day = if reading.is_weekend() { WEEKEND_LOAD } else { 1.0 };
    round_to(hours * day, 2)
}
