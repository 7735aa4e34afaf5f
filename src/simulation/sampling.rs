//! Random draws used by the arrival model
//!
//! All randomness goes through a caller-supplied generator so seeded runs are
//! reproducible.

use rand::Rng;

use super::config::VehicleMix;
use super::types::{VehicleCategory, POISSON_CHUNK_MEAN};

/// Draw a Poisson-distributed count with the given mean
///
/// Uses Knuth's product-of-uniforms method. Means above
/// [`POISSON_CHUNK_MEAN`] are split into equal chunks whose draws are summed,
/// which keeps `exp(-mean)` well away from underflow. Cost grows linearly
/// with the mean; lanes keep it small by capping arrival rates at
/// [`super::types::MAX_ARRIVAL_RATE_PER_MINUTE`].
pub fn sample_poisson<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> u64 {
    if !(mean.is_finite() && mean > 0.0) {
        return 0;
    }

    let chunks = (mean / POISSON_CHUNK_MEAN).ceil().max(1.0);
    let chunk_mean = mean / chunks;
    let threshold = (-chunk_mean).exp();

    let mut total = 0u64;
    for _ in 0..chunks as u64 {
        let mut count = 0u64;
        let mut product: f64 = rng.random();
        while product > threshold {
            count += 1;
            product *= rng.random::<f64>();
        }
        total += count;
    }
    total
}

/// Pick a vehicle category according to the mix probabilities
pub fn sample_category<R: Rng + ?Sized>(rng: &mut R, mix: &VehicleMix) -> VehicleCategory {
    let roll: f64 = rng.random();
    let mut cumulative = 0.0;
    for profile in mix.profiles() {
        cumulative += profile.probability;
        if roll < cumulative {
            return profile.category;
        }
    }

    // Rounding can leave the cumulative sum a hair under 1.
    mix.profiles()
        .iter()
        .rev()
        .find(|p| p.probability > 0.0)
        .map(|p| p.category)
        .unwrap_or(VehicleCategory::Car)
}
