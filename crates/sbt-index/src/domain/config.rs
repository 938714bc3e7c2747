//! Tree configuration

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Tree configuration
///
/// The seed drives tie-breaking between equally heavy subtrees during
/// insertion. With a fixed seed, the same insertion order always yields
/// the same shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Seed for the tie-breaking RNG (`None` = seeded from OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TreeConfig {
    /// Configuration with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Build the tie-breaking RNG
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
