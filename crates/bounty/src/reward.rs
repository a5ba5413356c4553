use serde::{Deserialize, Serialize};

use scene::Location;

use crate::wallet::Credits;

/// Days after which a location counts as fully stale.
pub const FULL_STALENESS_DAYS: f64 = 365.0;

/// How much a completed bounty pays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardPolicy {
    /// Same payout for every bounty.
    Fixed { amount: Credits },
    /// Pays more for older, more relevant data:
    /// `base_rate * staleness * relevance`, rounded to the cent.
    StalenessWeighted { base_rate: Credits, relevance: f64 },
}

impl Default for RewardPolicy {
    fn default() -> Self {
        RewardPolicy::Fixed {
            amount: Credits::whole(15),
        }
    }
}

impl RewardPolicy {
    pub fn reward_for(&self, location: &Location) -> Credits {
        match *self {
            RewardPolicy::Fixed { amount } => amount,
            RewardPolicy::StalenessWeighted {
                base_rate,
                relevance,
            } => {
                let factor = staleness(location) * relevance.clamp(0.0, 1.0);
                Credits::from_cents((base_rate.cents() as f64 * factor).round() as u64)
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match *self {
            RewardPolicy::Fixed { .. } => Ok(()),
            RewardPolicy::StalenessWeighted { relevance, .. } => {
                if (0.0..=1.0).contains(&relevance) {
                    Ok(())
                } else {
                    Err(format!("relevance must be within [0, 1], got {relevance}"))
                }
            }
        }
    }
}

/// Staleness score in `[0, 1]`: 0 for data verified today, 1 after a year.
pub fn staleness(location: &Location) -> f64 {
    (location.days_since_verified as f64 / FULL_STALENESS_DAYS).min(1.0)
}
