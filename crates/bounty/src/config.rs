use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::Path;

use serde::{Deserialize, Serialize};

use foundation::math::Vec3;
use scene::prefabs::oxford_beacons;
use scene::{Category, Location, LocationRegistry, Status};

use crate::error::ConfigError;
use crate::reward::RewardPolicy;
use crate::verification::Timeline;
use crate::wallet::Credits;

/// Environment variable consulted when no config path is passed explicitly.
pub const CONFIG_ENV_VAR: &str = "BEACON_CONFIG";

pub const DEFAULT_FEED_CAPACITY: usize = 8;

/// Upper bound on `feed_capacity`; the HUD only ever shows a screenful.
pub const MAX_FEED_CAPACITY: usize = 1024;

/// One location as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSeed {
    pub id: u32,
    pub name: String,
    pub position: [f64; 3],
    pub status: Status,
    pub category: Category,
    #[serde(default)]
    pub days_since_verified: u32,
}

impl From<&Location> for LocationSeed {
    fn from(l: &Location) -> Self {
        Self {
            id: l.id.get(),
            name: l.name.clone(),
            position: l.position.to_array(),
            status: l.status,
            category: l.category,
            days_since_verified: l.days_since_verified,
        }
    }
}

impl From<&LocationSeed> for Location {
    fn from(seed: &LocationSeed) -> Self {
        Location::new(
            seed.id,
            seed.name.clone(),
            Vec3::from_array(seed.position),
            seed.status,
            seed.category,
        )
        .with_days_since_verified(seed.days_since_verified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BountyConfig {
    pub starting_balance: Credits,
    pub reward: RewardPolicy,
    pub timeline: Timeline,
    /// Lines kept in the HUD live feed.
    pub feed_capacity: usize,
    pub locations: Vec<LocationSeed>,
}

impl Default for BountyConfig {
    fn default() -> Self {
        Self {
            starting_balance: Credits::whole(100),
            reward: RewardPolicy::default(),
            timeline: Timeline::default(),
            feed_capacity: DEFAULT_FEED_CAPACITY,
            locations: oxford_beacons().iter().map(LocationSeed::from).collect(),
        }
    }
}

impl BountyConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: BountyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// Loads from `path`, else from `$BEACON_CONFIG`, else the built-in defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve_from(path, std::env::var_os(CONFIG_ENV_VAR))
    }

    /// `resolve` with the environment value passed in. An empty value counts
    /// as unset.
    fn resolve_from(path: Option<&Path>, env_path: Option<OsString>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match env_path {
            Some(p) if !p.is_empty() => Self::load(Path::new(&p)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timeline.validate().map_err(ConfigError::Invalid)?;
        self.reward.validate().map_err(ConfigError::Invalid)?;
        if !(1..=MAX_FEED_CAPACITY).contains(&self.feed_capacity) {
            return Err(ConfigError::Invalid(format!(
                "feed_capacity must be within 1..={MAX_FEED_CAPACITY}, got {}",
                self.feed_capacity
            )));
        }
        if self.locations.is_empty() {
            return Err(ConfigError::Invalid("at least one location is required".into()));
        }
        let mut seen = BTreeSet::new();
        for seed in &self.locations {
            if !seen.insert(seed.id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate location id {}",
                    seed.id
                )));
            }
            if seed.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "location {} has an empty name",
                    seed.id
                )));
            }
            if seed.position.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "location {} has a non-finite position",
                    seed.id
                )));
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> Result<LocationRegistry, ConfigError> {
        let locations = self.locations.iter().map(Location::from).collect();
        Ok(LocationRegistry::from_locations(locations)?)
    }
}
