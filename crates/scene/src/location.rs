use std::fmt;
use std::str::FromStr;

use foundation::ids::LocationId;
use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Fresh,
    Stale,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Fresh => "fresh",
            Status::Stale => "stale",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Descriptive tag shown next to a beacon. Has no behavioral effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cafe,
    Shop,
    Landmark,
    Market,
    Museum,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Cafe,
        Category::Shop,
        Category::Landmark,
        Category::Market,
        Category::Museum,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cafe => "cafe",
            Category::Shop => "shop",
            Category::Landmark => "landmark",
            Category::Market => "market",
            Category::Museum => "museum",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A point of interest rendered as a beacon.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub position: Vec3,
    pub status: Status,
    pub category: Category,
    /// Age of the location's data in days; reset when a bounty is verified.
    pub days_since_verified: u32,
}

impl Location {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        position: Vec3,
        status: Status,
        category: Category,
    ) -> Self {
        Self {
            id: LocationId(id),
            name: name.into(),
            position,
            status,
            category,
            days_since_verified: 0,
        }
    }

    pub fn with_days_since_verified(mut self, days: u32) -> Self {
        self.days_since_verified = days;
        self
    }

    pub fn is_stale(&self) -> bool {
        self.status == Status::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Status};

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Museum".parse::<Category>(), Ok(Category::Museum));
        assert_eq!(" cafe ".parse::<Category>(), Ok(Category::Cafe));
        assert!("bakery".parse::<Category>().is_err());
    }

    #[test]
    fn status_and_category_use_lowercase_names() {
        assert_eq!(serde_json::to_string(&Status::Stale).unwrap(), "\"stale\"");
        assert_eq!(
            serde_json::from_str::<Category>("\"landmark\"").unwrap(),
            Category::Landmark
        );
        assert_eq!(Status::Fresh.to_string(), "fresh");
    }
}
