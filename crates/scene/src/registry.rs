use std::collections::BTreeSet;
use std::fmt;

use foundation::ids::LocationId;

use crate::location::{Category, Location, Status};

/// Shortest query `search` accepts.
pub const MIN_SEARCH_LEN: usize = 3;
/// Upper bound on results returned by `search`.
pub const MAX_SEARCH_RESULTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownLocation(LocationId),
    DuplicateLocation(LocationId),
    QueryTooShort { len: usize },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownLocation(id) => write!(f, "unknown location id {id}"),
            RegistryError::DuplicateLocation(id) => write!(f, "duplicate location id {id}"),
            RegistryError::QueryTooShort { len } => write!(
                f,
                "search query must be at least {MIN_SEARCH_LEN} characters (got {len})"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// The fixed set of locations shown on the map.
///
/// Ordering contract:
/// - `all()` yields locations in seed order, which never changes.
/// - Locations are never added or removed after construction; only their
///   status (and data age) mutate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    pub fn from_locations(locations: Vec<Location>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        for location in &locations {
            if !seen.insert(location.id) {
                return Err(RegistryError::DuplicateLocation(location.id));
            }
        }
        Ok(Self { locations })
    }

    pub fn all(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Updates the status of `id`.
    ///
    /// Marking a location fresh also resets its data age, since fresh means
    /// "verified just now".
    pub fn set_status(&mut self, id: LocationId, status: Status) -> Result<(), RegistryError> {
        let location = self
            .locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RegistryError::UnknownLocation(id))?;
        location.status = status;
        if status == Status::Fresh {
            location.days_since_verified = 0;
        }
        Ok(())
    }

    pub fn stale(&self) -> impl Iterator<Item = &Location> + '_ {
        self.locations.iter().filter(|l| l.is_stale())
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Location> + '_ {
        self.locations.iter().filter(move |l| l.category == category)
    }

    /// At most `limit` locations in seed order, skipping the first `offset`.
    pub fn page(&self, limit: usize, offset: usize) -> &[Location] {
        let start = offset.min(self.locations.len());
        let end = start.saturating_add(limit).min(self.locations.len());
        &self.locations[start..end]
    }

    /// Distinct categories present, sorted.
    pub fn categories(&self) -> Vec<Category> {
        let set: BTreeSet<Category> = self.locations.iter().map(|l| l.category).collect();
        set.into_iter().collect()
    }

    /// Case-insensitive substring search over names and category labels.
    pub fn search(&self, query: &str) -> Result<Vec<&Location>, RegistryError> {
        let needle = query.trim().to_lowercase();
        let len = needle.chars().count();
        if len < MIN_SEARCH_LEN {
            return Err(RegistryError::QueryTooShort { len });
        }
        Ok(self
            .locations
            .iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&needle) || l.category.as_str().contains(&needle)
            })
            .take(MAX_SEARCH_RESULTS)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationRegistry, MAX_SEARCH_RESULTS, RegistryError};
    use crate::location::{Category, Location, Status};
    use crate::prefabs::oxford_beacons;
    use foundation::ids::LocationId;
    use foundation::math::Vec3;

    fn registry() -> LocationRegistry {
        LocationRegistry::from_locations(oxford_beacons()).expect("seed")
    }

    #[test]
    fn all_preserves_seed_order() {
        let reg = registry();
        let ids: Vec<u32> = reg.all().iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn only_the_grand_cafe_starts_stale() {
        let reg = registry();
        let stale: Vec<&str> = reg.stale().map(|l| l.name.as_str()).collect();
        assert_eq!(stale, vec!["The Grand Cafe"]);
        assert!(
            reg.all()
                .iter()
                .filter(|l| l.name != "The Grand Cafe")
                .all(|l| l.status == Status::Fresh)
        );
    }

    #[test]
    fn set_status_updates_and_resets_age() {
        let mut reg = registry();
        reg.set_status(LocationId(1), Status::Fresh).expect("known id");
        let cafe = reg.get(LocationId(1)).expect("cafe");
        assert_eq!(cafe.status, Status::Fresh);
        assert_eq!(cafe.days_since_verified, 0);
    }

    #[test]
    fn set_status_rejects_unknown_id_without_side_effects() {
        let mut reg = registry();
        let before = reg.clone();
        assert_eq!(
            reg.set_status(LocationId(99), Status::Fresh),
            Err(RegistryError::UnknownLocation(LocationId(99)))
        );
        assert_eq!(reg, before);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dup = vec![
            Location::new(1, "A", Vec3::ZERO, Status::Fresh, Category::Cafe),
            Location::new(1, "B", Vec3::ZERO, Status::Fresh, Category::Shop),
        ];
        assert_eq!(
            LocationRegistry::from_locations(dup),
            Err(RegistryError::DuplicateLocation(LocationId(1)))
        );
    }

    #[test]
    fn search_matches_name_and_category() {
        let reg = registry();
        let names: Vec<&str> = reg
            .search("MUSEUM")
            .expect("long enough")
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ashmolean Museum"]);

        let cafes = reg.search("caf").expect("long enough");
        assert_eq!(cafes.len(), 1);
    }

    #[test]
    fn search_caps_result_count() {
        let many = (1..=25)
            .map(|i| {
                Location::new(
                    i,
                    format!("Kiosk {i}"),
                    Vec3::new(i as f64, 0.0, 0.0),
                    Status::Fresh,
                    Category::Shop,
                )
            })
            .collect();
        let reg = LocationRegistry::from_locations(many).expect("registry");
        let found = reg.search("kiosk").expect("long enough");
        assert_eq!(found.len(), MAX_SEARCH_RESULTS);
        assert_eq!(found[0].id, LocationId(1));
        assert_eq!(found[19].id, LocationId(20));
    }

    #[test]
    fn page_slices_in_seed_order() {
        let reg = registry();
        let ids = |page: &[Location]| page.iter().map(|l| l.id.get()).collect::<Vec<_>>();
        assert_eq!(ids(reg.page(2, 0)), vec![1, 2]);
        assert_eq!(ids(reg.page(2, 3)), vec![4, 5]);
        assert_eq!(ids(reg.page(10, 4)), vec![5]);
        assert!(reg.page(3, 9).is_empty());
        assert!(reg.page(0, 0).is_empty());
        assert_eq!(reg.page(usize::MAX, 1).len(), 4);
    }

    #[test]
    fn search_rejects_short_queries() {
        let reg = registry();
        assert_eq!(
            reg.search(" ab ").unwrap_err(),
            RegistryError::QueryTooShort { len: 2 }
        );
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let reg = registry();
        assert_eq!(reg.categories(), Category::ALL.to_vec());
        assert_eq!(reg.by_category(Category::Market).count(), 1);
    }
}
