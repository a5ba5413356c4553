use foundation::ids::LocationId;

use crate::location::Location;
use crate::registry::{LocationRegistry, RegistryError};

/// What a call to [`Selection::select`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectChange {
    /// The id was already selected.
    Unchanged,
    /// Selection moved; carries the previously selected id, if any.
    Changed { previous: Option<LocationId> },
}

/// Single-location selection.
///
/// Stores only the id; the selected record is always derived from the
/// registry so it can never go out of date.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<LocationId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id`.
    ///
    /// Unknown ids are rejected and leave the current selection untouched.
    /// Selecting the already-selected id is a no-op.
    pub fn select(
        &mut self,
        id: LocationId,
        registry: &LocationRegistry,
    ) -> Result<SelectChange, RegistryError> {
        if !registry.contains(id) {
            return Err(RegistryError::UnknownLocation(id));
        }
        if self.selected == Some(id) {
            return Ok(SelectChange::Unchanged);
        }
        let previous = self.selected.replace(id);
        Ok(SelectChange::Changed { previous })
    }

    /// Clears the selection, returning what was selected.
    pub fn clear(&mut self) -> Option<LocationId> {
        self.selected.take()
    }

    pub fn id(&self) -> Option<LocationId> {
        self.selected
    }

    pub fn current<'a>(&self, registry: &'a LocationRegistry) -> Option<&'a Location> {
        self.selected.and_then(|id| registry.get(id))
    }
}
