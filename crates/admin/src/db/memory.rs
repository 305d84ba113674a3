//! In-process hierarchy store.
//!
//! Enforces the same constraints as the `catalog` schema (sibling name
//! uniqueness, existing parents, restrict-on-delete) so controller and
//! integration tests run without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use shopping_core::{CityId, CountryId, EntityName, StateId};

use super::RepositoryError;
use super::hierarchy::{CityRow, CountryRow, HierarchyStore, StateRow, assemble_hierarchy};
use crate::models::{
    City, CityDetails, Country, CountrySummary, State, StateDetails, StateSummary,
};

#[derive(Debug, Default)]
struct Tables {
    countries: Vec<CountryRow>,
    states: Vec<StateRow>,
    cities: Vec<CityRow>,
    last_id: i32,
    fail_next_write: Option<String>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn check_failure(&mut self) -> Result<(), RepositoryError> {
        match self.fail_next_write.take() {
            Some(message) => Err(RepositoryError::StorageFailure(message)),
            None => Ok(()),
        }
    }

    fn cities_of(&self, state_id: StateId) -> Vec<City> {
        self.cities
            .iter()
            .filter(|c| c.state_id == state_id)
            .cloned()
            .map(City::from)
            .collect()
    }

    fn country(&self, id: CountryId) -> Option<Country> {
        let row = self.countries.iter().find(|c| c.id == id)?.clone();
        let states: Vec<StateRow> = self
            .states
            .iter()
            .filter(|s| s.country_id == id)
            .cloned()
            .collect();
        let cities: Vec<CityRow> = self
            .cities
            .iter()
            .filter(|c| states.iter().any(|s| s.id == c.state_id))
            .cloned()
            .collect();
        assemble_hierarchy(vec![row], states, cities).pop()
    }

    fn state(&self, id: StateId) -> Option<State> {
        let row = self.states.iter().find(|s| s.id == id)?;
        Some(State {
            id: row.id,
            country_id: row.country_id,
            name: row.name.clone(),
            cities: self.cities_of(id),
        })
    }
}

/// Hierarchy store kept entirely in memory.
///
/// IDs are allocated from a single sequence shared by all three tables.
#[derive(Debug, Default)]
pub struct MemoryHierarchyStore {
    tables: Mutex<Tables>,
}

impl MemoryHierarchyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write fail with [`RepositoryError::StorageFailure`].
    pub fn fail_next_write(&self, message: impl Into<String>) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.fail_next_write = Some(message.into());
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::StorageFailure("hierarchy store lock poisoned".into()))
    }
}

#[async_trait]
impl HierarchyStore for MemoryHierarchyStore {
    async fn list_countries(&self) -> Result<Vec<Country>, RepositoryError> {
        let tables = self.tables()?;
        Ok(assemble_hierarchy(
            tables.countries.clone(),
            tables.states.clone(),
            tables.cities.clone(),
        ))
    }

    async fn get_country(&self, id: CountryId) -> Result<Option<Country>, RepositoryError> {
        Ok(self.tables()?.country(id))
    }

    async fn get_state(&self, id: StateId) -> Result<Option<StateDetails>, RepositoryError> {
        let tables = self.tables()?;
        let Some(state) = tables.state(id) else {
            return Ok(None);
        };
        let country = tables
            .countries
            .iter()
            .find(|c| c.id == state.country_id)
            .map(|c| CountrySummary {
                id: c.id,
                name: c.name.clone(),
            });
        Ok(country.map(|country| StateDetails { state, country }))
    }

    async fn get_city(&self, id: CityId) -> Result<Option<CityDetails>, RepositoryError> {
        let tables = self.tables()?;
        let Some(city) = tables.cities.iter().find(|c| c.id == id).cloned() else {
            return Ok(None);
        };
        let state = tables
            .states
            .iter()
            .find(|s| s.id == city.state_id)
            .map(|s| StateSummary {
                id: s.id,
                country_id: s.country_id,
                name: s.name.clone(),
            });
        Ok(state.map(|state| CityDetails {
            city: City::from(city),
            state,
        }))
    }

    async fn create_country(&self, name: &EntityName) -> Result<Country, RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        if tables.countries.iter().any(|c| c.name == name.as_str()) {
            return Err(RepositoryError::DuplicateName);
        }
        let row = CountryRow {
            id: CountryId::new(tables.next_id()),
            name: name.as_str().to_string(),
            version: 0,
        };
        tables.countries.push(row.clone());
        Ok(Country {
            id: row.id,
            name: row.name,
            version: row.version,
            states: Vec::new(),
        })
    }

    async fn update_country(
        &self,
        id: CountryId,
        name: &EntityName,
        version: i32,
    ) -> Result<Country, RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        let Some(index) = tables
            .countries
            .iter()
            .position(|c| c.id == id && c.version == version)
        else {
            return Err(RepositoryError::ConcurrencyConflict);
        };
        if tables
            .countries
            .iter()
            .any(|c| c.id != id && c.name == name.as_str())
        {
            return Err(RepositoryError::DuplicateName);
        }
        if let Some(row) = tables.countries.get_mut(index) {
            row.name = name.as_str().to_string();
            row.version += 1;
        }
        tables.country(id).ok_or(RepositoryError::ConcurrencyConflict)
    }

    async fn create_state(
        &self,
        country_id: CountryId,
        name: &EntityName,
    ) -> Result<State, RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        if !tables.countries.iter().any(|c| c.id == country_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .states
            .iter()
            .any(|s| s.country_id == country_id && s.name == name.as_str())
        {
            return Err(RepositoryError::DuplicateName);
        }
        let row = StateRow {
            id: StateId::new(tables.next_id()),
            country_id,
            name: name.as_str().to_string(),
        };
        tables.states.push(row.clone());
        Ok(State {
            id: row.id,
            country_id: row.country_id,
            name: row.name,
            cities: Vec::new(),
        })
    }

    async fn update_state(
        &self,
        id: StateId,
        name: &EntityName,
    ) -> Result<State, RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        let country_id = tables
            .states
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.country_id)
            .ok_or(RepositoryError::NotFound)?;
        if tables
            .states
            .iter()
            .any(|s| s.id != id && s.country_id == country_id && s.name == name.as_str())
        {
            return Err(RepositoryError::DuplicateName);
        }
        if let Some(row) = tables.states.iter_mut().find(|s| s.id == id) {
            row.name = name.as_str().to_string();
        }
        tables.state(id).ok_or(RepositoryError::NotFound)
    }

    async fn create_city(
        &self,
        state_id: StateId,
        name: &EntityName,
    ) -> Result<City, RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        if !tables.states.iter().any(|s| s.id == state_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .cities
            .iter()
            .any(|c| c.state_id == state_id && c.name == name.as_str())
        {
            return Err(RepositoryError::DuplicateName);
        }
        let row = CityRow {
            id: CityId::new(tables.next_id()),
            state_id,
            name: name.as_str().to_string(),
        };
        tables.cities.push(row.clone());
        Ok(City::from(row))
    }

    async fn update_city(&self, id: CityId, name: &EntityName) -> Result<City, RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        let state_id = tables
            .cities
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.state_id)
            .ok_or(RepositoryError::NotFound)?;
        if tables
            .cities
            .iter()
            .any(|c| c.id != id && c.state_id == state_id && c.name == name.as_str())
        {
            return Err(RepositoryError::DuplicateName);
        }
        let row = tables
            .cities
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.name = name.as_str().to_string();
        Ok(City::from(row.clone()))
    }

    async fn delete_country(&self, id: CountryId) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        let index = tables
            .countries
            .iter()
            .position(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if tables.states.iter().any(|s| s.country_id == id) {
            return Err(RepositoryError::HasDependents);
        }
        tables.countries.remove(index);
        Ok(())
    }

    async fn delete_state(&self, id: StateId) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        let index = tables
            .states
            .iter()
            .position(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if tables.cities.iter().any(|c| c.state_id == id) {
            return Err(RepositoryError::HasDependents);
        }
        tables.states.remove(index);
        Ok(())
    }

    async fn delete_city(&self, id: CityId) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        tables.check_failure()?;
        let index = tables
            .cities
            .iter()
            .position(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        tables.cities.remove(index);
        Ok(())
    }
}
