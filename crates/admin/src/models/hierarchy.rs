//! Country → State → City domain models.

use serde::{Deserialize, Serialize};

use shopping_core::{CityId, CountryId, StateId};

/// A country with its states (and their cities) loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Unique country ID.
    pub id: CountryId,
    /// Country name (unique).
    pub name: String,
    /// Optimistic concurrency token, incremented on every update.
    pub version: i32,
    /// States in insertion order.
    pub states: Vec<State>,
}

impl Country {
    /// Number of states in this country.
    #[must_use]
    pub fn states_number(&self) -> usize {
        self.states.len()
    }

    /// Number of cities across all states in this country.
    #[must_use]
    pub fn cities_number(&self) -> usize {
        self.states.iter().map(State::cities_number).sum()
    }

    /// Find a state of this country by ID.
    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Summary used as a back-reference from child records.
    #[must_use]
    pub fn summary(&self) -> CountrySummary {
        CountrySummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// A state with its cities loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Unique state ID.
    pub id: StateId,
    /// Owning country.
    pub country_id: CountryId,
    /// State name (unique within the country).
    pub name: String,
    /// Cities in insertion order.
    pub cities: Vec<City>,
}

impl State {
    /// Number of cities in this state.
    #[must_use]
    pub fn cities_number(&self) -> usize {
        self.cities.len()
    }
}

/// A city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Unique city ID.
    pub id: CityId,
    /// Owning state.
    pub state_id: StateId,
    /// City name (unique within the state).
    pub name: String,
}

/// Non-owning reference to a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub id: CountryId,
    pub name: String,
}

/// Non-owning reference to a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    pub id: StateId,
    pub country_id: CountryId,
    pub name: String,
}

/// A state together with its parent country and its cities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDetails {
    pub state: State,
    pub country: CountrySummary,
}

impl StateDetails {
    /// Summary used as a back-reference from child records.
    #[must_use]
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            id: self.state.id,
            country_id: self.state.country_id,
            name: self.state.name.clone(),
        }
    }
}

/// A city together with its parent state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDetails {
    pub city: City,
    pub state: StateSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: i32, state_id: i32, name: &str) -> City {
        City {
            id: CityId::new(id),
            state_id: StateId::new(state_id),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_country_counts() {
        let country = Country {
            id: CountryId::new(1),
            name: "Colombia".to_string(),
            version: 0,
            states: vec![
                State {
                    id: StateId::new(1),
                    country_id: CountryId::new(1),
                    name: "Antioquia".to_string(),
                    cities: vec![city(1, 1, "Medellín"), city(2, 1, "Envigado")],
                },
                State {
                    id: StateId::new(2),
                    country_id: CountryId::new(1),
                    name: "Cundinamarca".to_string(),
                    cities: vec![city(3, 2, "Bogotá")],
                },
            ],
        };

        assert_eq!(country.states_number(), 2);
        assert_eq!(country.cities_number(), 3);
        assert_eq!(
            country.state(StateId::new(2)).map(|s| s.name.as_str()),
            Some("Cundinamarca")
        );
        assert!(country.state(StateId::new(9)).is_none());
    }
}
