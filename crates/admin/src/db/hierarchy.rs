//! Country → State → City repository.
//!
//! [`HierarchyStore`] is the seam the controller works against.
//! [`PgHierarchyRepository`] is the production implementation; every write
//! is a single autocommitted statement and constraint failures are mapped by
//! [`classify_write_error`].

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use shopping_core::{CityId, CountryId, EntityName, StateId};

use super::{RepositoryError, WriteKind, classify_write_error};
use crate::models::{
    City, CityDetails, Country, CountrySummary, State, StateDetails, StateSummary,
};

/// Storage operations over the catalog hierarchy.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// All countries with their states and cities, in insertion order.
    async fn list_countries(&self) -> Result<Vec<Country>, RepositoryError>;

    /// A country with its states and their cities.
    async fn get_country(&self, id: CountryId) -> Result<Option<Country>, RepositoryError>;

    /// A state with its parent country and its cities.
    async fn get_state(&self, id: StateId) -> Result<Option<StateDetails>, RepositoryError>;

    /// A city with its parent state.
    async fn get_city(&self, id: CityId) -> Result<Option<CityDetails>, RepositoryError>;

    async fn create_country(&self, name: &EntityName) -> Result<Country, RepositoryError>;

    /// Rename a country if `version` still matches the stored token.
    ///
    /// Returns [`RepositoryError::ConcurrencyConflict`] when the token is
    /// stale or the row no longer exists.
    async fn update_country(
        &self,
        id: CountryId,
        name: &EntityName,
        version: i32,
    ) -> Result<Country, RepositoryError>;

    async fn create_state(
        &self,
        country_id: CountryId,
        name: &EntityName,
    ) -> Result<State, RepositoryError>;

    async fn update_state(&self, id: StateId, name: &EntityName)
    -> Result<State, RepositoryError>;

    async fn create_city(
        &self,
        state_id: StateId,
        name: &EntityName,
    ) -> Result<City, RepositoryError>;

    async fn update_city(&self, id: CityId, name: &EntityName) -> Result<City, RepositoryError>;

    async fn delete_country(&self, id: CountryId) -> Result<(), RepositoryError>;

    async fn delete_state(&self, id: StateId) -> Result<(), RepositoryError>;

    async fn delete_city(&self, id: CityId) -> Result<(), RepositoryError>;
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CountryRow {
    pub id: CountryId,
    pub name: String,
    pub version: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StateRow {
    pub id: StateId,
    pub country_id: CountryId,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CityRow {
    pub id: CityId,
    pub state_id: StateId,
    pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct StateWithCountryRow {
    id: StateId,
    country_id: CountryId,
    name: String,
    country_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CityWithStateRow {
    id: CityId,
    state_id: StateId,
    name: String,
    country_id: CountryId,
    state_name: String,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        Self {
            id: row.id,
            state_id: row.state_id,
            name: row.name,
        }
    }
}

impl StateRow {
    fn into_state(self, cities: Vec<City>) -> State {
        State {
            id: self.id,
            country_id: self.country_id,
            name: self.name,
            cities,
        }
    }
}

impl From<CityWithStateRow> for CityDetails {
    fn from(row: CityWithStateRow) -> Self {
        Self {
            state: StateSummary {
                id: row.state_id,
                country_id: row.country_id,
                name: row.state_name,
            },
            city: City {
                id: row.id,
                state_id: row.state_id,
                name: row.name,
            },
        }
    }
}

/// Build nested countries from flat rows.
///
/// Rows must already be in insertion order; children whose parent is not
/// among the given rows are dropped.
pub(crate) fn assemble_hierarchy(
    countries: Vec<CountryRow>,
    states: Vec<StateRow>,
    cities: Vec<CityRow>,
) -> Vec<Country> {
    let mut cities_by_state: HashMap<StateId, Vec<City>> = HashMap::new();
    for row in cities {
        cities_by_state
            .entry(row.state_id)
            .or_default()
            .push(City::from(row));
    }

    let mut states_by_country: HashMap<CountryId, Vec<State>> = HashMap::new();
    for row in states {
        let cities = cities_by_state.remove(&row.id).unwrap_or_default();
        states_by_country
            .entry(row.country_id)
            .or_default()
            .push(row.into_state(cities));
    }

    countries
        .into_iter()
        .map(|row| Country {
            states: states_by_country.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            version: row.version,
        })
        .collect()
}

// =============================================================================
// PostgreSQL Implementation
// =============================================================================

/// `PostgreSQL`-backed hierarchy repository.
#[derive(Debug, Clone)]
pub struct PgHierarchyRepository {
    pool: PgPool,
}

impl PgHierarchyRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn cities_of_state(&self, state_id: StateId) -> Result<Vec<City>, RepositoryError> {
        let rows = sqlx::query_as::<_, CityRow>(
            r"
            SELECT id, state_id, name
            FROM catalog.cities
            WHERE state_id = $1
            ORDER BY id
            ",
        )
        .bind(state_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(City::from).collect())
    }
}

#[async_trait]
impl HierarchyStore for PgHierarchyRepository {
    #[instrument(skip(self))]
    async fn list_countries(&self) -> Result<Vec<Country>, RepositoryError> {
        let countries = sqlx::query_as::<_, CountryRow>(
            "SELECT id, name, version FROM catalog.countries ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let states = sqlx::query_as::<_, StateRow>(
            "SELECT id, country_id, name FROM catalog.states ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let cities =
            sqlx::query_as::<_, CityRow>("SELECT id, state_id, name FROM catalog.cities ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(assemble_hierarchy(countries, states, cities))
    }

    #[instrument(skip(self))]
    async fn get_country(&self, id: CountryId) -> Result<Option<Country>, RepositoryError> {
        let Some(country) = sqlx::query_as::<_, CountryRow>(
            "SELECT id, name, version FROM catalog.countries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let states = sqlx::query_as::<_, StateRow>(
            r"
            SELECT id, country_id, name
            FROM catalog.states
            WHERE country_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let cities = sqlx::query_as::<_, CityRow>(
            r"
            SELECT ci.id, ci.state_id, ci.name
            FROM catalog.cities ci
            JOIN catalog.states s ON s.id = ci.state_id
            WHERE s.country_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble_hierarchy(vec![country], states, cities).pop())
    }

    #[instrument(skip(self))]
    async fn get_state(&self, id: StateId) -> Result<Option<StateDetails>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, StateWithCountryRow>(
            r"
            SELECT s.id, s.country_id, s.name, c.name AS country_name
            FROM catalog.states s
            JOIN catalog.countries c ON c.id = s.country_id
            WHERE s.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let cities = self.cities_of_state(row.id).await?;

        Ok(Some(StateDetails {
            country: CountrySummary {
                id: row.country_id,
                name: row.country_name,
            },
            state: State {
                id: row.id,
                country_id: row.country_id,
                name: row.name,
                cities,
            },
        }))
    }

    #[instrument(skip(self))]
    async fn get_city(&self, id: CityId) -> Result<Option<CityDetails>, RepositoryError> {
        let row = sqlx::query_as::<_, CityWithStateRow>(
            r"
            SELECT ci.id, ci.state_id, ci.name, s.country_id, s.name AS state_name
            FROM catalog.cities ci
            JOIN catalog.states s ON s.id = ci.state_id
            WHERE ci.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CityDetails::from))
    }

    #[instrument(skip(self))]
    async fn create_country(&self, name: &EntityName) -> Result<Country, RepositoryError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r"
            INSERT INTO catalog.countries (name)
            VALUES ($1)
            RETURNING id, name, version
            ",
        )
        .bind(name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(&e, WriteKind::Insert))?;

        Ok(Country {
            id: row.id,
            name: row.name,
            version: row.version,
            states: Vec::new(),
        })
    }

    #[instrument(skip(self))]
    async fn update_country(
        &self,
        id: CountryId,
        name: &EntityName,
        version: i32,
    ) -> Result<Country, RepositoryError> {
        let updated = sqlx::query_as::<_, CountryRow>(
            r"
            UPDATE catalog.countries
            SET name = $2, version = version + 1
            WHERE id = $1 AND version = $3
            RETURNING id, name, version
            ",
        )
        .bind(id)
        .bind(name.as_str())
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(&e, WriteKind::Update))?;

        if updated.is_none() {
            return Err(RepositoryError::ConcurrencyConflict);
        }

        self.get_country(id)
            .await?
            .ok_or(RepositoryError::ConcurrencyConflict)
    }

    #[instrument(skip(self))]
    async fn create_state(
        &self,
        country_id: CountryId,
        name: &EntityName,
    ) -> Result<State, RepositoryError> {
        let row = sqlx::query_as::<_, StateRow>(
            r"
            INSERT INTO catalog.states (country_id, name)
            VALUES ($1, $2)
            RETURNING id, country_id, name
            ",
        )
        .bind(country_id)
        .bind(name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(&e, WriteKind::Insert))?;

        Ok(row.into_state(Vec::new()))
    }

    #[instrument(skip(self))]
    async fn update_state(
        &self,
        id: StateId,
        name: &EntityName,
    ) -> Result<State, RepositoryError> {
        let row = sqlx::query_as::<_, StateRow>(
            r"
            UPDATE catalog.states
            SET name = $2
            WHERE id = $1
            RETURNING id, country_id, name
            ",
        )
        .bind(id)
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(&e, WriteKind::Update))?
        .ok_or(RepositoryError::NotFound)?;

        let cities = self.cities_of_state(row.id).await?;
        Ok(row.into_state(cities))
    }

    #[instrument(skip(self))]
    async fn create_city(
        &self,
        state_id: StateId,
        name: &EntityName,
    ) -> Result<City, RepositoryError> {
        let row = sqlx::query_as::<_, CityRow>(
            r"
            INSERT INTO catalog.cities (state_id, name)
            VALUES ($1, $2)
            RETURNING id, state_id, name
            ",
        )
        .bind(state_id)
        .bind(name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(&e, WriteKind::Insert))?;

        Ok(City::from(row))
    }

    #[instrument(skip(self))]
    async fn update_city(&self, id: CityId, name: &EntityName) -> Result<City, RepositoryError> {
        let row = sqlx::query_as::<_, CityRow>(
            r"
            UPDATE catalog.cities
            SET name = $2
            WHERE id = $1
            RETURNING id, state_id, name
            ",
        )
        .bind(id)
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(&e, WriteKind::Update))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(City::from(row))
    }

    #[instrument(skip(self))]
    async fn delete_country(&self, id: CountryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.countries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_write_error(&e, WriteKind::Delete))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_state(&self, id: StateId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.states WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_write_error(&e, WriteKind::Delete))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_city(&self, id: CityId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.cities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_write_error(&e, WriteKind::Delete))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
