//! Seed the Country -> State -> City hierarchy from a YAML file.
//!
//! ```yaml
//! countries:
//!   - name: Colombia
//!     states:
//!       - name: Antioquia
//!         cities: [Medellín, Envigado]
//! ```
//!
//! Every record is created with a single insert through the same
//! [`HierarchyStore`] the admin uses. Records that already exist are
//! skipped, so seeding the same file twice is harmless.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use shopping_admin::db::{self, HierarchyStore, PgHierarchyRepository, RepositoryError};
use shopping_core::{CountryId, EntityName, NameError, StateId};

use super::migrate;

/// Seed file root.
#[derive(Debug, Deserialize)]
pub struct HierarchySeed {
    pub countries: Vec<CountrySeed>,
}

#[derive(Debug, Deserialize)]
pub struct CountrySeed {
    pub name: String,
    #[serde(default)]
    pub states: Vec<StateSeed>,
}

#[derive(Debug, Deserialize)]
pub struct StateSeed {
    pub name: String,
    #[serde(default)]
    pub cities: Vec<String>,
}

/// Counts reported after seeding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Invalid name {name:?}: {source}")]
    InvalidName { name: String, source: NameError },

    #[error("{name} was reported as existing but could not be found")]
    Missing { name: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Seed a hierarchy file into the admin database.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or parsed, a name is invalid, or a write fails.
pub async fn hierarchy(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading hierarchy seed");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: HierarchySeed = serde_yaml::from_str(&content)?;
    info!(countries = seed.countries.len(), "Parsed seed file");

    let database_url = migrate::database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let store = PgHierarchyRepository::new(pool);
    let summary = seed_hierarchy(&store, &seed).await?;

    info!("Seeding complete!");
    info!("  Records created: {}", summary.created);
    info!("  Records skipped (already exist): {}", summary.skipped);
    Ok(())
}

/// Create every country, state and city in `seed` that is not already
/// present.
///
/// # Errors
///
/// Stops at the first invalid name or failed write other than a duplicate.
pub async fn seed_hierarchy(
    store: &dyn HierarchyStore,
    seed: &HierarchySeed,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for country in &seed.countries {
        let country_id = ensure_country(store, &country.name, &mut summary).await?;

        for state in &country.states {
            let state_id = ensure_state(store, country_id, &state.name, &mut summary).await?;

            for city in &state.cities {
                let name = parse_name(city)?;
                match store.create_city(state_id, &name).await {
                    Ok(_) => summary.created += 1,
                    Err(RepositoryError::DuplicateName) => {
                        warn!(city = %name, "City already exists, skipping");
                        summary.skipped += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(summary)
}

async fn ensure_country(
    store: &dyn HierarchyStore,
    raw: &str,
    summary: &mut SeedSummary,
) -> Result<CountryId, SeedError> {
    let name = parse_name(raw)?;
    match store.create_country(&name).await {
        Ok(country) => {
            summary.created += 1;
            Ok(country.id)
        }
        Err(RepositoryError::DuplicateName) => {
            warn!(country = %name, "Country already exists, skipping");
            summary.skipped += 1;
            store
                .list_countries()
                .await?
                .into_iter()
                .find(|c| c.name == name.as_str())
                .map(|c| c.id)
                .ok_or_else(|| SeedError::Missing {
                    name: name.into_inner(),
                })
        }
        Err(e) => Err(e.into()),
    }
}

async fn ensure_state(
    store: &dyn HierarchyStore,
    country_id: CountryId,
    raw: &str,
    summary: &mut SeedSummary,
) -> Result<StateId, SeedError> {
    let name = parse_name(raw)?;
    match store.create_state(country_id, &name).await {
        Ok(state) => {
            summary.created += 1;
            Ok(state.id)
        }
        Err(RepositoryError::DuplicateName) => {
            warn!(state = %name, "State already exists, skipping");
            summary.skipped += 1;
            store
                .get_country(country_id)
                .await?
                .and_then(|country| {
                    country
                        .states
                        .into_iter()
                        .find(|s| s.name == name.as_str())
                })
                .map(|s| s.id)
                .ok_or_else(|| SeedError::Missing {
                    name: name.into_inner(),
                })
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_name(raw: &str) -> Result<EntityName, SeedError> {
    EntityName::parse(raw).map_err(|source| SeedError::InvalidName {
        name: raw.to_owned(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopping_admin::db::MemoryHierarchyStore;

    const SEED: &str = r"
countries:
  - name: Colombia
    states:
      - name: Antioquia
        cities: [Medellín, Envigado]
      - name: Cundinamarca
        cities: [Bogotá]
  - name: Perú
";

    #[tokio::test]
    async fn test_seed_creates_hierarchy() {
        let store = MemoryHierarchyStore::new();
        let seed: HierarchySeed = serde_yaml::from_str(SEED).unwrap();

        let summary = seed_hierarchy(&store, &seed).await.unwrap();

        assert_eq!(summary, SeedSummary { created: 7, skipped: 0 });
        let countries = store.list_countries().await.unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].states_number(), 2);
        assert_eq!(countries[0].cities_number(), 3);
    }

    #[tokio::test]
    async fn test_seed_twice_skips_existing() {
        let store = MemoryHierarchyStore::new();
        let seed: HierarchySeed = serde_yaml::from_str(SEED).unwrap();
        seed_hierarchy(&store, &seed).await.unwrap();

        let summary = seed_hierarchy(&store, &seed).await.unwrap();

        assert_eq!(summary, SeedSummary { created: 0, skipped: 7 });
        assert_eq!(store.list_countries().await.unwrap()[0].cities_number(), 3);
    }

    #[tokio::test]
    async fn test_seed_rejects_blank_name() {
        let store = MemoryHierarchyStore::new();
        let seed: HierarchySeed = serde_yaml::from_str("countries:\n  - name: '  '\n").unwrap();

        let err = seed_hierarchy(&store, &seed).await.unwrap_err();

        assert!(matches!(err, SeedError::InvalidName { .. }));
    }
}
