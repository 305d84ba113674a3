//! `PgHierarchyRepository` and `ProductRepository` against a real database.
//!
//! These tests require a reachable `PostgreSQL` database
//! (`ADMIN_DATABASE_URL`). Migrations are applied on connect.
//!
//! Run with: cargo test -p shopping-integration-tests -- --ignored

use sqlx::PgPool;
use uuid::Uuid;

use shopping_admin::db::{
    self, HierarchyStore, PgHierarchyRepository, ProductRepository, RepositoryError,
};
use shopping_core::{EntityName, ImageId, ProductId};
use shopping_integration_tests::database_url;

async fn pool() -> PgPool {
    let pool = db::create_pool(&database_url())
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A name no other run has used.
fn unique(prefix: &str) -> EntityName {
    let suffix = Uuid::new_v4().simple().to_string();
    EntityName::parse(&format!("{prefix} {}", &suffix[..12])).expect("valid name")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_hierarchy_round_trip() {
    let store = PgHierarchyRepository::new(pool().await);
    let country = store.create_country(&unique("País")).await.expect("create country");
    assert_eq!(country.version, 0);

    let state = store
        .create_state(country.id, &unique("Estado"))
        .await
        .expect("create state");
    let city = store
        .create_city(state.id, &unique("Ciudad"))
        .await
        .expect("create city");

    let details = store
        .get_city(city.id)
        .await
        .expect("get city")
        .expect("city exists");
    assert_eq!(details.state.id, state.id);
    assert_eq!(details.state.country_id, country.id);

    let listed = store
        .get_country(country.id)
        .await
        .expect("get country")
        .expect("country exists");
    assert_eq!(listed.states_number(), 1);
    assert_eq!(listed.cities_number(), 1);

    store.delete_city(city.id).await.expect("delete city");
    store.delete_state(state.id).await.expect("delete state");
    store.delete_country(country.id).await.expect("delete country");
    assert!(store.get_country(country.id).await.expect("get").is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_constraints_are_classified() {
    let store = PgHierarchyRepository::new(pool().await);
    let name = unique("País");
    let country = store.create_country(&name).await.expect("create country");
    let state = store
        .create_state(country.id, &unique("Estado"))
        .await
        .expect("create state");

    let duplicate = store.create_country(&name).await;
    assert_eq!(duplicate.expect_err("duplicate accepted"), RepositoryError::DuplicateName);

    let restricted = store.delete_country(country.id).await;
    assert_eq!(restricted.expect_err("delete succeeded"), RepositoryError::HasDependents);

    let stale = store.update_country(country.id, &unique("País"), 7).await;
    assert_eq!(stale.expect_err("stale accepted"), RepositoryError::ConcurrencyConflict);

    let renamed = store
        .update_country(country.id, &unique("País"), country.version)
        .await
        .expect("rename");
    assert_eq!(renamed.version, country.version + 1);

    store.delete_state(state.id).await.expect("delete state");
    store.delete_country(country.id).await.expect("delete country");
    let missing = store.delete_country(country.id).await;
    assert_eq!(missing.expect_err("double delete"), RepositoryError::NotFound);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_product_images() {
    let pool = pool().await;
    let product_id: i32 = sqlx::query_scalar(
        "INSERT INTO catalog.products (name, price, stock) VALUES ($1, 19.99, 3) RETURNING id",
    )
    .bind(unique("Producto").as_str())
    .fetch_one(&pool)
    .await
    .expect("insert product");
    let product_id = ProductId::new(product_id);

    let products = ProductRepository::new(pool);
    let product = products
        .get_product(product_id)
        .await
        .expect("get product")
        .expect("product exists");
    assert_eq!(product.price.display(), "COP 19.99");

    let image = products
        .add_image(product_id, ImageId::new(Uuid::new_v4()))
        .await
        .expect("add image");
    assert_eq!(products.list_images(product_id).await.expect("list").len(), 1);

    products.delete_image(image.id).await.expect("delete image");
    assert!(products.list_images(product_id).await.expect("list").is_empty());
}
