//! HTTP round trips against a running admin.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`shop-cli migrate`)
//! - The admin server running (cargo run -p shopping-admin)
//! - `ADMIN_SESSION_COOKIE` holding a session id signed in by the auth
//!   service
//!
//! Run with: cargo test -p shopping-integration-tests -- --ignored

use reqwest::{Client, StatusCode, redirect::Policy};
use serde_json::Value;
use uuid::Uuid;

use shopping_integration_tests::admin_base_url;

/// Client carrying the shared session cookie. Redirects are not followed so
/// 303s can be asserted on.
fn authenticated_client() -> Client {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Ok(session) = std::env::var("ADMIN_SESSION_COOKIE") {
        let cookie = format!("shopping_admin_session={session}");
        headers.insert(
            reqwest::header::COOKIE,
            cookie.parse().expect("valid cookie header"),
        );
    }
    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

fn unique_name() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("Prueba {}", &suffix[..12])
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_health() {
    let resp = Client::new()
        .get(format!("{}/health", admin_base_url()))
        .send()
        .await
        .expect("Failed to call health");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_catalog_requires_session() {
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client");

    let resp = client
        .get(format!("{}/Countries", admin_base_url()))
        .send()
        .await
        .expect("Failed to get countries");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/auth/login");
}

// ============================================================================
// Countries
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and a signed-in session"]
async fn test_create_and_delete_country() {
    let client = authenticated_client();
    let base_url = admin_base_url();
    let name = unique_name();

    let resp = client
        .post(format!("{base_url}/Countries/AddOrEdit"))
        .header("referer", format!("{base_url}/Countries"))
        .form(&[("id", "0"), ("version", "0"), ("name", name.as_str())])
        .send()
        .await
        .expect("Failed to create country");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["isValid"], true);
    assert!(body["html"].as_str().expect("html").contains(&name));

    let resp = client
        .post(format!("{base_url}/Countries/AddOrEdit"))
        .header("referer", format!("{base_url}/Countries"))
        .form(&[("id", "0"), ("version", "0"), ("name", name.as_str())])
        .send()
        .await
        .expect("Failed to submit duplicate");
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["isValid"], false);

    let page = client
        .get(format!("{base_url}/Countries"))
        .send()
        .await
        .expect("Failed to get countries")
        .text()
        .await
        .expect("body");
    let id = country_id_for(&page, &name).expect("country row in page");

    let resp = client
        .post(format!("{base_url}/Countries/Delete/{id}"))
        .header("referer", format!("{base_url}/Countries"))
        .send()
        .await
        .expect("Failed to delete country");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers()["location"].to_str().expect("location");
    assert!(location.starts_with("/Countries?level=info"));
}

#[tokio::test]
#[ignore = "Requires running admin server and a signed-in session"]
async fn test_form_requires_referer() {
    let client = authenticated_client();

    let resp = client
        .get(format!("{}/Countries/AddOrEdit", admin_base_url()))
        .send()
        .await
        .expect("Failed to get form");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/Countries");
}

/// Find the ID in the first `/Countries/Details/{id}` link after `name`.
fn country_id_for(page: &str, name: &str) -> Option<i32> {
    let link = "/Countries/Details/";
    let row = page.get(page.find(name)?..)?;
    let rest = row.get(row.find(link)? + link.len()..)?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
