//! Integration tests for recipes-api endpoints
//!
//! Tests cover:
//! - Create: 201 with ingredients/instructions renumbered 1..N
//! - Validation: 400 with field-level details
//! - Fetch/update/delete of missing ids: 404
//! - Update: unmodified fields preserved, replaced arrays renumbered
//! - Delete: subsequent fetch returns 404
//! - Filters: category exact-match, query, tags, max times
//! - Notification queue: one job per mutation
//! - Health endpoint

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use recipes_api::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: in-memory database with the full schema
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should connect to in-memory database");

    recipes_common::db::create_schema(&pool)
        .await
        .expect("Should create schema");

    pool
}

async fn setup_app() -> (axum::Router, SqlitePool) {
    let db = setup_test_db().await;
    let state = AppState::new(db.clone());
    (build_router(state), db)
}

/// Test helper: request without a body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: request with a JSON body
fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn valid_recipe_body() -> Value {
    json!({
        "title": "שקשוקה",
        "description": "ארוחת בוקר ישראלית",
        "category": "MAIN",
        "prepTimeMinutes": 10,
        "cookTimeMinutes": 20,
        "servings": 2,
        "ingredients": [
            { "text": "4 ביצים" },
            { "text": "רסק עגבניות" },
            { "text": "בצל קצוץ" }
        ],
        "instructions": [
            { "text": "לטגן את הבצל" },
            { "text": "להוסיף רסק ולבשל" },
            { "text": "לשבור ביצים מעל" }
        ],
        "tags": ["מהיר", "צמחוני"],
        "createdBy": "yael@example.com"
    })
}

async fn create_recipe(app: &axum::Router, body: &Value) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/recipes", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _db) = setup_app().await;

    for uri in ["/health", "/api/health"] {
        let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["module"], "recipes-api");
        assert!(body["version"].is_string());
    }
}

// =============================================================================
// Create Tests
// =============================================================================

#[tokio::test]
async fn test_create_returns_201_with_renumbered_arrays() {
    let (app, _db) = setup_app().await;

    let body = create_recipe(&app, &valid_recipe_body()).await;

    assert!(body["id"].is_string());
    assert_eq!(body["title"], "שקשוקה");
    assert_eq!(body["category"], "MAIN");

    let ingredients = body["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 3);
    for (i, ingredient) in ingredients.iter().enumerate() {
        assert_eq!(ingredient["order"], (i as i64) + 1);
    }
    assert_eq!(ingredients[1]["text"], "רסק עגבניות");

    let instructions = body["instructions"].as_array().unwrap();
    assert_eq!(instructions.len(), 3);
    for (i, instruction) in instructions.iter().enumerate() {
        assert_eq!(instruction["step"], (i as i64) + 1);
    }

    assert_eq!(body["createdBy"], "yael@example.com");
    assert_eq!(body["lastModifiedBy"], "yael@example.com");
}

#[tokio::test]
async fn test_create_without_title_returns_400_with_field_error() {
    let (app, _db) = setup_app().await;

    let mut body = valid_recipe_body();
    body["title"] = json!("");

    let response = app
        .oneshot(json_request("POST", "/api/recipes", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Invalid input data");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
}

#[tokio::test]
async fn test_create_with_empty_lists_returns_400_with_field_errors() {
    let (app, _db) = setup_app().await;

    let mut body = valid_recipe_body();
    body["ingredients"] = json!([]);
    body["instructions"] = json!([]);

    let response = app
        .oneshot(json_request("POST", "/api/recipes", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"ingredients"));
    assert!(fields.contains(&"instructions"));
}

#[tokio::test]
async fn test_create_with_invalid_category_returns_400() {
    let (app, _db) = setup_app().await;

    let mut body = valid_recipe_body();
    body["category"] = json!("BREAKFAST");

    let response = app
        .oneshot(json_request("POST", "/api/recipes", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"category"));
}

#[tokio::test]
async fn test_create_enqueues_notification_job() {
    let (app, db) = setup_app().await;

    let body = create_recipe(&app, &valid_recipe_body()).await;

    let (operation, recipe_id, status): (String, String, String) = sqlx::query_as(
        "SELECT operation, recipe_id, status FROM notification_jobs",
    )
    .fetch_one(&db)
    .await
    .unwrap();

    assert_eq!(operation, "created");
    assert_eq!(recipe_id, body["id"].as_str().unwrap());
    assert_eq!(status, "pending");
}

// =============================================================================
// Fetch Tests
// =============================================================================

#[tokio::test]
async fn test_get_nonexistent_recipe_returns_404() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/api/recipes/no-such-id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Recipe not found");
}

#[tokio::test]
async fn test_get_recipe_by_path_and_by_query_id() {
    let (app, _db) = setup_app().await;
    let created = create_recipe(&app, &valid_recipe_body()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(test_request("GET", &format!("/api/recipes/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["id"], created["id"]);

    // compat form used by the original client
    let response = app
        .oneshot(test_request("GET", &format!("/api/recipes?id={}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["recipes"][0]["id"], created["id"]);
}

// =============================================================================
// Update Tests
// =============================================================================

#[tokio::test]
async fn test_update_preserves_unmodified_fields_and_renumbers_arrays() {
    let (app, _db) = setup_app().await;
    let created = create_recipe(&app, &valid_recipe_body()).await;
    let id = created["id"].as_str().unwrap();

    let update = json!({
        "title": "שקשוקה חריפה",
        "ingredients": [
            { "text": "4 ביצים" },
            { "text": "פלפל חריף" }
        ]
    });

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/recipes/{}", id))
        .header("content-type", "application/json")
        .header("x-user-email", "dana@example.com")
        .body(Body::from(serde_json::to_vec(&update).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["title"], "שקשוקה חריפה");

    // replaced array renumbered
    let ingredients = body["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0]["order"], 1);
    assert_eq!(ingredients[1]["order"], 2);
    assert_eq!(ingredients[1]["text"], "פלפל חריף");

    // unmodified fields preserved
    assert_eq!(body["category"], "MAIN");
    assert_eq!(body["servings"], 2);
    assert_eq!(body["instructions"].as_array().unwrap().len(), 3);
    assert_eq!(body["description"], "ארוחת בוקר ישראלית");

    // audit attribution from header
    assert_eq!(body["lastModifiedBy"], "dana@example.com");
    assert_eq!(body["createdBy"], "yael@example.com");
}

#[tokio::test]
async fn test_update_compat_requires_id_in_body() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(json_request("PUT", "/api/recipes", &json!({ "title": "חדש" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Recipe ID is required");
}

#[tokio::test]
async fn test_update_nonexistent_recipe_returns_404() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/recipes/no-such-id",
            &json!({ "title": "חדש" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_with_empty_ingredients_returns_400() {
    let (app, _db) = setup_app().await;
    let created = create_recipe(&app, &valid_recipe_body()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/recipes/{}", id),
            &json!({ "ingredients": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[tokio::test]
async fn test_delete_then_fetch_returns_404() {
    let (app, db) = setup_app().await;
    let created = create_recipe(&app, &valid_recipe_body()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/recipes/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Recipe deleted successfully");

    let response = app
        .oneshot(test_request("GET", &format!("/api/recipes/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // one job for the create, one for the delete
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notification_jobs")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_delete_compat_form_and_missing_id() {
    let (app, _db) = setup_app().await;
    let created = create_recipe(&app, &valid_recipe_body()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/api/recipes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(test_request("DELETE", &format!("/api/recipes?id={}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_nonexistent_recipe_returns_404() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(test_request("DELETE", "/api/recipes/no-such-id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Filter Tests
// =============================================================================

async fn seed_catalog(app: &axum::Router) {
    let mut soup = valid_recipe_body();
    soup["title"] = json!("מרק עדשים");
    soup["category"] = json!("SOUP");
    soup["prepTimeMinutes"] = json!(15);
    soup["cookTimeMinutes"] = json!(40);
    soup["tags"] = json!(["בריא", "טבעוני"]);
    create_recipe(app, &soup).await;

    let mut dessert = valid_recipe_body();
    dessert["title"] = json!("עוגת שוקולד");
    dessert["description"] = json!("עוגה של סבתא");
    dessert["category"] = json!("DESSERT");
    dessert["prepTimeMinutes"] = json!(25);
    dessert["cookTimeMinutes"] = json!(35);
    dessert["tags"] = json!(["אפייה", "מתכון משפחתי"]);
    create_recipe(app, &dessert).await;
}

#[tokio::test]
async fn test_category_filter_exact_match_only() {
    let (app, _db) = setup_app().await;
    seed_catalog(&app).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/recipes?category=SOUP"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["recipes"][0]["title"], "מרק עדשים");

    // no seeded recipe is a SNACK
    let response = app
        .oneshot(test_request("GET", "/api/recipes?category=SNACK"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn test_query_filter_searches_title_and_description() {
    let (app, _db) = setup_app().await;
    seed_catalog(&app).await;

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            "/api/recipes?query=%D7%A1%D7%91%D7%AA%D7%90", // "סבתא"
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["recipes"][0]["title"], "עוגת שוקולד");
}

#[tokio::test]
async fn test_tags_filter_matches_any() {
    let (app, _db) = setup_app().await;
    seed_catalog(&app).await;

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/recipes?tags=%D7%98%D7%91%D7%A2%D7%95%D7%A0%D7%99,%D7%9B%D7%A9%D7%A8", // "טבעוני,כשר"
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["recipes"][0]["title"], "מרק עדשים");
}

#[tokio::test]
async fn test_max_time_filters() {
    let (app, _db) = setup_app().await;
    seed_catalog(&app).await;

    // soup: prep 15 / cook 40, dessert: prep 25 / cook 35
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/recipes?maxPrepTime=20&maxCookTime=45"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["recipes"][0]["title"], "מרק עדשים");

    let response = app
        .oneshot(test_request("GET", "/api/recipes?maxCookTime=10"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn test_invalid_category_filter_returns_400() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/api/recipes?category=BRUNCH"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// UI Tests
// =============================================================================

#[tokio::test]
async fn test_ui_is_served_rtl() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("dir=\"rtl\""));
    // add-recipe form ships alongside the browse view
    assert!(html.contains("id=\"editor\""));

    let response = app
        .oneshot(test_request("GET", "/static/app.js"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
