//! In-process mock RecipeBook server for end-to-end tests.
//!
//! Implements the external API contract the harness is written against,
//! including its unusual "not found" encoding: a success status with a
//! literal `null` body, for both recipes and categories. Each test gets an
//! isolated server on a random port with its own in-memory store.

use super::constants::*;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Clone, Default)]
struct AppState {
    store: Arc<Mutex<Store>>,
}

#[derive(Default)]
struct Store {
    recipes: Vec<Value>,
    categories: Vec<Value>,
    tokens: Vec<String>,
}

impl AppState {
    /// Store with the golden recipe and its category seeded.
    fn seeded() -> Self {
        let state = Self::default();
        {
            let mut store = state.store.lock().unwrap();
            store.categories.push(json!({
                "_id": SEEDED_CATEGORY_ID,
                "name": SEEDED_CATEGORY_NAME,
            }));
            store.recipes.push(golden_recipe());
        }
        state
    }

    /// Store with the seeded category but no recipes at all.
    fn without_recipes() -> Self {
        let state = Self::default();
        {
            let mut store = state.store.lock().unwrap();
            store.categories.push(json!({
                "_id": SEEDED_CATEGORY_ID,
                "name": SEEDED_CATEGORY_NAME,
            }));
        }
        state
    }
}

/// The seeded recipe the harness's golden-data checks run against:
/// 9 ingredients, 7 instructions, cookingTime 25, servings 24.
fn golden_recipe() -> Value {
    json!({
        "_id": GOLDEN_RECIPE_ID,
        "title": GOLDEN_RECIPE_TITLE,
        "description": GOLDEN_RECIPE_DESCRIPTION,
        "ingredients": [
            { "name": "all-purpose flour", "quantity": "2 1/4 cups" },
            { "name": "baking soda", "quantity": "1 tsp" },
            { "name": "salt", "quantity": "1 tsp" },
            { "name": "butter", "quantity": "1 cup" },
            { "name": "white sugar", "quantity": "3/4 cup" },
            { "name": "brown sugar", "quantity": "3/4 cup" },
            { "name": "eggs", "quantity": "2" },
            { "name": "vanilla extract", "quantity": "2 tsp" },
            { "name": "chocolate chips", "quantity": "2 cups" }
        ],
        "instructions": [
            { "step": "Preheat the oven to 375F." },
            { "step": "Cream together the butter and both sugars." },
            { "step": "Beat in the eggs and vanilla." },
            { "step": "Whisk the flour, baking soda and salt, then mix in." },
            { "step": "Fold in the chocolate chips." },
            { "step": "Drop rounded spoonfuls onto a baking sheet." },
            { "step": "Bake for 9 to 11 minutes, then cool." }
        ],
        "cookingTime": 25,
        "servings": 24,
        "category": { "_id": SEEDED_CATEGORY_ID, "name": SEEDED_CATEGORY_NAME },
    })
}

fn make_app(state: AppState) -> Router {
    Router::new()
        .route("/user/login", post(login))
        .route("/recipe", get(list_recipes).post(create_recipe))
        .route(
            "/recipe/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/category", get(list_categories).post(create_category))
        .route(
            "/category/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .with_state(state)
}

// ============================================================================
// Auth
// ============================================================================

async fn login(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);

    if email == Some(TEST_EMAIL) && password == Some(TEST_PASSWORD) {
        let token = Uuid::new_v4().to_string();
        let mut store = state.store.lock().unwrap();
        store.tokens.push(token.clone());
        Json(json!({ "token": token })).into_response()
    } else {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn require_auth(headers: &HeaderMap, store: &Store) -> Result<(), Response> {
    match bearer_token(headers) {
        Some(token) if store.tokens.iter().any(|t| t == token) => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Missing or invalid token" })),
        )
            .into_response()),
    }
}

fn find_by_id<'a>(items: &'a [Value], id: &str) -> Option<&'a Value> {
    items
        .iter()
        .find(|item| item.get("_id").and_then(Value::as_str) == Some(id))
}

fn position_by_id(items: &[Value], id: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.get("_id").and_then(Value::as_str) == Some(id))
}

// ============================================================================
// Recipes
// ============================================================================

async fn list_recipes(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.lock().unwrap();
    Json(Value::Array(store.recipes.clone()))
}

async fn get_recipe(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let store = state.store.lock().unwrap();
    // Missing entities are served as a 200 with a literal null body.
    Json(find_by_id(&store.recipes, &id).cloned().unwrap_or(Value::Null))
}

async fn create_recipe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = state.store.lock().unwrap();
    if let Err(response) = require_auth(&headers, &store) {
        return response;
    }

    let recipe = match materialize_recipe(&store, &body, Uuid::new_v4().to_string()) {
        Ok(recipe) => recipe,
        Err(response) => return response,
    };
    store.recipes.push(recipe.clone());
    Json(recipe).into_response()
}

async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = state.store.lock().unwrap();
    if let Err(response) = require_auth(&headers, &store) {
        return response;
    }

    let Some(pos) = position_by_id(&store.recipes, &id) else {
        return Json(Value::Null).into_response();
    };
    let updated = match materialize_recipe(&store, &body, id) {
        Ok(recipe) => recipe,
        Err(response) => return response,
    };
    store.recipes[pos] = updated.clone();
    Json(updated).into_response()
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut store = state.store.lock().unwrap();
    if let Err(response) = require_auth(&headers, &store) {
        return response;
    }

    match position_by_id(&store.recipes, &id) {
        Some(pos) => Json(store.recipes.remove(pos)).into_response(),
        None => Json(Value::Null).into_response(),
    }
}

/// Builds the stored representation of a recipe: the submitted fields plus
/// the server-assigned id, with the category reference expanded into the
/// full `{_id, name}` object.
fn materialize_recipe(store: &Store, body: &Value, id: String) -> Result<Value, Response> {
    let category_id = body.get("category").and_then(Value::as_str).unwrap_or("");
    let category = find_by_id(&store.categories, category_id)
        .cloned()
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Unknown category" })),
            )
                .into_response()
        })?;

    Ok(json!({
        "_id": id,
        "title": body.get("title").cloned().unwrap_or(Value::Null),
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "ingredients": body.get("ingredients").cloned().unwrap_or(Value::Null),
        "instructions": body.get("instructions").cloned().unwrap_or(Value::Null),
        "cookingTime": body.get("cookingTime").cloned().unwrap_or(Value::Null),
        "servings": body.get("servings").cloned().unwrap_or(Value::Null),
        "category": category,
    }))
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.lock().unwrap();
    Json(Value::Array(store.categories.clone()))
}

async fn get_category(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let store = state.store.lock().unwrap();
    Json(
        find_by_id(&store.categories, &id)
            .cloned()
            .unwrap_or(Value::Null),
    )
}

async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = state.store.lock().unwrap();
    if let Err(response) = require_auth(&headers, &store) {
        return response;
    }

    let category = json!({
        "_id": Uuid::new_v4().to_string(),
        "name": body.get("name").cloned().unwrap_or(Value::Null),
    });
    store.categories.push(category.clone());
    Json(category).into_response()
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = state.store.lock().unwrap();
    if let Err(response) = require_auth(&headers, &store) {
        return response;
    }

    let Some(pos) = position_by_id(&store.categories, &id) else {
        return Json(Value::Null).into_response();
    };
    store.categories[pos]["name"] = body.get("name").cloned().unwrap_or(Value::Null);
    Json(store.categories[pos].clone()).into_response()
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut store = state.store.lock().unwrap();
    if let Err(response) = require_auth(&headers, &store) {
        return response;
    }

    match position_by_id(&store.categories, &id) {
        Some(pos) => Json(store.categories.remove(pos)).into_response(),
        None => Json(Value::Null).into_response(),
    }
}

// ============================================================================
// Server lifecycle
// ============================================================================

/// Mock server instance with an isolated in-memory store.
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server seeded with the golden recipe and its category.
    pub async fn spawn() -> Self {
        Self::spawn_with(AppState::seeded()).await
    }

    /// Spawns a server whose recipe collection starts out empty.
    pub async fn spawn_without_recipes() -> Self {
        Self::spawn_with(AppState::without_recipes()).await
    }

    async fn spawn_with(state: AppState) -> Self {
        let app = make_app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Waits for the server to become ready by polling the recipe listing.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/recipe", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
