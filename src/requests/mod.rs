//! Request builders for every RecipeBook operation.
//!
//! When API routes or request formats change, update only this module.

use crate::client::ApiRequest;
use reqwest::Method;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
pub struct IngredientBody {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructionBody {
    pub step: String,
}

/// Body for recipe create/update. `category` holds the id of the referenced
/// category; the server expands it into a `{_id, name}` object on the way
/// back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeBody {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<IngredientBody>,
    pub instructions: Vec<InstructionBody>,
    pub cooking_time: u32,
    pub servings: u32,
    pub category: String,
}

pub mod user {
    use super::*;

    /// POST /user/login
    pub fn login(email: &str, password: &str) -> ApiRequest {
        ApiRequest::new(Method::POST, "/user/login").json(&json!({
            "email": email,
            "password": password,
        }))
    }
}

pub mod recipe {
    use super::*;

    /// GET /recipe
    pub fn list() -> ApiRequest {
        ApiRequest::new(Method::GET, "/recipe")
    }

    /// GET /recipe/{id}
    pub fn get(id: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, "/recipe/{id}").path_param("id", id)
    }

    /// POST /recipe
    pub fn create(token: &str, body: &RecipeBody) -> ApiRequest {
        ApiRequest::new(Method::POST, "/recipe")
            .bearer(token)
            .json(body)
    }

    /// PUT /recipe/{id}
    pub fn update(token: &str, id: &str, body: &RecipeBody) -> ApiRequest {
        ApiRequest::new(Method::PUT, "/recipe/{id}")
            .path_param("id", id)
            .bearer(token)
            .json(body)
    }

    /// DELETE /recipe/{id}
    pub fn delete(token: &str, id: &str) -> ApiRequest {
        ApiRequest::new(Method::DELETE, "/recipe/{id}")
            .path_param("id", id)
            .bearer(token)
    }
}

pub mod category {
    use super::*;

    /// GET /category
    pub fn list() -> ApiRequest {
        ApiRequest::new(Method::GET, "/category")
    }

    /// GET /category/{id}
    pub fn get(id: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, "/category/{id}").path_param("id", id)
    }

    /// POST /category
    pub fn create(token: &str, name: &str) -> ApiRequest {
        ApiRequest::new(Method::POST, "/category")
            .bearer(token)
            .json(&json!({ "name": name }))
    }

    /// PUT /category/{id}
    pub fn update(token: &str, id: &str, name: &str) -> ApiRequest {
        ApiRequest::new(Method::PUT, "/category/{id}")
            .path_param("id", id)
            .bearer(token)
            .json(&json!({ "name": name }))
    }

    /// DELETE /category/{id}
    pub fn delete(token: &str, id: &str) -> ApiRequest {
        ApiRequest::new(Method::DELETE, "/category/{id}")
            .path_param("id", id)
            .bearer(token)
    }
}
