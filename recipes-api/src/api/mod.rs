//! HTTP API handlers for recipes-api

pub mod health;
pub mod recipes;
pub mod ui;

pub use health::{health_check, health_routes};
pub use recipes::{
    create_recipe, delete_recipe, delete_recipe_compat, get_recipe, list_recipes, update_recipe,
    update_recipe_compat,
};
pub use ui::{serve_app_js, serve_index};
