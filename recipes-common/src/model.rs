//! Recipe domain model and validation
//!
//! Wire shape (camelCase field names, SCREAMING category values) matches
//! the JSON the web client has always exchanged, so existing saved
//! recipes and the browse UI keep working unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Recipe category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Appetizer,
    Soup,
    Main,
    Side,
    Dessert,
    Beverage,
    Snack,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Appetizer => "APPETIZER",
            Category::Soup => "SOUP",
            Category::Main => "MAIN",
            Category::Side => "SIDE",
            Category::Dessert => "DESSERT",
            Category::Beverage => "BEVERAGE",
            Category::Snack => "SNACK",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "APPETIZER" => Ok(Category::Appetizer),
            "SOUP" => Ok(Category::Soup),
            "MAIN" => Ok(Category::Main),
            "SIDE" => Ok(Category::Side),
            "DESSERT" => Ok(Category::Dessert),
            "BEVERAGE" => Ok(Category::Beverage),
            "SNACK" => Ok(Category::Snack),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingredient line; `order` is 1-based and assigned by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub order: i64,
    pub text: String,
}

/// One instruction step; `step` is 1-based and assigned by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub step: i64,
    pub text: String,
}

/// A stored recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    pub prep_time_minutes: i64,
    pub cook_time_minutes: i64,
    pub servings: i64,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub tags: Vec<String>,
    pub created_by: String,
    pub last_modified_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingredient line as submitted (order is assigned server-side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientInput {
    #[serde(default)]
    pub text: String,
}

/// Instruction step as submitted (step number is assigned server-side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionInput {
    #[serde(default)]
    pub text: String,
}

/// Create-recipe payload. Scalar fields default so that missing fields
/// surface as field-level validation errors rather than parse failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub prep_time_minutes: i64,
    #[serde(default)]
    pub cook_time_minutes: i64,
    #[serde(default = "default_servings")]
    pub servings: i64,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
    #[serde(default)]
    pub instructions: Vec<InstructionInput>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_by: String,
}

fn default_servings() -> i64 {
    1
}

/// Partial update payload; omitted fields are preserved.
/// Supplied ingredient/instruction arrays fully replace and are renumbered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpdate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub prep_time_minutes: Option<i64>,
    #[serde(default)]
    pub cook_time_minutes: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientInput>>,
    #[serde(default)]
    pub instructions: Option<Vec<InstructionInput>>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
}

/// Search filters for recipe listing
#[derive(Debug, Clone, Default)]
pub struct RecipeFilters {
    /// Case-insensitive substring over title and description
    pub query: Option<String>,
    /// Exact category match
    pub category: Option<Category>,
    /// Any-match over the recipe tag set
    pub tags: Vec<String>,
    pub max_prep_time: Option<i64>,
    pub max_cook_time: Option<i64>,
}

/// One field-level validation failure, surfaced in 400 responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl NewRecipe {
    /// Validate the payload, collecting every field failure.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }

        if self.category.trim().is_empty() {
            errors.push(FieldError::new("category", "Category is required"));
        } else if Category::from_str(self.category.trim()).is_err() {
            errors.push(FieldError::new(
                "category",
                &format!("Unknown category: {}", self.category.trim()),
            ));
        }

        if self.prep_time_minutes < 0 {
            errors.push(FieldError::new("prepTimeMinutes", "Prep time cannot be negative"));
        }
        if self.cook_time_minutes < 0 {
            errors.push(FieldError::new("cookTimeMinutes", "Cook time cannot be negative"));
        }
        if self.servings < 1 {
            errors.push(FieldError::new("servings", "Servings must be at least 1"));
        }

        if self.ingredients.is_empty() {
            errors.push(FieldError::new("ingredients", "At least one ingredient is required"));
        } else if self.ingredients.iter().any(|i| i.text.trim().is_empty()) {
            errors.push(FieldError::new("ingredients", "Ingredient text cannot be empty"));
        }

        if self.instructions.is_empty() {
            errors.push(FieldError::new("instructions", "At least one instruction is required"));
        } else if self.instructions.iter().any(|i| i.text.trim().is_empty()) {
            errors.push(FieldError::new("instructions", "Instruction text cannot be empty"));
        }

        if self.created_by.trim().is_empty() {
            errors.push(FieldError::new("createdBy", "Creator name is required"));
        }

        errors
    }

    /// Build the stored recipe: assign id and timestamps, renumber the
    /// ingredient and instruction arrays 1..N in submission order.
    ///
    /// Callers must have run `validate` first; an unknown category here
    /// falls back to MAIN rather than panicking.
    pub fn into_recipe(self, now: DateTime<Utc>) -> Recipe {
        let category = Category::from_str(self.category.trim()).unwrap_or(Category::Main);
        Recipe {
            id: Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            description: normalize_opt(self.description),
            category,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            ingredients: renumber_ingredients(self.ingredients),
            instructions: renumber_instructions(self.instructions),
            photo_url: normalize_opt(self.photo_url),
            tags: self.tags,
            created_by: self.created_by.trim().to_string(),
            last_modified_by: self.created_by.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl RecipeUpdate {
    /// Validate the fields that are present.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                errors.push(FieldError::new("title", "Title cannot be empty"));
            }
        }
        if let Some(category) = &self.category {
            if Category::from_str(category.trim()).is_err() {
                errors.push(FieldError::new(
                    "category",
                    &format!("Unknown category: {}", category.trim()),
                ));
            }
        }
        if matches!(self.prep_time_minutes, Some(t) if t < 0) {
            errors.push(FieldError::new("prepTimeMinutes", "Prep time cannot be negative"));
        }
        if matches!(self.cook_time_minutes, Some(t) if t < 0) {
            errors.push(FieldError::new("cookTimeMinutes", "Cook time cannot be negative"));
        }
        if matches!(self.servings, Some(s) if s < 1) {
            errors.push(FieldError::new("servings", "Servings must be at least 1"));
        }
        if let Some(ingredients) = &self.ingredients {
            if ingredients.is_empty() {
                errors.push(FieldError::new("ingredients", "At least one ingredient is required"));
            } else if ingredients.iter().any(|i| i.text.trim().is_empty()) {
                errors.push(FieldError::new("ingredients", "Ingredient text cannot be empty"));
            }
        }
        if let Some(instructions) = &self.instructions {
            if instructions.is_empty() {
                errors.push(FieldError::new("instructions", "At least one instruction is required"));
            } else if instructions.iter().any(|i| i.text.trim().is_empty()) {
                errors.push(FieldError::new("instructions", "Instruction text cannot be empty"));
            }
        }

        errors
    }

    /// Apply the update to an existing recipe: unmodified fields are
    /// preserved, replaced arrays are renumbered, audit fields advance.
    pub fn apply(self, recipe: &mut Recipe, actor: &str, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            recipe.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            recipe.description = normalize_opt(Some(description));
        }
        if let Some(category) = self.category {
            if let Ok(category) = Category::from_str(category.trim()) {
                recipe.category = category;
            }
        }
        if let Some(prep) = self.prep_time_minutes {
            recipe.prep_time_minutes = prep;
        }
        if let Some(cook) = self.cook_time_minutes {
            recipe.cook_time_minutes = cook;
        }
        if let Some(servings) = self.servings {
            recipe.servings = servings;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = renumber_ingredients(ingredients);
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = renumber_instructions(instructions);
        }
        if let Some(photo_url) = self.photo_url {
            recipe.photo_url = normalize_opt(Some(photo_url));
        }
        if let Some(tags) = self.tags {
            recipe.tags = tags;
        }
        recipe.last_modified_by = actor.to_string();
        recipe.updated_at = now;
    }
}

fn renumber_ingredients(inputs: Vec<IngredientInput>) -> Vec<Ingredient> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| Ingredient {
            order: i as i64 + 1,
            text: input.text.trim().to_string(),
        })
        .collect()
}

fn renumber_instructions(inputs: Vec<InstructionInput>) -> Vec<Instruction> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| Instruction {
            step: i as i64 + 1,
            text: input.text.trim().to_string(),
        })
        .collect()
}

fn normalize_opt(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
