//! Recipe store: the single code path every mutation goes through,
//! whether it originates from the HTTP handlers or the migration CLI.

use crate::model::{Category, Ingredient, Instruction, Recipe, RecipeFilters};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use std::str::FromStr;

/// Insert a recipe. The caller has already validated and renumbered it
/// via the model layer.
pub async fn insert_recipe(pool: &SqlitePool, recipe: &Recipe) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recipes (
            id, title, description, category,
            prep_time_minutes, cook_time_minutes, servings,
            ingredients, instructions, photo_url, tags,
            created_by, last_modified_by, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&recipe.id)
    .bind(&recipe.title)
    .bind(&recipe.description)
    .bind(recipe.category.as_str())
    .bind(recipe.prep_time_minutes)
    .bind(recipe.cook_time_minutes)
    .bind(recipe.servings)
    .bind(serde_json::to_string(&recipe.ingredients)?)
    .bind(serde_json::to_string(&recipe.instructions)?)
    .bind(&recipe.photo_url)
    .bind(serde_json::to_string(&recipe.tags)?)
    .bind(&recipe.created_by)
    .bind(&recipe.last_modified_by)
    .bind(recipe.created_at.to_rfc3339())
    .bind(recipe.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a single recipe by id
pub async fn fetch_recipe(pool: &SqlitePool, id: &str) -> Result<Recipe> {
    let row = sqlx::query("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => recipe_from_row(&row),
        None => Err(Error::NotFound(format!("Recipe not found: {}", id))),
    }
}

/// Search recipes, newest first.
///
/// Query/category/time filters are pushed into SQL with bound
/// parameters; the tags any-match filter runs over the decoded JSON
/// because SQLite has no native JSON-array membership operator worth
/// the contortion at this data size.
pub async fn search_recipes(pool: &SqlitePool, filters: &RecipeFilters) -> Result<Vec<Recipe>> {
    let mut builder = QueryBuilder::new("SELECT * FROM recipes WHERE 1=1");

    if let Some(query) = &filters.query {
        let pattern = format!("%{}%", query.to_lowercase());
        builder.push(" AND (LOWER(title) LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR LOWER(COALESCE(description, '')) LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(category) = filters.category {
        builder.push(" AND category = ");
        builder.push_bind(category.as_str());
    }

    if let Some(max_prep) = filters.max_prep_time {
        builder.push(" AND prep_time_minutes <= ");
        builder.push_bind(max_prep);
    }

    if let Some(max_cook) = filters.max_cook_time {
        builder.push(" AND cook_time_minutes <= ");
        builder.push_bind(max_cook);
    }

    builder.push(" ORDER BY created_at DESC");

    let rows = builder.build().fetch_all(pool).await?;

    let mut recipes = Vec::with_capacity(rows.len());
    for row in &rows {
        recipes.push(recipe_from_row(row)?);
    }

    if !filters.tags.is_empty() {
        recipes.retain(|recipe| {
            filters
                .tags
                .iter()
                .any(|wanted| recipe.tags.iter().any(|tag| tag == wanted))
        });
    }

    Ok(recipes)
}

/// Overwrite a stored recipe with its updated state
pub async fn update_recipe(pool: &SqlitePool, recipe: &Recipe) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE recipes SET
            title = ?, description = ?, category = ?,
            prep_time_minutes = ?, cook_time_minutes = ?, servings = ?,
            ingredients = ?, instructions = ?, photo_url = ?, tags = ?,
            last_modified_by = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&recipe.title)
    .bind(&recipe.description)
    .bind(recipe.category.as_str())
    .bind(recipe.prep_time_minutes)
    .bind(recipe.cook_time_minutes)
    .bind(recipe.servings)
    .bind(serde_json::to_string(&recipe.ingredients)?)
    .bind(serde_json::to_string(&recipe.instructions)?)
    .bind(&recipe.photo_url)
    .bind(serde_json::to_string(&recipe.tags)?)
    .bind(&recipe.last_modified_by)
    .bind(recipe.updated_at.to_rfc3339())
    .bind(&recipe.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Recipe not found: {}", recipe.id)));
    }
    Ok(())
}

/// Delete a recipe by id
pub async fn delete_recipe(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Recipe not found: {}", id)));
    }
    Ok(())
}

fn recipe_from_row(row: &SqliteRow) -> Result<Recipe> {
    let category_raw: String = row.try_get("category")?;
    let category = Category::from_str(&category_raw).map_err(Error::Internal)?;

    let ingredients: Vec<Ingredient> =
        serde_json::from_str(&row.try_get::<String, _>("ingredients")?)?;
    let instructions: Vec<Instruction> =
        serde_json::from_str(&row.try_get::<String, _>("instructions")?)?;
    let tags: Vec<String> = serde_json::from_str(&row.try_get::<String, _>("tags")?)?;

    Ok(Recipe {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category,
        prep_time_minutes: row.try_get("prep_time_minutes")?,
        cook_time_minutes: row.try_get("cook_time_minutes")?,
        servings: row.try_get("servings")?,
        ingredients,
        instructions,
        photo_url: row.try_get("photo_url")?,
        tags,
        created_by: row.try_get("created_by")?,
        last_modified_by: row.try_get("last_modified_by")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Bad timestamp in database: {} ({})", raw, e)))
}
