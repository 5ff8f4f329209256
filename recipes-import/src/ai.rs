//! AI-assisted recipe parsing
//!
//! Sends raw document text to an OpenAI-compatible chat-completions
//! endpoint and deserializes the model's JSON answer into a recipe
//! payload. The rule-based parser stays the default path; this one is
//! for documents whose layout the heuristics cannot handle.

use recipes_common::model::NewRecipe;
use recipes_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Placeholder servings for migrated documents, same sentinel the
/// rule-based parser uses
const MIGRATED_SERVINGS: i64 = 999;
const MIGRATED_AUTHOR: &str = "מתכון מדוגמה";

/// Chat-completions request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for AI-assisted parsing
pub struct AiParser {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AiParser {
    /// Build a parser from `AI_API_URL`, `AI_API_KEY` and `AI_MODEL`.
    /// The key is required; URL and model have defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("AI_API_KEY")
            .map_err(|_| Error::Config("AI_API_KEY is required for AI parsing".to_string()))?;
        let api_url =
            std::env::var("AI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url,
            api_key,
            model,
        })
    }

    /// Parse raw document text through the model. `source_path` gives
    /// the model a filename hint for the title fallback.
    pub async fn parse_recipe_text(&self, text: &str, source_path: &Path) -> Result<NewRecipe> {
        let filename = source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
            .unwrap_or_default();

        info!("Sending {} to AI parser (model {})", source_path.display(), self.model);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(text, &filename),
            }],
            temperature: 0.0,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("AI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "AI endpoint returned {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("Malformed AI response: {}", e)))?;

        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| Error::Internal("AI response contained no choices".to_string()))?;

        debug!("AI response: {}", content);

        let mut recipe: NewRecipe = serde_json::from_str(strip_code_fences(content))
            .map_err(|e| Error::InvalidInput(format!("AI returned unparseable JSON: {}", e)))?;

        // system fields the model never controls
        recipe.servings = MIGRATED_SERVINGS;
        recipe.created_by = MIGRATED_AUTHOR.to_string();
        if recipe.title.trim().is_empty() {
            recipe.title = filename;
        }

        Ok(recipe)
    }
}

/// Models often wrap JSON in a markdown code fence despite being told
/// not to
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn build_prompt(text: &str, filename: &str) -> String {
    format!(
        "You are an expert Hebrew recipe parser. Analyze this Hebrew recipe text and \
extract structured information.

RECIPE TEXT:
{text}

FILENAME: {filename}

Return a JSON object with this structure:
{{
  \"title\": \"Recipe title in Hebrew\",
  \"description\": \"Full description/story if present\",
  \"category\": \"MAIN|SIDE|DESSERT\",
  \"prepTimeMinutes\": number,
  \"cookTimeMinutes\": number,
  \"ingredients\": [{{\"text\": \"ingredient text in Hebrew\"}}],
  \"instructions\": [{{\"text\": \"instruction text in Hebrew\"}}],
  \"tags\": [\"tag1\", \"tag2\"]
}}

PARSING GUIDELINES:
1. TITLE: usually the first prominent line
2. DESCRIPTION: capture personal stories or background in full, do not summarize
3. CATEGORY: MAIN for main dishes (עיקרית, בשר, עוף, דג), SIDE for sides and salads \
(תוספת, סלט, ירקות), DESSERT for desserts (קינוח, עוגה, מתוק)
4. TIMES: convert hours to minutes; defaults for missing times are prep 30, cook 45
5. INGREDIENTS: list every item from the ingredients section (רכיבים, חומרים, מצרכים)
6. INSTRUCTIONS: list every step from the instructions section (הוראות, הכנה, אופן הכנה)
7. TAGS: relevant tags such as פרווה, בשרי, חלבי, צמחוני, בריא, מהיר

IMPORTANT:
- Preserve ALL Hebrew text exactly as written
- If the title is unclear, use the filename as fallback
- Return ONLY the JSON object, no additional text"
    )
}
