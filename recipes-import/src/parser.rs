//! Rule-based Hebrew recipe parser
//!
//! Heuristic keyword matching over the fixed Hebrew section headers the
//! family documents actually use. A line "enters" a section when it
//! contains one of that section's keywords; content lines are cleaned
//! of bullet/number prefixes. Anything the heuristics miss falls back
//! to a default rather than failing the document.

use once_cell::sync::Lazy;
use recipes_common::model::{IngredientInput, InstructionInput, NewRecipe};
use recipes_common::{Error, Result};
use regex::Regex;
use std::path::Path;

/// Placeholder servings for migrated documents (the documents never
/// state servings; the UI hides this sentinel)
const MIGRATED_SERVINGS: i64 = 999;
/// Placeholder author recorded on migrated documents
const MIGRATED_AUTHOR: &str = "מתכון מדוגמה";

const DEFAULT_PREP_MINUTES: i64 = 30;
const DEFAULT_COOK_MINUTES: i64 = 45;

const INGREDIENT_KEYWORDS: &[&str] = &[
    "רכיבים",
    "חומרים",
    "מצרכים",
    "מרכיבים",
    "חומרי גלם",
    "רשימת מצרכים",
    "רשימת חומרים",
];

const INSTRUCTION_KEYWORDS: &[&str] = &[
    "הוראות",
    "הכנה",
    "אופן הכנה",
    "שלבי הכנה",
    "דרך הכנה",
    "הוראות הכנה",
    "אופן הפעלה",
];

const PREP_TIME_KEYWORDS: &[&str] = &["זמן הכנה", "זמן הכנת", "הכנה:"];
const COOK_TIME_KEYWORDS: &[&str] = &["זמן בישול", "זמן אפייה", "זמן על האש", "בישול:", "אפייה:"];

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("MAIN", &["עיקרית", "מנה עיקרית", "ארוחה עיקרית", "בשר", "עוף", "דג"]),
    ("SIDE", &["תוספת", "מנת תוספת", "סלט", "ירקות"]),
    ("DESSERT", &["קינוח", "עוגה", "עוגית", "ממתק", "מתוק", "פאי", "טארט"]),
];

/// Fixed Hebrew tag vocabulary
const TAG_VOCABULARY: &[&str] = &[
    "פרווה",
    "בשרי",
    "חלבי",
    "צמחוני",
    "טבעוני",
    "ללא גלוטן",
    "בריא",
    "מהיר",
    "פשוט",
    "מתכון משפחתי",
    "אפייה",
    "קל",
    "מתאים לילדים",
    "מסורתי",
];

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(דקות|דק|שעות|שעה|ש)").unwrap());
static TIME_OR_NUMBER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+|זמן|דקות|שעות").unwrap());
static QUANTITY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+|זמן|דקות|שעות|מנות").unwrap());
static BULLET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-•·*\d+.)]+\s*").unwrap());
static BULLETED_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-•·*\d+.)]").unwrap());
static DESCRIPTION_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(תיאור|מתכון|הכנה)[:׃]?\s*").unwrap());

/// Parse a recipe from raw document text. `source_path` supplies the
/// title fallback (filename) when no plausible title line is found.
pub fn parse_recipe_text(text: &str, source_path: &Path) -> Result<NewRecipe> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let recipe = NewRecipe {
        title: extract_title(&lines, source_path),
        description: extract_description(&lines),
        category: extract_category(text).to_string(),
        prep_time_minutes: extract_time(text, &PREP_TIME_KEYWORDS[..], DEFAULT_PREP_MINUTES),
        cook_time_minutes: extract_time(text, &COOK_TIME_KEYWORDS[..], DEFAULT_COOK_MINUTES),
        servings: MIGRATED_SERVINGS,
        ingredients: extract_ingredients(&lines),
        instructions: extract_instructions(&lines),
        photo_url: None,
        tags: extract_tags(text),
        created_by: MIGRATED_AUTHOR.to_string(),
    };

    validate_parsed(&recipe, source_path)?;
    Ok(recipe)
}

fn validate_parsed(recipe: &NewRecipe, source_path: &Path) -> Result<()> {
    let mut problems = Vec::new();
    if recipe.title.trim().is_empty() {
        problems.push("no title");
    }
    if recipe.ingredients.is_empty() {
        problems.push("no ingredients found");
    }
    if recipe.instructions.is_empty() {
        problems.push("no instructions found");
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Could not parse {}: {}",
            source_path.display(),
            problems.join(", ")
        )))
    }
}

fn is_keyword_line(line: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| line.contains(keyword))
}

/// A section header contains one of the keywords but is not a time
/// line ("זמן הכנה: 20 דקות" contains "הכנה" yet opens no section).
fn is_keyword_header(line: &str, keywords: &[&str]) -> bool {
    is_keyword_line(line, keywords) && !TIME_RE.is_match(line)
}

fn is_section_header(line: &str) -> bool {
    is_keyword_header(line, INGREDIENT_KEYWORDS) || is_keyword_header(line, INSTRUCTION_KEYWORDS)
}

/// Title: first plausible line among the first five that is neither a
/// section header nor a time/number line. Fallback: the filename.
fn extract_title(lines: &[&str], source_path: &Path) -> String {
    for line in lines.iter().take(5) {
        if is_section_header(line) {
            continue;
        }
        if TIME_OR_NUMBER_LINE_RE.is_match(line) {
            continue;
        }
        let len = line.chars().count();
        if (3..=100).contains(&len) {
            return line.to_string();
        }
    }

    source_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default()
}

/// Description: substantial prose between the title and the first
/// section header. Accumulation starts at the first long line (> 50
/// chars) and stops at the next short one.
fn extract_description(lines: &[&str]) -> Option<String> {
    let mut description_lines: Vec<&str> = Vec::new();
    let mut in_description = false;

    for line in lines.iter().skip(1).take(29) {
        if is_section_header(line) {
            break;
        }
        if QUANTITY_LINE_RE.is_match(line) {
            continue;
        }

        let len = line.chars().count();
        if len > 15 {
            if !in_description && len > 50 {
                in_description = true;
            }
            if in_description {
                description_lines.push(line);
            }
        } else if in_description {
            break;
        }
    }

    if description_lines.is_empty() {
        return None;
    }

    let joined = description_lines.join(" ");
    let cleaned = DESCRIPTION_PREFIX_RE.replace(&joined, "").trim().to_string();
    if cleaned.chars().count() > 30 {
        Some(cleaned)
    } else {
        None
    }
}

fn extract_category(text: &str) -> &'static str {
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return category;
        }
    }
    "MAIN"
}

/// Find a time near one of the section keywords; `(\d+) שעות` converts
/// to minutes. Falls back to the given default.
fn extract_time(text: &str, keywords: &[&str], default: i64) -> i64 {
    for line in text.lines() {
        if !is_keyword_line(line, keywords) {
            continue;
        }
        if let Some(captures) = TIME_RE.captures(line) {
            let value: i64 = captures[1].parse().unwrap_or(0);
            let unit = &captures[2];
            if unit.contains("שעה") || unit.contains("שעות") || unit == "ש" {
                return value * 60;
            }
            return value;
        }
    }
    default
}

fn extract_ingredients(lines: &[&str]) -> Vec<IngredientInput> {
    let mut ingredients = Vec::new();
    let mut in_section = false;

    for line in lines {
        if is_keyword_header(line, INGREDIENT_KEYWORDS) {
            in_section = true;
            continue;
        }
        if in_section && is_keyword_header(line, INSTRUCTION_KEYWORDS) {
            break;
        }
        if in_section {
            if let Some(text) = clean_ingredient_line(line) {
                ingredients.push(IngredientInput { text });
            }
        }
    }

    if ingredients.is_empty() {
        ingredients = ingredients_fallback(lines);
    }

    ingredients
}

fn extract_instructions(lines: &[&str]) -> Vec<InstructionInput> {
    let mut instructions = Vec::new();
    let mut in_section = false;

    for line in lines {
        if is_keyword_header(line, INSTRUCTION_KEYWORDS) {
            in_section = true;
            continue;
        }
        if in_section {
            if let Some(text) = clean_instruction_line(line) {
                instructions.push(InstructionInput { text });
            }
        }
    }

    if instructions.is_empty() {
        instructions = instructions_fallback(lines);
    }

    instructions
}

fn clean_ingredient_line(line: &str) -> Option<String> {
    let cleaned = BULLET_PREFIX_RE.replace(line, "").trim().to_string();
    if cleaned.chars().count() < 3 || is_keyword_line(&cleaned, INSTRUCTION_KEYWORDS) {
        return None;
    }
    Some(cleaned)
}

fn clean_instruction_line(line: &str) -> Option<String> {
    let cleaned = BULLET_PREFIX_RE.replace(line, "").trim().to_string();
    if cleaned.chars().count() < 5 {
        return None;
    }
    Some(cleaned)
}

/// No section header found: take short bulleted/numbered lines as
/// ingredients
fn ingredients_fallback(lines: &[&str]) -> Vec<IngredientInput> {
    lines
        .iter()
        .filter(|line| {
            BULLETED_LINE_RE.is_match(line) && !is_keyword_line(line, INSTRUCTION_KEYWORDS)
        })
        .filter_map(|line| clean_ingredient_line(line))
        .filter(|text| text.chars().count() < 100)
        .map(|text| IngredientInput { text })
        .collect()
}

/// No section header found: take longer bulleted/numbered lines as
/// instructions
fn instructions_fallback(lines: &[&str]) -> Vec<InstructionInput> {
    lines
        .iter()
        .filter(|line| BULLETED_LINE_RE.is_match(line))
        .filter_map(|line| clean_instruction_line(line))
        .filter(|text| text.chars().count() > 10)
        .map(|text| InstructionInput { text })
        .collect()
}

fn extract_tags(text: &str) -> Vec<String> {
    TAG_VOCABULARY
        .iter()
        .filter(|tag| text.contains(*tag))
        .map(|tag| tag.to_string())
        .collect()
}
