use serde_json::Value;
use thiserror::Error;

use crate::styling::RecommendationRecord;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

const SHOPPING_TERMS_RANGE: (usize, usize) = (3, 4);
const ACCESSORIES_RANGE: (usize, usize) = (2, 3);

#[derive(Debug, Error)]
pub enum MalformedResponseError {
    #[error("response is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    #[error("response JSON does not match the recommendation shape: {0}")]
    Shape(#[source] serde_json::Error),
    #[error("response failed validation: {0}")]
    Invalid(String),
}

/// Removes one leading fence (```json or ```) and one trailing ``` fence.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(JSON_FENCE) {
        text = rest;
    } else if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}

fn check_len(
    field: &str,
    items: &[String],
    (min, max): (usize, usize),
) -> Result<(), MalformedResponseError> {
    if items.len() < min || items.len() > max {
        return Err(MalformedResponseError::Invalid(format!(
            "{field} must have {min}-{max} entries, got {}",
            items.len()
        )));
    }
    Ok(())
}

fn check_text(field: &str, value: &str) -> Result<(), MalformedResponseError> {
    if value.trim().is_empty() {
        return Err(MalformedResponseError::Invalid(format!("{field} is empty")));
    }
    Ok(())
}

fn validate(record: &RecommendationRecord) -> Result<(), MalformedResponseError> {
    check_text("outfit_description", &record.outfit_description)?;
    check_len("shopping_terms", &record.shopping_terms, SHOPPING_TERMS_RANGE)?;
    for term in &record.shopping_terms {
        check_text("shopping_terms entry", term)?;
    }
    check_text("color_palette.primary", &record.color_palette.primary)?;
    check_text("color_palette.secondary", &record.color_palette.secondary)?;
    check_text("color_palette.accent", &record.color_palette.accent)?;
    check_len("accessories", &record.accessories, ACCESSORIES_RANGE)?;
    for accessory in &record.accessories {
        check_text("accessories entry", accessory)?;
    }
    check_text("hairstyle", &record.hairstyle)?;
    check_text("why_it_works", &record.why_it_works)?;
    Ok(())
}

pub fn normalize(raw: &str) -> Result<RecommendationRecord, MalformedResponseError> {
    let cleaned = strip_fences(raw);
    let value: Value = serde_json::from_str(cleaned).map_err(MalformedResponseError::Syntax)?;
    let record: RecommendationRecord =
        serde_json::from_value(value).map_err(MalformedResponseError::Shape)?;
    validate(&record)?;
    Ok(record)
}
