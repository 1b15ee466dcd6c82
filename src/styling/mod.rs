pub mod normalize;
pub mod prompt;

use serde::{Deserialize, Serialize};

use crate::analysis::ToneCategory;

pub use normalize::{normalize, MalformedResponseError};
pub use prompt::build_prompt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylingRequestContext {
    pub skin_tone: ToneCategory,
    pub gender: String,
    pub occasion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub outfit_description: String,
    pub shopping_terms: Vec<String>,
    pub color_palette: ColorPalette,
    pub accessories: Vec<String>,
    pub hairstyle: String,
    pub why_it_works: String,
}
