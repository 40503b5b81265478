mod extract;

pub use extract::{extract_nutrition, ExtractError, ExtractedNutrition};
