use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nutrition facts read out of a single vision-model report.
///
/// Numeric fields stay `None` when the report didn't contain them; a missing
/// value is never turned into `0` here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedNutrition {
    pub food_name: String,
    pub calories: Option<f64>,
    pub protein_grams: Option<f64>,
    pub fat_grams: Option<f64>,
    pub carb_grams: Option<f64>,
    pub sugar_grams: Option<f64>,
    pub is_junk_food: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("vision model returned no text")]
    UpstreamEmptyResponse,
}

// Findings are enumerated "1)" .. "7)" in a fixed order.
const NAME: usize = 1;
const CALORIES: usize = 2;
const PROTEIN: usize = 3;
const FAT: usize = 4;
const CARBS: usize = 5;
const SUGAR: usize = 6;
const JUNK_FOOD: usize = 7;

lazy_static! {
    static ref MARKER_RE: Regex = Regex::new(r"[1-7]\)").unwrap();
    static ref NUMBER_RE: Regex =
        Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?").unwrap();
    static ref TOKEN_RE: Regex = Regex::new(r"[A-Za-z]+").unwrap();
}

/// An enumeration marker `n)` and the byte offset where its text begins.
#[derive(Debug, Clone, Copy)]
struct Marker {
    n: usize,
    start: usize,
    body: usize,
}

/// Markers in order of appearance.
///
/// `12)` is not a marker, and neither is a `n)` closing an open parenthesis on
/// the same line, as in `Pasta (serves 2)`.
fn markers(text: &str) -> Vec<Marker> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut scanned = 0;
    for m in MARKER_RE.find_iter(text) {
        depth = text[scanned..m.start()].chars().fold(depth, |d, c| match c {
            '(' => d + 1,
            ')' => d.saturating_sub(1),
            '\n' => 0,
            _ => d,
        });
        scanned = m.start();

        let after_digit = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit());
        if after_digit || depth > 0 {
            continue;
        }
        found.push(Marker {
            n: usize::from(text.as_bytes()[m.start()] - b'0'),
            start: m.start(),
            body: m.end(),
        });
    }
    found
}

struct Findings<'a> {
    text: &'a str,
    markers: Vec<Marker>,
}

impl<'a> Findings<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            markers: markers(text),
        }
    }

    /// Text after the first `marker)` up to the next marker of any number.
    fn segment(&self, marker: usize) -> Option<&'a str> {
        let i = self.markers.iter().position(|m| m.n == marker)?;
        let end = self
            .markers
            .get(i + 1)
            .map_or(self.text.len(), |next| next.start);
        Some(&self.text[self.markers[i].body..end])
    }

    fn number(&self, marker: usize) -> Option<f64> {
        let seg = self.segment(marker)?;
        let raw = NUMBER_RE.find(seg)?.as_str().replace(',', "");
        raw.parse::<f64>().ok()
    }

    fn name(&self) -> String {
        let Some(seg) = self.segment(NAME) else {
            return String::new();
        };
        let end = seg.find(&['\n', '.'][..]).unwrap_or(seg.len());
        seg[..end]
            .trim_matches(|c: char| c.is_whitespace() || c == '*' || c == ':')
            .to_string()
    }

    fn junk_flag(&self) -> bool {
        self.segment(JUNK_FOOD)
            .and_then(|seg| TOKEN_RE.find(seg))
            .is_some_and(|tok| tok.as_str().eq_ignore_ascii_case("yes"))
    }
}

/// Parse the seven enumerated findings of a vision-model report.
///
/// Each field is matched on its own; a field that doesn't parse is left
/// unset while the others still come through. Only a report with no text at
/// all is an error.
pub fn extract_nutrition(text: &str) -> Result<ExtractedNutrition, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::UpstreamEmptyResponse);
    }

    let f = Findings::new(text);
    Ok(ExtractedNutrition {
        food_name: f.name(),
        calories: f.number(CALORIES),
        protein_grams: f.number(PROTEIN),
        fat_grams: f.number(FAT),
        carb_grams: f.number(CARBS),
        sugar_grams: f.number(SUGAR),
        is_junk_food: f.junk_flag(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPORT: &str = "1) Cheeseburger with fries. 2) 850 calories 3) 35 grams protein \
        4) 42.5 grams fat 5) 80 grams carbohydrates 6) 12 grams sugar 7) Yes, this is junk food";

    #[test]
    fn parses_all_seven_findings() {
        let n = extract_nutrition(FULL_REPORT).unwrap();
        assert_eq!(n.food_name, "Cheeseburger with fries");
        assert_eq!(n.calories, Some(850.0));
        assert_eq!(n.protein_grams, Some(35.0));
        assert_eq!(n.fat_grams, Some(42.5));
        assert_eq!(n.carb_grams, Some(80.0));
        assert_eq!(n.sugar_grams, Some(12.0));
        assert!(n.is_junk_food);
    }

    #[test]
    fn calories_from_marker_two() {
        let n = extract_nutrition("1) Salad 2) 450 calories").unwrap();
        assert_eq!(n.calories, Some(450.0));

        let n = extract_nutrition("Here you go:\n2) 450 calories\n").unwrap();
        assert_eq!(n.calories, Some(450.0));
    }

    #[test]
    fn missing_sugar_segment_is_none_not_zero() {
        let text = "1) Oatmeal\n2) 300 calories\n3) 10 grams protein\n4) 5 grams fat\n\
                    5) 54 grams carbohydrates\n7) No";
        let n = extract_nutrition(text).unwrap();
        assert_eq!(n.sugar_grams, None);
        assert_eq!(n.carb_grams, Some(54.0));
        assert!(!n.is_junk_food);
    }

    #[test]
    fn junk_flag_is_case_insensitive() {
        assert!(extract_nutrition("7) Yes").unwrap().is_junk_food);
        assert!(extract_nutrition("7) yes").unwrap().is_junk_food);
        assert!(extract_nutrition("7) YES.").unwrap().is_junk_food);
        assert!(!extract_nutrition("7) No").unwrap().is_junk_food);
        assert!(!extract_nutrition("7) maybe").unwrap().is_junk_food);
        assert!(!extract_nutrition("1) Apple").unwrap().is_junk_food);
    }

    #[test]
    fn field_without_number_stays_unset() {
        let n = extract_nutrition("1) Soup 2) unknown calories 3) 8 grams protein").unwrap();
        assert_eq!(n.calories, None);
        assert_eq!(n.protein_grams, Some(8.0));
    }

    #[test]
    fn name_stops_at_newline_or_period() {
        let n = extract_nutrition("1) Pad thai\nwith shrimp 2) 600 calories").unwrap();
        assert_eq!(n.food_name, "Pad thai");

        let n = extract_nutrition("1) **Pad thai**. Looks fresh 2) 600 calories").unwrap();
        assert_eq!(n.food_name, "Pad thai");
    }

    #[test]
    fn thousands_separator_and_decimals() {
        let n = extract_nutrition("2) 1,250 calories 3) 7.25 grams protein").unwrap();
        assert_eq!(n.calories, Some(1250.0));
        assert_eq!(n.protein_grams, Some(7.25));
    }

    #[test]
    fn twelve_is_not_marker_two() {
        let n = extract_nutrition("12) 999 calories").unwrap();
        assert_eq!(n.calories, None);
    }

    #[test]
    fn unstructured_text_degrades_to_empty_record() {
        let n = extract_nutrition("I can't tell what this is.").unwrap();
        assert_eq!(n, ExtractedNutrition::default());
    }

    #[test]
    fn blank_text_is_upstream_empty() {
        assert_eq!(extract_nutrition(""), Err(ExtractError::UpstreamEmptyResponse));
        assert_eq!(extract_nutrition("  \n\t"), Err(ExtractError::UpstreamEmptyResponse));
    }

    #[test]
    fn extraction_is_repeatable() {
        let a = extract_nutrition(FULL_REPORT).unwrap();
        let b = extract_nutrition(FULL_REPORT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parenthesised_number_is_not_a_marker() {
        let text = "1) Pasta (serves 2) 2) 600 calories 3) 20 grams protein";
        let n = extract_nutrition(text).unwrap();
        assert_eq!(n.food_name, "Pasta (serves 2)");
        assert_eq!(n.calories, Some(600.0));
        assert_eq!(n.protein_grams, Some(20.0));
    }

    #[test]
    fn unclosed_parenthesis_ends_with_the_line() {
        let n = extract_nutrition("1) Curry (mild\n2) 700 calories\n7) no").unwrap();
        assert_eq!(n.food_name, "Curry (mild");
        assert_eq!(n.calories, Some(700.0));
        assert!(!n.is_junk_food);
    }
}
