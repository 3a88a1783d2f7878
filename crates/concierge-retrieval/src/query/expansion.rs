//! Category synonym expansion.
//!
//! Expands a category with related terms to improve recall.
//! E.g., "italian" → "pasta pizza trattoria".

use super::utterance::Utterance;

const SYNONYMS: &[(&str, &[&str])] = &[
    ("mexican", &["taqueria", "tacos", "tex-mex"]),
    ("italian", &["pasta", "pizza", "trattoria"]),
    ("chinese", &["dim sum", "noodles", "szechuan"]),
    ("japanese", &["sushi", "ramen", "izakaya"]),
    ("thai", &["curry", "noodles", "pad thai"]),
    ("indian", &["curry", "tandoori", "biryani"]),
    ("bbq", &["barbecue", "smokehouse", "brisket"]),
    ("american", &["diner", "burgers", "grill"]),
    ("mediterranean", &["greek", "falafel", "mezze"]),
    ("french", &["bistro", "brasserie", "patisserie"]),
    ("korean", &["bbq", "bibimbap", "kimchi"]),
    ("vietnamese", &["pho", "banh mi", "noodles"]),
    ("restaurant", &["dining", "eatery", "food"]),
    ("bar", &["pub", "cocktails", "drinks"]),
    ("cafe", &["coffee", "espresso", "coffee shop"]),
    ("park", &["garden", "trail", "green space"]),
    ("museum", &["gallery", "exhibit", "art"]),
    ("hotel", &["lodging", "inn", "accommodation"]),
    ("bakery", &["pastries", "bread", "desserts"]),
    ("store", &["shop", "boutique", "market"]),
];

/// Related terms for `category` that the utterance does not already contain.
pub fn expand(category: &str, utterance: &Utterance) -> Vec<String> {
    SYNONYMS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(category))
        .map(|(_, terms)| {
            terms
                .iter()
                .filter(|t| !utterance.has(&t.replace('-', " ")))
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default()
}
