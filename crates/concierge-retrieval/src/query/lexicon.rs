//! Word tables for utterance classification and filter extraction.
//!
//! Phrases are written in normalized form: lowercase, apostrophes removed,
//! hyphens replaced by spaces.

use std::collections::HashSet;
use std::sync::LazyLock;

use concierge_core::models::{PriceLevel, RankingFactor, SortMode};

/// Cuisines → phrases that mention them. Checked before place types.
pub const CUISINES: &[(&str, &[&str])] = &[
    ("mexican", &["mexican", "taqueria", "tex mex", "tacos", "taco", "burrito", "burritos"]),
    ("italian", &["italian", "pizzeria", "trattoria", "pizza", "pasta"]),
    ("chinese", &["chinese", "dim sum", "dumplings"]),
    ("japanese", &["japanese", "sushi", "ramen", "izakaya"]),
    ("thai", &["thai", "pad thai"]),
    ("indian", &["indian", "curry", "tandoori"]),
    ("bbq", &["bbq", "barbecue", "smokehouse", "brisket"]),
    ("american", &["american", "diner", "burger", "burgers"]),
    ("mediterranean", &["mediterranean", "greek", "falafel"]),
    ("french", &["french", "bistro", "brasserie"]),
    ("korean", &["korean", "bibimbap"]),
    ("vietnamese", &["vietnamese", "pho", "banh mi"]),
];

/// Place types → phrases that mention them.
pub const PLACE_TYPES: &[(&str, &[&str])] = &[
    (
        "restaurant",
        &["restaurant", "restaurants", "dinner", "lunch", "brunch", "dining", "eat", "food"],
    ),
    (
        "bar",
        &["bar", "bars", "pub", "pubs", "drinks", "lounge", "brewery", "cocktails", "wine bar"],
    ),
    ("cafe", &["cafe", "cafes", "coffee", "coffee shop", "espresso"]),
    ("park", &["park", "parks", "trail", "trails", "hiking", "garden", "gardens", "playground"]),
    ("museum", &["museum", "museums", "gallery", "galleries", "exhibit"]),
    ("hotel", &["hotel", "hotels", "motel", "accommodation", "lodging"]),
    ("bakery", &["bakery", "bakeries", "pastry", "pastries", "dessert", "desserts"]),
    ("store", &["shop", "shops", "store", "stores", "mall", "market", "shopping"]),
];

pub const CITIES: &[&str] = &[
    "new york",
    "los angeles",
    "chicago",
    "houston",
    "phoenix",
    "philadelphia",
    "san antonio",
    "san diego",
    "dallas",
    "san jose",
    "austin",
    "jacksonville",
    "fort worth",
    "columbus",
    "san francisco",
    "charlotte",
    "indianapolis",
    "seattle",
    "denver",
    "boston",
];

pub const PRICE_WORDS: &[(PriceLevel, &[&str])] = &[
    (PriceLevel::Low, &["cheap", "budget", "affordable", "inexpensive", "cheap eats"]),
    (
        PriceLevel::Moderate,
        &["moderate", "moderately priced", "mid range", "reasonably priced", "reasonable"],
    ),
    (
        PriceLevel::High,
        &["upscale", "fancy", "expensive", "luxury", "high end", "fine dining", "splurge"],
    ),
];

pub const CHEAPER: &[&str] = &[
    "cheaper",
    "less expensive",
    "more affordable",
    "lower priced",
    "less pricey",
    "too expensive",
];

pub const PRICIER: &[&str] = &[
    "fancier",
    "more upscale",
    "more expensive",
    "nicer",
    "classier",
    "higher end",
    "too cheap",
];

pub const ATMOSPHERE: &[(&str, &[&str])] = &[
    ("romantic", &["romantic", "date night", "intimate"]),
    ("quiet", &["quiet", "calm", "peaceful", "not too loud"]),
    ("casual", &["casual", "laid back", "relaxed", "chill"]),
    ("outdoor", &["outdoor", "outdoors", "patio", "outside seating", "terrace"]),
    (
        "family",
        &["family", "family friendly", "kid friendly", "kids", "children", "families"],
    ),
    ("rooftop", &["rooftop", "roof top", "with a view"]),
];

pub const OPEN_NOW: &[&str] = &[
    "open now",
    "open right now",
    "currently open",
    "still open",
    "open today",
    "open late",
    "thats open",
    "is open",
    "are open",
];

/// Phrases that imply a 4-star minimum.
pub const HIGHLY_RATED: &[&str] = &[
    "highly rated",
    "well rated",
    "well reviewed",
    "good reviews",
    "great reviews",
    "good ratings",
];
pub const HIGHLY_RATED_MIN: f64 = 4.0;

pub const EMPHASIS: &[(RankingFactor, &[&str])] = &[
    (
        RankingFactor::Rating,
        &["best", "top rated", "highest rated", "highly rated", "best rated", "well reviewed", "popular"],
    ),
    (
        RankingFactor::Proximity,
        &["nearby", "near me", "near here", "close by", "close to me", "closest", "nearest", "around here", "walking distance"],
    ),
];

pub const SORT_PHRASES: &[(SortMode, &[&str])] = &[
    (SortMode::PriceLow, &["cheapest", "least expensive", "lowest price", "lowest priced"]),
    (SortMode::RatingHigh, &["highest rated", "best rated", "top rated", "best reviewed"]),
    (SortMode::Distance, &["closest", "nearest"]),
];

pub const MORE_LIKE_THAT: &[&str] = &[
    "more like that",
    "more like this",
    "more like those",
    "similar",
    "others like",
];

/// Words introducing a landmark ("near the river").
pub const LANDMARK_TRIGGERS: &[&str] = &[
    "near the",
    "by the",
    "next to the",
    "close to the",
    "around the",
    "beside the",
    "across from the",
];

pub const RESET_PHRASES: &[&str] = &[
    "start over",
    "start again",
    "begin again",
    "never mind",
    "nevermind",
    "forget that",
    "forget it",
    "forget everything",
    "scratch that",
    "clear the filters",
    "clear filters",
    "clear everything",
    "reset",
];

/// Tokens that carry no content on their own.
pub const INTERJECTIONS: &[&str] = &[
    "uh", "um", "uhh", "umm", "hmm", "mm", "mhm", "huh", "oh", "ah", "wow", "okay", "ok", "yes",
    "yeah", "yep", "yup", "sure", "right", "alright", "all", "go", "on", "ahead", "continue",
    "keep", "going", "hold", "wait", "sorry", "i", "see", "got", "it", "cool", "great", "nice",
    "perfect", "interesting", "thanks", "thank", "you", "no", "nope", "hi", "hello", "hey", "so",
    "well", "and", "please", "really", "sounds", "good",
];

pub const ORDINALS: &[(&str, usize)] = &[
    ("first", 0),
    ("1st", 0),
    ("second", 1),
    ("2nd", 1),
    ("third", 2),
    ("3rd", 2),
    ("fourth", 3),
    ("4th", 3),
    ("fifth", 4),
    ("5th", 4),
    ("sixth", 5),
    ("6th", 5),
    ("seventh", 6),
    ("eighth", 7),
    ("ninth", 8),
    ("tenth", 9),
];

pub const CARDINALS: &[(&str, usize)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Nouns that can follow an ordinal in a reference ("the second place").
pub const REFERENT_NOUNS: &[&str] = &[
    "one", "place", "option", "result", "spot", "choice", "suggestion", "restaurant", "bar",
    "cafe", "park", "museum", "hotel",
];

/// Words that introduce a numbered reference ("number 3", "option two").
pub const NUMBER_MARKERS: &[&str] = &["number", "option", "result", "choice"];

pub const DEICTIC: &[&str] = &[
    "that one",
    "this one",
    "that place",
    "this place",
    "that spot",
    "the one",
    "tell me more",
    "more about it",
    "more about that",
    "more about this",
    "more info",
    "more information",
    "more details",
    "what about it",
    "is it open",
    "how far is it",
    "where is it",
    "whats the address",
    "their address",
    "its address",
    "their hours",
    "its hours",
    "phone number",
    "when does it open",
    "when does it close",
];

pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "i", "im", "id", "me", "my", "we", "us", "our", "you", "your", "it", "its",
    "is", "are", "am", "was", "be", "been", "to", "for", "of", "in", "on", "at", "with", "and",
    "or", "but", "not", "no", "some", "any", "all", "that", "thats", "this", "those", "these",
    "there", "theres", "here", "what", "whats", "which", "where", "when", "who", "how", "about",
    "do", "does", "dont", "have", "has", "can", "could", "would", "should", "will", "may",
    "might", "please", "find", "show", "give", "get", "want", "wanna", "looking", "look",
    "search", "need", "like", "make", "let", "lets", "go", "see", "try", "know", "tell",
    "recommend", "suggest", "something", "somewhere", "anything", "anywhere", "place", "places",
    "spot", "spots", "option", "options", "one", "ones", "them", "they", "else", "other",
    "another", "kind", "sort", "type", "good", "great", "nice", "really", "just", "also",
    "actually", "maybe", "rather", "only", "still", "even", "too", "very", "so", "well", "more",
    "less", "much", "many", "instead", "now", "then", "than", "as", "if", "up", "out", "into",
    "around", "near", "by", "close", "next", "from", "across", "beside", "today", "tonight",
    "okay", "ok", "um", "uh", "hey", "hi", "hello", "thanks", "thing", "things",
];

/// Filter-only words that do not count as topical content.
pub const FILTER_EXTRA_WORDS: &[&str] = &[
    "star", "stars", "rated", "rating", "ratings", "review", "reviews", "price", "priced",
    "pricey", "open", "least", "most", "minimum", "above", "over", "plus", "better", "higher",
    "lower", "top", "cost", "costs", "dollar", "dollars",
];

/// Every token appearing in a filter phrase. Tokens in this set never make
/// an utterance topical.
pub static FILTER_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut words = HashSet::new();
    let mut add = |phrases: &[&'static str]| {
        for phrase in phrases.iter().copied() {
            words.extend(phrase.split(' '));
        }
    };
    for (_, phrases) in PRICE_WORDS {
        add(phrases);
    }
    for (_, phrases) in ATMOSPHERE {
        add(phrases);
    }
    for (_, phrases) in EMPHASIS {
        add(phrases);
    }
    for (_, phrases) in SORT_PHRASES {
        add(phrases);
    }
    add(CHEAPER);
    add(PRICIER);
    add(OPEN_NOW);
    add(HIGHLY_RATED);
    add(MORE_LIKE_THAT);
    add(CITIES);
    add(FILTER_EXTRA_WORDS);
    words
});

pub static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub static INTERJECTION_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INTERJECTIONS.iter().copied().collect());
