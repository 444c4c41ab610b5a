//! Rating Categories
//!
//! The canonical coaching rubric and the normalization that folds model
//! spelling variants onto it. Models are verbose and inconsistent:
//! "Open-Mindedness", "open mindedness", and "OPEN_MINDEDNESS" must all
//! land on the same rubric entry.

/// Canonical rubric categories in display order
pub const CANONICAL_CATEGORIES: [&str; 8] = [
    "Empathy",
    "Clarity",
    "Assertiveness",
    "Persuasion",
    "Active Listening",
    "Objection Handling",
    "Closing Ability",
    "Flexibility",
];

/// Fold case, spacing, hyphens, and underscores into a lookup key
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical display name for a raw category, if it maps to the rubric
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    match normalize_key(raw).as_str() {
        "empathy" => Some("Empathy"),
        "clarity" => Some("Clarity"),
        "assertiveness" => Some("Assertiveness"),
        "persuasion" | "persuasiveness" => Some("Persuasion"),
        "activelistening" | "listening" => Some("Active Listening"),
        "objectionhandling" | "objections" | "handlingobjections" => Some("Objection Handling"),
        "closingability" | "closing" | "closingskills" => Some("Closing Ability"),
        "flexibility" | "openmindedness" | "adaptability" => Some("Flexibility"),
        _ => None,
    }
}
