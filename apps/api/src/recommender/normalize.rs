//! Text Normalizer — turns free-form posting/profile text into a canonical,
//! lemmatized token string.
//!
//! Pipeline (each step runs on the output of the previous one):
//! 1. lowercase
//! 2. strip URLs (`http…`, `www…`) and email-like tokens
//! 3. non-word, non-space characters → space
//! 4. digit runs → space
//! 5. collapse whitespace, trim, split into tokens
//! 6. drop stopwords (English + job-board vocabulary)
//! 7. lemmatize to the noun base form (irregular table, then suffix rules)
//! 8. drop tokens shorter than 3 characters
//!
//! The function is pure and idempotent: `normalize(normalize(s)) == normalize(s)`.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http\S+|www\S+|https\S+").expect("valid regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").expect("valid regex"));
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

const MIN_TOKEN_CHARS: usize = 3;

const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Words that appear in nearly every posting and carry no matching signal.
const DOMAIN_STOPWORDS: &[&str] = &[
    "job",
    "work",
    "company",
    "position",
    "required",
    "requirements",
    "experience",
    "skill",
    "skills",
    "candidate",
    "opportunity",
    "role",
];

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ENGLISH_STOPWORDS
        .iter()
        .chain(DOMAIN_STOPWORDS.iter())
        .copied()
        .collect()
});

/// Plurals that suffix rules get wrong.
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("apis", "api"),
    ("bonuses", "bonus"),
    ("buses", "bus"),
    ("campuses", "campus"),
    ("censuses", "census"),
    ("children", "child"),
    ("criteria", "criterion"),
    ("diagnoses", "diagnosis"),
    ("echoes", "echo"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("gurus", "guru"),
    ("halves", "half"),
    ("heroes", "hero"),
    ("indices", "index"),
    ("knives", "knife"),
    ("kpis", "kpi"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("matrices", "matrix"),
    ("men", "man"),
    ("menus", "menu"),
    ("mice", "mouse"),
    ("phenomena", "phenomenon"),
    ("potatoes", "potato"),
    ("quizzes", "quiz"),
    ("salesmen", "salesman"),
    ("shelves", "shelf"),
    ("skis", "ski"),
    ("statuses", "status"),
    ("syllabuses", "syllabus"),
    ("taxis", "taxi"),
    ("teeth", "tooth"),
    ("theses", "thesis"),
    ("thieves", "thief"),
    ("tomatoes", "tomato"),
    ("vetoes", "veto"),
    ("viruses", "virus"),
    ("wikis", "wiki"),
    ("wives", "wife"),
    ("wolves", "wolf"),
    ("women", "woman"),
];

/// Words that look plural but are their own base form.
const INVARIANT_NOUNS: &[&str] = &[
    "aerobics",
    "always",
    "analytics",
    "athletics",
    "economics",
    "electronics",
    "genetics",
    "linguistics",
    "logistics",
    "mathematics",
    "news",
    "perhaps",
    "physics",
    "politics",
    "robotics",
    "series",
    "species",
];

/// Endings that mark a singular noun ending in `s` (class, status, basis).
const SINGULAR_S_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Base forms ending in `ie`, whose plural would otherwise reduce to `-y`.
const IE_NOUNS: &[&str] = &[
    "brownie", "calorie", "cookie", "foodie", "freebie", "genie", "goalie", "hoodie", "movie",
    "newbie", "pixie", "prairie", "rookie", "selfie", "smoothie", "techie", "zombie",
];

/// Base forms ending in `che`, whose plural would otherwise lose the `e`.
const CHE_NOUNS: &[&str] = &[
    "ache", "avalanche", "cache", "cliche", "creche", "headache", "microfiche", "moustache",
    "niche", "psyche", "quiche",
];

/// Normalizes one piece of raw text. Empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let text = raw.to_lowercase();
    let text = URL_RE.replace_all(&text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = PUNCT_RE.replace_all(&text, " ");
    let text = DIGITS_RE.replace_all(&text, " ");

    text.split_whitespace()
        .filter(|token| !is_stopword(token))
        .map(lemmatize)
        // A lemma can land on a stopword (`jobs` → `job`); filter again so the
        // output is a fixed point.
        .filter(|lemma| !is_stopword(lemma))
        .filter(|lemma| lemma.chars().count() >= MIN_TOKEN_CHARS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes an optional field; a missing value yields an empty string.
pub fn normalize_field(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Reduces a lowercase token to its noun base form.
///
/// Context free: the same token always maps to the same lemma, and every
/// lemma maps to itself. Reduction repeats until the token stops changing.
pub fn lemmatize(token: &str) -> String {
    let mut current = token.to_string();
    loop {
        match reduce_once(&current) {
            Some(next) if next != current => current = next,
            _ => return current,
        }
    }
}

/// One reduction step, or `None` when the token is already a base form.
fn reduce_once(token: &str) -> Option<String> {
    if let Some((_, base)) = IRREGULAR_NOUNS.iter().find(|(plural, _)| *plural == token) {
        return Some((*base).to_string());
    }
    if token.len() <= 3
        || INVARIANT_NOUNS.contains(&token)
        || SINGULAR_S_ENDINGS.iter().any(|end| token.ends_with(end))
    {
        return None;
    }

    if let Some(stem) = token.strip_suffix("ies") {
        let ie_form = format!("{stem}ie");
        if token.len() <= 4 || IE_NOUNS.contains(&ie_form.as_str()) {
            return Some(ie_form);
        }
        return Some(format!("{stem}y"));
    }
    if let Some(stem) = token.strip_suffix("sses") {
        return Some(format!("{stem}ss"));
    }
    if let Some(stem) = token.strip_suffix("zes") {
        // size, prize, breeze keep their `e`; buzz, waltz, blitz do not.
        return Some(if stem.ends_with('z') || stem.ends_with('t') {
            stem.to_string() + "z"
        } else {
            stem.to_string() + "ze"
        });
    }
    let singular = token.strip_suffix('s')?;
    let drops_e = (singular.ends_with("che") && !CHE_NOUNS.contains(&singular))
        || singular.ends_with("she")
        || singular.ends_with("xe");
    match singular.strip_suffix('e') {
        Some(stem) if drops_e => Some(stem.to_string()),
        _ => Some(singular.to_string()),
    }
}
