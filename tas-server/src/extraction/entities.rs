//! Heuristic named-entity tagging
//!
//! Runs of capitalized words are entity candidates. The tag comes from the
//! words around them: honorifics mark people, corporate suffixes mark
//! organizations. Dates, money and percentages are matched by pattern.

use super::text::sentences;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

pub const PERSON: &str = "PERSON";
pub const ORGANIZATION: &str = "ORGANIZATION";
pub const DATE: &str = "DATE";
pub const MONEY: &str = "MONEY";
pub const PERCENT: &str = "PERCENT";
/// Capitalized phrase that matched no more specific rule
pub const PROPER_NOUN: &str = "PROPER_NOUN";

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?(?:,\s*\d{4})?|\d{1,2}\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)(?:\s+\d{4})?|\d{4}-\d{2}-\d{2})\b",
    )
    .expect("Valid date regex")
});

static MONEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[$€£]\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:million|billion|thousand))?")
        .expect("Valid money regex")
});

static PERCENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\s?(?:%|percent\b)").expect("Valid percent regex"));

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'’&.-]*").expect("Valid token regex"));

const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "sir", "president", "senator"];

const ORGANIZATION_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "plc", "gmbh", "company", "co", "group",
    "university", "institute", "foundation", "agency", "association", "bank",
];

/// Capitalized words that never start an entity on their own
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "it", "he", "she", "we", "they", "i",
    "in", "on", "at", "for", "but", "and", "or", "if", "when", "while", "after", "before", "as",
    "his", "her", "their", "our", "my", "your", "there", "here", "yes", "no",
];

/// Entity tag → sorted, de-duplicated entity strings
pub type Entities = BTreeMap<String, BTreeSet<String>>;

/// Tag the entities in `text`; `None` when nothing is found
pub fn extract(text: &str) -> Option<Entities> {
    let mut entities = Entities::new();
    let mut add = |tag: &str, value: &str| {
        let value = value.trim().trim_end_matches(['.', ',']).to_string();
        if !value.is_empty() {
            entities.entry(tag.to_string()).or_default().insert(value);
        }
    };

    for m in DATE_PATTERN.find_iter(text) {
        add(DATE, m.as_str());
    }
    for m in MONEY_PATTERN.find_iter(text) {
        add(MONEY, m.as_str());
    }
    for m in PERCENT_PATTERN.find_iter(text) {
        add(PERCENT, m.as_str());
    }

    for sentence in sentences(text) {
        for (tag, phrase) in capitalized_phrases(&sentence) {
            add(tag, &phrase);
        }
    }

    (!entities.is_empty()).then_some(entities)
}

fn normalized(token: &str) -> String {
    token.trim_end_matches('.').to_lowercase()
}

fn is_capitalized(token: &str) -> bool {
    token.chars().next().map_or(false, char::is_uppercase)
}

fn is_month(token: &str) -> bool {
    DATE_PATTERN.is_match(&format!("{} 1", token.trim_end_matches('.')))
}

/// Capitalized runs within one sentence, with their tags
fn capitalized_phrases(sentence: &str) -> Vec<(&'static str, String)> {
    let tokens: Vec<&str> = TOKEN.find_iter(sentence).map(|m| m.as_str()).collect();
    let mut found = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        let lower = normalized(token);
        let skip = !is_capitalized(token)
            || HONORIFICS.contains(&lower.as_str())
            || (i == 0 && FUNCTION_WORDS.contains(&lower.as_str()))
            || is_month(token);
        if skip {
            i += 1;
            continue;
        }

        let start = i;
        while i < tokens.len()
            && is_capitalized(tokens[i])
            && !is_month(tokens[i])
            && !HONORIFICS.contains(&normalized(tokens[i]).as_str())
        {
            let ends_phrase = tokens[i].ends_with('.')
                && !ORGANIZATION_SUFFIXES.contains(&normalized(tokens[i]).as_str());
            i += 1;
            if ends_phrase {
                break;
            }
        }
        let run = &tokens[start..i];

        // A lone capitalized word opening a sentence is usually not a name
        if start == 0 && run.len() == 1 {
            continue;
        }

        let preceded_by_honorific = start > 0
            && HONORIFICS.contains(&normalized(tokens[start - 1]).as_str());
        let last = normalized(run[run.len() - 1]);

        let tag = if preceded_by_honorific {
            PERSON
        } else if run.len() > 1 && ORGANIZATION_SUFFIXES.contains(&last.as_str()) {
            ORGANIZATION
        } else {
            PROPER_NOUN
        };

        found.push((tag, run.join(" ")));
    }

    found
}
