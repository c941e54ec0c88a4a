//! Sentence and word tokenization

use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'’]*(?:-[\p{L}\p{N}]+)*").expect("Valid word regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Valid whitespace regex"));

/// Abbreviations that end in a period without ending the sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "co", "no", "fig",
];

/// Collapse runs of whitespace to a single space and trim
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Split text into sentences
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace, or at a line
/// break. Known abbreviations do not end a sentence.
pub fn sentences(text: &str) -> Vec<String> {
    let mut result = Vec::new();

    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            current.push(c);
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let at_boundary = chars.get(i + 1).map_or(true, |next| next.is_whitespace());
            if at_boundary && !(c == '.' && ends_with_abbreviation(&current)) {
                push_sentence(&mut result, &current);
                current.clear();
            }
        }
        push_sentence(&mut result, &current);
    }

    result
}

fn push_sentence(result: &mut Vec<String>, raw: &str) {
    let sentence = collapse_whitespace(raw);
    if words(&sentence).next().is_some() {
        result.push(sentence);
    }
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    let last = fragment
        .trim_end_matches('.')
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .to_lowercase();
    ABBREVIATIONS.contains(&last.as_str())
}

/// Words in `text`, in order, with their original casing
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text).map(|m| m.as_str())
}

/// True when the word has no letters
pub fn is_numeric(word: &str) -> bool {
    !word.chars().any(char::is_alphabetic)
}

/// Estimated syllable count of an English word (at least 1)
pub fn syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    // Silent trailing "e", but not "-le" as in "table"
    let n = letters.len();
    if count > 1 && letters[n - 1] == 'e' && !(n > 2 && letters[n - 2] == 'l' && !is_vowel(letters[n - 3])) {
        count -= 1;
    }

    count.max(1)
}
