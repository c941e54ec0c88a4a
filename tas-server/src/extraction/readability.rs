//! Sentence statistics and readability formulas

use super::text::{is_numeric, sentences, syllables, words};
use crate::analysis::analyser::Metric;
use std::collections::{BTreeMap, BTreeSet};

/// Raw counts for a text
#[derive(Debug, Clone, PartialEq)]
pub struct TextStats {
    pub sentences: u64,
    pub words: u64,
    pub unique_words: u64,
    pub syllables: u64,
    /// Letters and digits
    pub characters: u64,
    /// Words of three or more syllables
    pub polysyllables: u64,
}

impl TextStats {
    /// `None` when the text has no words
    pub fn compute(text: &str) -> Option<Self> {
        let sentence_list = sentences(text);
        let mut stats = TextStats {
            sentences: sentence_list.len() as u64,
            words: 0,
            unique_words: 0,
            syllables: 0,
            characters: 0,
            polysyllables: 0,
        };
        let mut unique = BTreeSet::new();

        for word in sentence_list.iter().flat_map(|s| words(s)) {
            stats.words += 1;
            stats.characters += word.chars().filter(|c| c.is_alphanumeric()).count() as u64;
            unique.insert(word.to_lowercase());

            let count = if is_numeric(word) { 1 } else { syllables(word) as u64 };
            stats.syllables += count;
            if count >= 3 {
                stats.polysyllables += 1;
            }
        }
        stats.unique_words = unique.len() as u64;

        (stats.words > 0).then_some(stats)
    }

    fn words_per_sentence(&self) -> f64 {
        self.words as f64 / self.sentences.max(1) as f64
    }

    fn syllables_per_word(&self) -> f64 {
        self.syllables as f64 / self.words as f64
    }

    fn characters_per_word(&self) -> f64 {
        self.characters as f64 / self.words as f64
    }

    pub fn flesch_reading_ease(&self) -> f64 {
        206.835 - 1.015 * self.words_per_sentence() - 84.6 * self.syllables_per_word()
    }

    pub fn flesch_kincaid_grade(&self) -> f64 {
        0.39 * self.words_per_sentence() + 11.8 * self.syllables_per_word() - 15.59
    }

    pub fn gunning_fog(&self) -> f64 {
        0.4 * (self.words_per_sentence() + 100.0 * self.polysyllables as f64 / self.words as f64)
    }

    pub fn smog_index(&self) -> f64 {
        1.043 * (self.polysyllables as f64 * 30.0 / self.sentences.max(1) as f64).sqrt() + 3.1291
    }

    pub fn coleman_liau_index(&self) -> f64 {
        let letters_per_100 = self.characters_per_word() * 100.0;
        let sentences_per_100 = 100.0 / self.words_per_sentence();
        0.0588 * letters_per_100 - 0.296 * sentences_per_100 - 15.8
    }

    pub fn automated_readability_index(&self) -> f64 {
        4.71 * self.characters_per_word() + 0.5 * self.words_per_sentence() - 21.43
    }

    /// School grade band, e.g. "9th and 10th grade"
    pub fn text_standard(&self) -> String {
        let grade = self.flesch_kincaid_grade().round().max(0.0) as u64;
        format!("{} and {} grade", ordinal(grade), ordinal(grade + 1))
    }

    pub fn statistics(&self) -> BTreeMap<String, Metric> {
        BTreeMap::from([
            ("sentence_count".to_string(), Metric::Count(self.sentences)),
            ("word_count".to_string(), Metric::Count(self.words)),
            ("unique_word_count".to_string(), Metric::Count(self.unique_words)),
            ("syllable_count".to_string(), Metric::Count(self.syllables)),
            ("character_count".to_string(), Metric::Count(self.characters)),
            ("polysyllable_count".to_string(), Metric::Count(self.polysyllables)),
            (
                "average_words_per_sentence".to_string(),
                Metric::Real(round2(self.words_per_sentence())),
            ),
            (
                "average_syllables_per_word".to_string(),
                Metric::Real(round2(self.syllables_per_word())),
            ),
        ])
    }

    pub fn readability_scores(&self) -> BTreeMap<String, Metric> {
        BTreeMap::from([
            (
                "flesch_reading_ease".to_string(),
                Metric::Real(round2(self.flesch_reading_ease())),
            ),
            (
                "flesch_kincaid_grade".to_string(),
                Metric::Real(round2(self.flesch_kincaid_grade())),
            ),
            ("gunning_fog".to_string(), Metric::Real(round2(self.gunning_fog()))),
            ("smog_index".to_string(), Metric::Real(round2(self.smog_index()))),
            (
                "coleman_liau_index".to_string(),
                Metric::Real(round2(self.coleman_liau_index())),
            ),
            (
                "automated_readability_index".to_string(),
                Metric::Real(round2(self.automated_readability_index())),
            ),
            ("text_standard".to_string(), Metric::Label(self.text_standard())),
        ])
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn ordinal(n: u64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
