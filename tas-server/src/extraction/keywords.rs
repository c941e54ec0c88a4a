//! RAKE keyword extraction
//!
//! Candidate phrases are the runs of words between stop words and
//! punctuation. Each word scores `degree / frequency`, a phrase scores the
//! sum of its words.

use super::text::{is_numeric, sentences, words};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Short English stop list, one entry per common function word
const SMART_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "although",
    "always", "am", "among", "an", "and", "another", "any", "anyone", "anything", "are", "around",
    "as", "at", "be", "became", "because", "become", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing",
    "done", "down", "during", "each", "either", "else", "enough", "even", "ever", "every",
    "few", "for", "from", "further", "get", "gets", "got", "had", "has", "have", "having", "he",
    "her", "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "it's", "its", "itself", "just", "least", "less", "let", "like", "made",
    "make", "many", "may", "me", "might", "more", "most", "much", "must", "my", "myself",
    "neither", "never", "no", "nor", "not", "now", "of", "off", "often", "on", "once", "one",
    "only", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over",
    "own", "per", "perhaps", "quite", "rather", "really", "same", "see", "seem", "seemed",
    "seems", "several", "shall", "she", "should", "since", "so", "some", "something", "still",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "therefore", "these", "they", "this", "those", "though", "through", "thus", "to", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "use", "used", "using", "very",
    "via", "was", "we", "well", "were", "what", "whatever", "when", "where", "whether", "which",
    "while", "who", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Minimal stop list: articles, conjunctions and prepositions
const FOX_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "he",
    "in", "is", "it", "its", "of", "on", "or", "that", "the", "their", "this", "to", "was",
    "were", "which", "will", "with",
];

/// Stop list identifiers accepted in configuration
pub const STOP_LISTS: &[&str] = &["SmartStoplist.txt", "FoxStoplist.txt"];

/// Look up a stop list by identifier (case-insensitive)
pub fn stop_list(name: &str) -> Option<&'static [&'static str]> {
    match name.trim().to_ascii_lowercase().as_str() {
        "smartstoplist.txt" | "smart" => Some(SMART_STOP_WORDS),
        "foxstoplist.txt" | "fox" => Some(FOX_STOP_WORDS),
        _ => None,
    }
}

/// Keyword extractor bound to one stop list
#[derive(Debug, Clone)]
pub struct Rake {
    stop_words: HashSet<&'static str>,
}

impl Rake {
    /// `None` when `stop_list_name` is not a known stop list
    pub fn new(stop_list_name: &str) -> Option<Self> {
        stop_list(stop_list_name).map(|list| Self {
            stop_words: list.iter().copied().collect(),
        })
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Candidate phrases, lowercased, in text order
    fn candidates(&self, text: &str) -> Vec<Vec<String>> {
        let mut phrases = Vec::new();

        for sentence in sentences(text) {
            // Punctuation inside a sentence also breaks phrases
            for fragment in sentence.split(|c: char| ",;:()[]\"“”|/".contains(c)) {
                let mut current: Vec<String> = Vec::new();
                for word in words(fragment) {
                    let word = word.to_lowercase();
                    if self.is_stop_word(&word) || is_numeric(&word) {
                        if !current.is_empty() {
                            phrases.push(std::mem::take(&mut current));
                        }
                    } else {
                        current.push(word);
                    }
                }
                if !current.is_empty() {
                    phrases.push(current);
                }
            }
        }

        phrases
    }

    /// Phrases with their scores, best first
    ///
    /// Ties are broken alphabetically, so output is stable for a given text.
    pub fn run(&self, text: &str) -> Vec<(String, f64)> {
        let phrases = self.candidates(text);
        let word_scores = score_words(&phrases);

        let mut scored: BTreeMap<String, f64> = BTreeMap::new();
        for phrase in &phrases {
            let score = phrase.iter().map(|w| word_scores[w.as_str()]).sum();
            scored.insert(phrase.join(" "), score);
        }

        let mut keywords: Vec<(String, f64)> = scored.into_iter().collect();
        keywords.sort_by(|(pa, a), (pb, b)| b.total_cmp(a).then_with(|| pa.cmp(pb)));
        keywords
    }

    /// Word → RAKE word score, for ranking sentences
    pub fn word_scores(&self, text: &str) -> HashMap<String, f64> {
        score_words(&self.candidates(text))
            .into_iter()
            .map(|(word, score)| (word.to_string(), score))
            .collect()
    }
}

fn score_words(phrases: &[Vec<String>]) -> HashMap<&str, f64> {
    let mut frequency: HashMap<&str, f64> = HashMap::new();
    let mut degree: HashMap<&str, f64> = HashMap::new();
    for phrase in phrases {
        let extra = (phrase.len() - 1) as f64;
        for word in phrase {
            *frequency.entry(word.as_str()).or_default() += 1.0;
            *degree.entry(word.as_str()).or_default() += extra;
        }
    }

    frequency
        .into_iter()
        .map(|(word, freq)| (word, (degree[word] + freq) / freq))
        .collect()
}
