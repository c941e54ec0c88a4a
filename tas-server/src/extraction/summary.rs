//! Extractive summary
//!
//! Sentences are ranked by the mean RAKE score of their content words; the
//! best ones are returned in their original order.

use super::keywords::Rake;
use super::text::{sentences, words};

/// Sentences shorter than this are never picked
const MIN_SUMMARY_WORDS: usize = 4;

/// Up to `max_sentences` of the highest-ranked sentences, `None` for empty text
pub fn summarize(rake: &Rake, text: &str, max_sentences: usize) -> Option<String> {
    let all = sentences(text);
    if all.is_empty() || max_sentences == 0 {
        return None;
    }

    let scores = rake.word_scores(text);
    let mut ranked: Vec<(usize, f64)> = all
        .iter()
        .enumerate()
        .filter(|(_, s)| words(s).count() >= MIN_SUMMARY_WORDS)
        .map(|(i, s)| {
            let content: Vec<f64> = words(s)
                .filter_map(|w| scores.get(&w.to_lowercase()).copied())
                .collect();
            let score = if content.is_empty() {
                0.0
            } else {
                content.iter().sum::<f64>() / content.len() as f64
            };
            (i, score)
        })
        .collect();

    // Short texts: nothing long enough to rank, fall back to the opening
    if ranked.is_empty() {
        return Some(all.into_iter().take(max_sentences).collect::<Vec<_>>().join(" "));
    }

    ranked.sort_by(|(ia, a), (ib, b)| b.total_cmp(a).then_with(|| ia.cmp(ib)));
    let mut picked: Vec<usize> = ranked.into_iter().take(max_sentences).map(|(i, _)| i).collect();
    picked.sort_unstable();

    Some(
        picked
            .into_iter()
            .map(|i| all[i].as_str())
            .collect::<Vec<_>>()
            .join(" "),
    )
}
