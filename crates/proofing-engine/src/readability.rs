//! Readability scoring over the normalized text.

use shared_types::ReadabilityMetrics;
use unicode_segmentation::UnicodeSegmentation;

/// Computes the scalar readability snapshot for a text.
pub trait ReadabilityProvider: Send + Sync {
    /// Metrics for `text`. Degenerate input yields the defaulted snapshot,
    /// never an error.
    fn metrics(&self, text: &str) -> ReadabilityMetrics;
}

/// Formula-based scorer over syllable, word, and sentence counts.
///
/// Syllables come from a vowel-group heuristic, and the Dale-Chall easy-word
/// list is approximated by the polysyllable test, so absolute values differ
/// slightly from dictionary-backed implementations while relative ordering
/// holds.
#[derive(Debug, Default)]
pub struct HeuristicReadability;

struct TextCounts {
    words: usize,
    sentences: usize,
    letters: usize,
    syllables: usize,
    polysyllables: usize,
}

fn count_text(text: &str) -> TextCounts {
    let mut counts = TextCounts {
        words: 0,
        sentences: 0,
        letters: 0,
        syllables: 0,
        polysyllables: 0,
    };

    for word in text.unicode_words() {
        counts.words += 1;
        counts.letters += word.chars().filter(|c| c.is_alphanumeric()).count();
        let syllables = syllable_count(word);
        counts.syllables += syllables;
        if syllables >= 3 {
            counts.polysyllables += 1;
        }
    }

    counts.sentences = text
        .split_sentence_bounds()
        .filter(|s| !s.trim().is_empty())
        .count();

    counts
}

/// Vowel-group syllable estimate with a silent-e adjustment; always at
/// least one per word.
fn syllable_count(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;
    for c in lower.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

fn ordinal(n: i64) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Consensus grade label from the individual grade estimates, e.g.
/// "8th and 9th grade".
fn consensus_grade(grades: &[f64]) -> String {
    let mut rounded: Vec<i64> = grades.iter().map(|g| g.round().max(0.0) as i64).collect();
    rounded.sort_unstable();
    let median = rounded[rounded.len() / 2];
    format!("{} and {} grade", ordinal(median), ordinal(median + 1))
}

impl ReadabilityProvider for HeuristicReadability {
    fn metrics(&self, text: &str) -> ReadabilityMetrics {
        if text.trim().is_empty() {
            return ReadabilityMetrics::default();
        }
        let counts = count_text(text);
        if counts.words == 0 {
            return ReadabilityMetrics::default();
        }

        let words = counts.words as f64;
        let sentences = counts.sentences.max(1) as f64;
        let syllables = counts.syllables as f64;
        let letters = counts.letters as f64;
        let poly = counts.polysyllables as f64;

        let words_per_sentence = words / sentences;
        let syllables_per_word = syllables / words;

        let flesch_reading_ease =
            206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
        let flesch_kincaid_grade =
            0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
        let smog_index = 1.043 * (poly * 30.0 / sentences).sqrt() + 3.1291;

        let letters_per_100 = letters / words * 100.0;
        let sentences_per_100 = sentences / words * 100.0;
        let coleman_liau_index = 0.0588 * letters_per_100 - 0.296 * sentences_per_100 - 15.8;

        let automated_readability_index =
            4.71 * (letters / words) + 0.5 * words_per_sentence - 21.43;
        let gunning_fog = 0.4 * (words_per_sentence + 100.0 * poly / words);

        let pct_difficult = poly / words * 100.0;
        let mut dale_chall_readability_score =
            0.1579 * pct_difficult + 0.0496 * words_per_sentence;
        if pct_difficult > 5.0 {
            dale_chall_readability_score += 3.6365;
        }

        // Linsear Write: easy words score 1, polysyllabic words score 3
        let provisional = ((words - poly) + 3.0 * poly) / sentences;
        let linsear_write_formula = if provisional > 20.0 {
            provisional / 2.0
        } else {
            (provisional - 2.0) / 2.0
        };

        let text_standard = consensus_grade(&[
            flesch_kincaid_grade,
            gunning_fog,
            smog_index,
            coleman_liau_index,
            automated_readability_index,
            linsear_write_formula,
        ]);

        ReadabilityMetrics {
            flesch_reading_ease,
            smog_index,
            flesch_kincaid_grade,
            coleman_liau_index,
            automated_readability_index,
            dale_chall_readability_score,
            difficult_words: counts.polysyllables as u32,
            linsear_write_formula,
            gunning_fog,
            text_standard,
        }
    }
}
