//! Correspondence counts over attested word pairs.
//!
//! Words sharing a concept are aligned with the sound-class model and every
//! aligned column contributes one count for its pair of language-specific
//! sounds. Gap columns are not counted.

use rayon::prelude::*;
use tracing::debug;

use crate::freqs::FrequencyTables;
use crate::phonetic::ScaDistance;
use crate::scorer::{CorrespondenceCounts, PairCounts};
use crate::segments::EncodedWord;

/// Aligns char sequences by the classes of their sounds
pub(crate) struct CharAligner {
    sca: ScaDistance,
    classes: Vec<char>,
}

impl CharAligner {
    pub fn new(sca: ScaDistance, tables: &FrequencyTables) -> Self {
        let classes = (0..tables.alphabet_size())
            .map(|idx| tables.char_info(idx).class)
            .collect();
        Self { sca, classes }
    }

    pub fn classes(&self, chars: &[usize]) -> Vec<char> {
        chars.iter().map(|&c| self.classes[c]).collect()
    }

    /// Align two sequences and record every non-gap column
    pub fn count(&self, a: &[usize], b: &[usize], counts: &mut CorrespondenceCounts) {
        let (_, columns) = self.sca.path(&self.classes(a), &self.classes(b));
        for column in columns {
            if let (Some(i), Some(j)) = column {
                counts.record(a[i], b[j]);
            }
        }
    }
}

/// All doculect pairs `(a, b)` with `a <= b`, in order
pub fn doculect_pairs(n_doculects: usize) -> Vec<(usize, usize)> {
    (0..n_doculects)
        .flat_map(|a| (a..n_doculects).map(move |b| (a, b)))
        .collect()
}

/// Counts over word pairs that share a concept.
///
/// `concepts` holds the valid words of each concept. For a pair of distinct
/// doculects every cross pair of their words is aligned; within one
/// doculect each word is aligned with itself. With `threshold`, pairs
/// whose class-model distance exceeds it are skipped.
pub(crate) fn attested_counts(
    concepts: &[Vec<&EncodedWord>],
    n_doculects: usize,
    aligner: &CharAligner,
    threshold: Option<f64>,
) -> PairCounts {
    doculect_pairs(n_doculects)
        .into_par_iter()
        .map(|(doc_a, doc_b)| {
            let mut counts = CorrespondenceCounts::new();
            let mut skipped = 0usize;
            for words in concepts {
                for a in words.iter().filter(|w| w.doculect == doc_a) {
                    if doc_a == doc_b {
                        aligner.count(&a.chars, &a.chars, &mut counts);
                        continue;
                    }
                    for b in words.iter().filter(|w| w.doculect == doc_b) {
                        if let Some(threshold) = threshold {
                            let distance =
                                aligner.sca.class_distance(&a.word.classes, &b.word.classes);
                            if distance > threshold {
                                skipped += 1;
                                continue;
                            }
                        }
                        aligner.count(&a.chars, &b.chars, &mut counts);
                    }
                }
            }
            if skipped > 0 {
                debug!(doc_a, doc_b, skipped, "Skipped dissimilar attested pairs");
            }
            ((doc_a, doc_b), counts)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlignmentConfig;
    use crate::segments::{tokenize, Word};

    fn corpus() -> (FrequencyTables, Vec<EncodedWord>) {
        let raw = [(0, "swar"), (0, "ivniN"), (1, "sware"), (1, "afd3n")];
        let words: Vec<(usize, Word)> = raw
            .iter()
            .map(|(d, s)| (*d, Word::from_segments(tokenize(s)).unwrap()))
            .collect();
        let tables = FrequencyTables::build(2, words.iter().map(|(d, w)| (*d, w)));
        let encoded = words
            .into_iter()
            .map(|(doculect, word)| EncodedWord {
                doculect,
                chars: tables.encode(doculect, &word).unwrap(),
                word,
            })
            .collect();
        (tables, encoded)
    }

    #[test]
    fn test_doculect_pairs() {
        assert_eq!(doculect_pairs(2), vec![(0, 0), (0, 1), (1, 1)]);
        assert_eq!(doculect_pairs(3).len(), 6);
    }

    #[test]
    fn test_attested_counts() {
        let (tables, words) = corpus();
        let aligner = CharAligner::new(ScaDistance::new(AlignmentConfig::default()), &tables);
        // concept 0: swar / sware, concept 1: ivniN / afd3n
        let concepts = vec![vec![&words[0], &words[2]], vec![&words[1], &words[3]]];
        let counts = attested_counts(&concepts, 2, &aligner, None);

        assert_eq!(counts.len(), 3);
        // self-alignments: 4 + 5 sounds in doculect 0
        assert_eq!(counts[&(0, 0)].total(), 9);
        let s0 = tables.chars().index_of("0.S.#").unwrap();
        let s1 = tables.chars().index_of("1.S.#").unwrap();
        assert_eq!(counts[&(0, 1)].count(s0, s1), 1);
        assert_eq!(counts[&(0, 0)].count(s0, s0), 1);

        let filtered = attested_counts(&concepts, 2, &aligner, Some(0.3));
        assert!(filtered[&(0, 1)].total() < counts[&(0, 1)].total());
        assert_eq!(filtered[&(0, 1)].count(s0, s1), 1);
    }
}
