//! Scoring matrices over language-specific sounds and their combination.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ndarray::Array2;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::ScorerConfig;
use crate::error::{LexStatError, Result};
use crate::freqs::{Alphabet, FrequencyTables};
use crate::sound_class::ClassModel;
use crate::types::ScorerMethod;

/// Co-occurrence counts of aligned sounds for one doculect pair.
///
/// Keys are unordered: `(a, b)` and `(b, a)` share a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrespondenceCounts {
    pairs: FxHashMap<(usize, usize), u64>,
    total: u64,
}

impl CorrespondenceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: usize, b: usize) -> (usize, usize) {
        (a.min(b), a.max(b))
    }

    pub fn record(&mut self, a: usize, b: usize) {
        *self.pairs.entry(Self::key(a, b)).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn merge(&mut self, other: CorrespondenceCounts) {
        for (key, count) in other.pairs {
            *self.pairs.entry(key).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn count(&self, a: usize, b: usize) -> u64 {
        self.pairs.get(&Self::key(a, b)).copied().unwrap_or(0)
    }

    /// Number of aligned sound pairs recorded
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Share of all recorded pairs that are `(a, b)`; 0 when nothing was recorded
    pub fn probability(&self, a: usize, b: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(a, b) as f64 / self.total as f64
        }
    }
}

/// Counts for every doculect pair `(a, b)` with `a <= b`
pub type PairCounts = BTreeMap<(usize, usize), CorrespondenceCounts>;

/// Dense symmetric matrix of scores between language-specific sounds
#[derive(Debug, Clone)]
pub struct ScoringMatrix {
    alphabet: Alphabet,
    values: Array2<f64>,
}

impl ScoringMatrix {
    pub fn zeros(alphabet: Alphabet) -> Self {
        let n = alphabet.len();
        Self {
            alphabet,
            values: Array2::zeros((n, n)),
        }
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.values[[a, b]]
    }

    pub(crate) fn set(&mut self, a: usize, b: usize, value: f64) {
        self.values[[a, b]] = value;
        self.values[[b, a]] = value;
    }

    /// Score of two sounds by symbol, e.g. `score("0.S.#", "1.S.#")`
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        let a = self.alphabet.index_of(a)?;
        let b = self.alphabet.index_of(b)?;
        Some(self.get(a, b))
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn len(&self) -> usize {
        self.alphabet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alphabet.is_empty()
    }

    /// Nested `{sound: {sound: score}}` view with sorted keys
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let symbols = self.alphabet.symbols();
        symbols
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let row = symbols
                    .iter()
                    .enumerate()
                    .map(|(j, b)| (b.clone(), self.values[[i, j]]))
                    .collect();
                (a.clone(), row)
            })
            .collect()
    }

    /// Rebuild from the nested map form; absent cells score 0
    pub fn from_map(map: &BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        let alphabet = Alphabet::from_symbols(
            map.iter()
                .flat_map(|(a, row)| std::iter::once(a.clone()).chain(row.keys().cloned())),
        );
        let mut matrix = Self::zeros(alphabet);
        for (a, row) in map {
            for (b, &value) in row {
                if let (Some(i), Some(j)) =
                    (matrix.alphabet.index_of(a), matrix.alphabet.index_of(b))
                {
                    matrix.values[[i, j]] = value;
                }
            }
        }
        matrix
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_map())?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let map: BTreeMap<String, BTreeMap<String, f64>> = serde_json::from_str(content)?;
        Ok(Self::from_map(&map))
    }

    /// One `a<TAB>b<TAB>score` line per unordered pair, sorted by symbol
    pub fn to_tsv(&self) -> String {
        let symbols = self.alphabet.symbols();
        let mut out = String::new();
        for i in 0..symbols.len() {
            for j in i..symbols.len() {
                out.push_str(&format!(
                    "{}\t{}\t{:.6}\n",
                    symbols[i], symbols[j], self.values[[i, j]]
                ));
            }
        }
        out
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// The three matrices of one scorer build
#[derive(Debug, Clone)]
pub struct Scorer {
    /// Probability of each correspondence among attested word pairs
    pub attested: ScoringMatrix,
    /// Probability of each correspondence among unrelated word pairs
    pub random: ScoringMatrix,
    /// Weighted log-odds used for alignment
    pub combined: ScoringMatrix,
    pub method: ScorerMethod,
    pub config: ScorerConfig,
}

/// Merge attested and random counts into the three matrices.
///
/// Every pair of sounds whose doculects form a pair in `attested` or
/// `random` receives a combined score, so the result is complete for
/// corpora whose doculect pairs were all estimated.
pub fn combine(
    tables: &FrequencyTables,
    attested: &PairCounts,
    random: &PairCounts,
    config: &ScorerConfig,
    model: &ClassModel,
) -> Result<Scorer> {
    config.validate()?;
    let floor = config.min_probability;
    let (lexstat_weight, class_weight) = config.ratio;
    let weight_sum = lexstat_weight + class_weight;

    let empty = CorrespondenceCounts::new();
    let mut attested_matrix = ScoringMatrix::zeros(tables.chars().clone());
    let mut random_matrix = ScoringMatrix::zeros(tables.chars().clone());
    let mut combined = ScoringMatrix::zeros(tables.chars().clone());

    let mut doculect_pairs: Vec<(usize, usize)> =
        attested.keys().chain(random.keys()).copied().collect();
    doculect_pairs.sort_unstable();
    doculect_pairs.dedup();

    for (doc_a, doc_b) in doculect_pairs {
        let att = attested.get(&(doc_a, doc_b)).unwrap_or(&empty);
        let rnd = random.get(&(doc_a, doc_b)).unwrap_or(&empty);
        if rnd.total() == 0 {
            debug!(doc_a, doc_b, "No random correspondences, log-odds fall back to the floor");
        }

        for &x in tables.doculect_chars(doc_a) {
            for &y in tables.doculect_chars(doc_b) {
                let p_att = att.probability(x, y);
                let p_rnd = rnd.probability(x, y);
                let log_odds = (p_att.max(floor) / p_rnd.max(floor)).log2();
                let class_score =
                    model.score(tables.char_info(x).class, tables.char_info(y).class);
                let score = (lexstat_weight * log_odds + class_weight * class_score) / weight_sum;

                attested_matrix.set(x, y, p_att);
                random_matrix.set(x, y, p_rnd);
                combined.set(x, y, score);
            }
        }
    }

    if combined.values.iter().any(|v| !v.is_finite()) {
        return Err(LexStatError::invalid_parameter(
            "combined scorer contains non-finite values",
        ));
    }

    Ok(Scorer {
        attested: attested_matrix,
        random: random_matrix,
        combined,
        method: config.method,
        config: config.clone(),
    })
}
