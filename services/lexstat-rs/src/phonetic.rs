//! Pairwise word alignment and the distance kernels built on it.

use ndarray::Array2;
use rayon::prelude::*;

use crate::config::AlignmentConfig;
use crate::error::{LexStatError, Result};
use crate::scorer::ScoringMatrix;
use crate::segments::{EncodedWord, Word};
use crate::sound_class::{dolgopolsky_class, is_vowel_class, ClassModel};
use crate::types::{Alignment, EditOp, Method, GAP};

/// One alignment column: positions in the first and second word, `None` for a gap
pub type Column = (Option<usize>, Option<usize>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Match,
    GapB,
    GapA,
}

/// Affine-gap dynamic programming tables.
///
/// `m` ends in an aligned pair, `x` in a gap in the second word, `y` in a
/// gap in the first word.
struct Tables {
    m: Array2<f64>,
    x: Array2<f64>,
    y: Array2<f64>,
}

fn best_of(candidates: [(f64, State); 3]) -> (f64, State) {
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 > best.0 {
            best = *candidate;
        }
    }
    best
}

fn fill<F>(n: usize, m: usize, gap: &AlignmentConfig, score: &F) -> Tables
where
    F: Fn(usize, usize) -> f64,
{
    let open = gap.gap_open;
    let extend = gap.gap_extend();
    let mut tables = Tables {
        m: Array2::from_elem((n + 1, m + 1), f64::NEG_INFINITY),
        x: Array2::from_elem((n + 1, m + 1), f64::NEG_INFINITY),
        y: Array2::from_elem((n + 1, m + 1), f64::NEG_INFINITY),
    };
    tables.m[[0, 0]] = 0.0;

    for i in 0..=n {
        for j in 0..=m {
            if i == 0 && j == 0 {
                continue;
            }
            if i > 0 && j > 0 {
                let (prev, _) = tables.diagonal(i - 1, j - 1);
                tables.m[[i, j]] = prev + score(i - 1, j - 1);
            }
            if i > 0 {
                tables.x[[i, j]] = tables.from_above(i - 1, j, open, extend).0;
            }
            if j > 0 {
                tables.y[[i, j]] = tables.from_left(i, j - 1, open, extend).0;
            }
        }
    }
    tables
}

impl Tables {
    fn diagonal(&self, i: usize, j: usize) -> (f64, State) {
        best_of([
            (self.m[[i, j]], State::Match),
            (self.x[[i, j]], State::GapB),
            (self.y[[i, j]], State::GapA),
        ])
    }

    fn from_above(&self, i: usize, j: usize, open: f64, extend: f64) -> (f64, State) {
        best_of([
            (self.m[[i, j]] + open, State::Match),
            (self.x[[i, j]] + extend, State::GapB),
            (self.y[[i, j]] + open, State::GapA),
        ])
    }

    fn from_left(&self, i: usize, j: usize, open: f64, extend: f64) -> (f64, State) {
        best_of([
            (self.m[[i, j]] + open, State::Match),
            (self.x[[i, j]] + open, State::GapB),
            (self.y[[i, j]] + extend, State::GapA),
        ])
    }
}

/// Global alignment score of two sequences of lengths `n` and `m`.
///
/// `score(i, j)` scores position `i` of the first sequence against
/// position `j` of the second. Swapping the sequences (and the arguments
/// of `score`) yields the identical score.
pub fn align_score<F>(n: usize, m: usize, gap: &AlignmentConfig, score: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    fill(n, m, gap, &score).diagonal(n, m).0
}

/// Global alignment score with the optimal column path
pub fn align_path<F>(n: usize, m: usize, gap: &AlignmentConfig, score: F) -> (f64, Vec<Column>)
where
    F: Fn(usize, usize) -> f64,
{
    let tables = fill(n, m, gap, &score);
    let open = gap.gap_open;
    let extend = gap.gap_extend();
    let (total, mut state) = tables.diagonal(n, m);

    let mut columns = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        match state {
            State::Match => {
                columns.push((Some(i - 1), Some(j - 1)));
                i -= 1;
                j -= 1;
                state = tables.diagonal(i, j).1;
            }
            State::GapB => {
                columns.push((Some(i - 1), None));
                i -= 1;
                state = tables.from_above(i, j, open, extend).1;
            }
            State::GapA => {
                columns.push((None, Some(j - 1)));
                j -= 1;
                state = tables.from_left(i, j, open, extend).1;
            }
        }
    }
    columns.reverse();
    (total, columns)
}

/// `1 - 2·sab / (saa + sbb)`, clamped to [0, 1]
pub fn normalized_distance(sab: f64, saa: f64, sbb: f64) -> f64 {
    let denominator = saa + sbb;
    if !(denominator > 0.0) {
        return 1.0;
    }
    (1.0 - 2.0 * sab / denominator).clamp(0.0, 1.0)
}

/// Standard Levenshtein distance using dynamic programming
pub fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let len_a = a.len();
    let len_b = b.len();

    if len_a == 0 {
        return len_b;
    }
    if len_b == 0 {
        return len_a;
    }

    let mut prev_row: Vec<usize> = (0..=len_b).collect();
    let mut curr_row = vec![0; len_b + 1];

    for (i, seg_a) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, seg_b) in b.iter().enumerate() {
            let cost = if seg_a == seg_b { 0 } else { 1 };

            curr_row[j + 1] = std::cmp::min(
                std::cmp::min(curr_row[j] + 1, prev_row[j + 1] + 1),
                prev_row[j] + cost,
            );
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len_b]
}

/// Levenshtein distance divided by the longer length
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        0.0
    } else {
        levenshtein(a, b) as f64 / max_len as f64
    }
}

/// First two consonant classes of a word, padded with `H`.
///
/// A word-initial vowel counts as the glottal class `H`.
pub fn turchin_classes(classes: &[char]) -> [char; 2] {
    let mut key = ['H'; 2];
    let mut filled = 0;
    for (idx, &class) in classes.iter().enumerate() {
        let reduced = if idx == 0 && is_vowel_class(class) {
            Some('H')
        } else {
            dolgopolsky_class(class)
        };
        if let Some(reduced) = reduced {
            key[filled] = reduced;
            filled += 1;
            if filled == key.len() {
                break;
            }
        }
    }
    key
}

/// Distance between two encoded words of one concept
pub trait PairwiseDistance: Sync {
    fn distance(&self, a: &EncodedWord, b: &EncodedWord) -> f64;

    /// Optimal alignment, for kernels that align
    fn align(&self, _a: &EncodedWord, _b: &EncodedWord) -> Option<Alignment> {
        None
    }
}

fn build_alignment(a: &Word, b: &Word, columns: &[Column], score: f64) -> Alignment {
    let mut sequence_a = Vec::with_capacity(columns.len());
    let mut sequence_b = Vec::with_capacity(columns.len());
    let mut operations = Vec::with_capacity(columns.len());
    for column in columns {
        let (seg_a, seg_b, op) = match *column {
            (Some(i), Some(j)) => {
                let op = if a.segments[i] == b.segments[j] {
                    EditOp::Match
                } else {
                    EditOp::Substitute
                };
                (a.segments[i].clone(), b.segments[j].clone(), op)
            }
            (Some(i), None) => (a.segments[i].clone(), GAP.to_string(), EditOp::Delete),
            (None, Some(j)) => (GAP.to_string(), b.segments[j].clone(), EditOp::Insert),
            (None, None) => continue,
        };
        sequence_a.push(seg_a);
        sequence_b.push(seg_b);
        operations.push(op);
    }
    Alignment::new(sequence_a, sequence_b, operations, score)
}

/// Alignment under the combined log-odds scorer
pub struct LexStatDistance<'a> {
    pub matrix: &'a ScoringMatrix,
    pub gap: AlignmentConfig,
}

impl LexStatDistance<'_> {
    fn score(&self, a: &[usize], b: &[usize]) -> f64 {
        align_score(a.len(), b.len(), &self.gap, |i, j| self.matrix.get(a[i], b[j]))
    }
}

impl PairwiseDistance for LexStatDistance<'_> {
    fn distance(&self, a: &EncodedWord, b: &EncodedWord) -> f64 {
        if a.chars.is_empty() || b.chars.is_empty() {
            return 1.0;
        }
        // identical sounds, whatever the scorer says about them
        if a.chars == b.chars {
            return 0.0;
        }
        normalized_distance(
            self.score(&a.chars, &b.chars),
            self.score(&a.chars, &a.chars),
            self.score(&b.chars, &b.chars),
        )
    }

    fn align(&self, a: &EncodedWord, b: &EncodedWord) -> Option<Alignment> {
        let (score, columns) = align_path(a.chars.len(), b.chars.len(), &self.gap, |i, j| {
            self.matrix.get(a.chars[i], b.chars[j])
        });
        Some(build_alignment(&a.word, &b.word, &columns, score))
    }
}

/// Alignment under the fixed sound-class model
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaDistance {
    pub model: ClassModel,
    pub gap: AlignmentConfig,
}

impl ScaDistance {
    pub fn new(gap: AlignmentConfig) -> Self {
        Self {
            model: ClassModel::default(),
            gap,
        }
    }

    pub fn score(&self, a: &[char], b: &[char]) -> f64 {
        align_score(a.len(), b.len(), &self.gap, |i, j| self.model.score(a[i], b[j]))
    }

    pub fn path(&self, a: &[char], b: &[char]) -> (f64, Vec<Column>) {
        align_path(a.len(), b.len(), &self.gap, |i, j| self.model.score(a[i], b[j]))
    }

    /// Distance over bare class sequences
    pub fn class_distance(&self, a: &[char], b: &[char]) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 1.0;
        }
        if a == b {
            return 0.0;
        }
        normalized_distance(self.score(a, b), self.score(a, a), self.score(b, b))
    }
}

impl PairwiseDistance for ScaDistance {
    fn distance(&self, a: &EncodedWord, b: &EncodedWord) -> f64 {
        self.class_distance(&a.word.classes, &b.word.classes)
    }

    fn align(&self, a: &EncodedWord, b: &EncodedWord) -> Option<Alignment> {
        let (score, columns) = self.path(&a.word.classes, &b.word.classes);
        Some(build_alignment(&a.word, &b.word, &columns, score))
    }
}

/// Normalized edit distance over raw segments
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistance;

impl PairwiseDistance for EditDistance {
    fn distance(&self, a: &EncodedWord, b: &EncodedWord) -> f64 {
        edit_distance(&a.word.segments, &b.word.segments)
    }
}

/// 0 when the first two consonant classes agree, else 1
#[derive(Debug, Clone, Copy, Default)]
pub struct TurchinDistance;

impl PairwiseDistance for TurchinDistance {
    fn distance(&self, a: &EncodedWord, b: &EncodedWord) -> f64 {
        if turchin_classes(&a.word.classes) == turchin_classes(&b.word.classes) {
            0.0
        } else {
            1.0
        }
    }
}

/// Distance kernel for a method.
///
/// `lexstat` needs the combined scorer; requesting it without one fails
/// with a precondition error.
pub fn kernel<'a>(
    method: Method,
    scorer: Option<&'a ScoringMatrix>,
    gap: AlignmentConfig,
) -> Result<Box<dyn PairwiseDistance + 'a>> {
    Ok(match method {
        Method::LexStat => {
            let matrix = scorer.ok_or_else(|| {
                LexStatError::precondition("method 'lexstat' requires a scorer, call get_scorer first")
            })?;
            Box::new(LexStatDistance { matrix, gap })
        }
        Method::Sca => Box::new(ScaDistance::new(gap)),
        Method::EditDist => Box::new(EditDistance),
        Method::Turchin => Box::new(TurchinDistance),
    })
}

/// Batch compute distances for multiple pairs (parallelized)
pub fn batch_distance(
    kernel: &dyn PairwiseDistance,
    pairs: &[(&EncodedWord, &EncodedWord)],
) -> Vec<f64> {
    pairs
        .par_iter()
        .map(|(a, b)| kernel.distance(a, b))
        .collect()
}

/// Symmetric distance matrix for a batch of words
pub fn distance_matrix(kernel: &dyn PairwiseDistance, words: &[&EncodedWord]) -> Array2<f64> {
    let n = words.len();
    let mut matrix = Array2::<f64>::zeros((n, n));

    // Compute upper triangle (parallel)
    let pairs: Vec<_> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();

    let distances: Vec<_> = pairs
        .par_iter()
        .map(|&(i, j)| kernel.distance(words[i], words[j]))
        .collect();

    for (&(i, j), &dist) in pairs.iter().zip(&distances) {
        matrix[[i, j]] = dist;
        matrix[[j, i]] = dist;
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::tokenize;

    fn encoded(s: &str) -> EncodedWord {
        let word = Word::from_segments(tokenize(s)).unwrap();
        let chars = (0..word.len()).collect();
        EncodedWord {
            doculect: 0,
            word,
            chars,
        }
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein(&["h", "a", "n", "d"], &["h", "a", "n", "d"]), 0);
        assert_eq!(levenshtein(&['k', 'a', 't'], &['k', 'a']), 1);
        assert_eq!(edit_distance(&["x", "y", "z"], &["h", "a", "n", "d"]), 1.0);
        assert_eq!(edit_distance::<&str>(&[], &[]), 0.0);
    }

    #[test]
    fn test_gap_costs() {
        let gap = AlignmentConfig::default();
        // one open plus one extension
        let score = align_score(3, 1, &gap, |i, _| if i == 0 { 5.0 } else { -100.0 });
        assert_eq!(score, 5.0 - 2.0 - 1.0);
        assert_eq!(align_score(0, 2, &gap, |_, _| 0.0), -3.0);
        assert_eq!(align_score(0, 0, &gap, |_, _| 0.0), 0.0);
    }

    #[test]
    fn test_alignment_path() {
        let sca = ScaDistance::new(AlignmentConfig::default());
        let (a, b) = (encoded("swar"), encoded("sware"));
        let alignment = sca.align(&a, &b).unwrap();
        assert_eq!(alignment.sequence_a, vec!["s", "w", "a", "r", "-"]);
        assert_eq!(alignment.sequence_b, vec!["s", "w", "a", "r", "e"]);
        assert_eq!(alignment.operations.last(), Some(&EditOp::Insert));
        assert_eq!(alignment.score, sca.score(&a.word.classes, &b.word.classes));
    }

    #[test]
    fn test_sca_symmetry_and_identity() {
        let sca = ScaDistance::new(AlignmentConfig::default());
        let words = ["swar", "sware", "sear3", "ivniN", "afd3n", "tardi5a"];
        for x in words {
            let a = encoded(x);
            assert_eq!(sca.distance(&a, &a), 0.0);
            for y in words {
                let b = encoded(y);
                let d = sca.distance(&a, &b);
                assert_eq!(d, sca.distance(&b, &a));
                assert!((0.0..=1.0).contains(&d));
            }
        }
        let close = sca.distance(&encoded("swar"), &encoded("sware"));
        let far = sca.distance(&encoded("swar"), &encoded("ivniN"));
        assert!(close < far);
    }

    #[test]
    fn test_normalized_distance_degenerate() {
        assert_eq!(normalized_distance(1.0, 0.0, 0.0), 1.0);
        assert_eq!(normalized_distance(-4.0, 2.0, 2.0), 1.0);
        assert_eq!(normalized_distance(2.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_identity_without_positive_self_scores() {
        let alphabet = crate::freqs::Alphabet::from_symbols(
            ["0.A.V", "0.P.#", "0.T.$"].iter().map(|s| s.to_string()),
        );
        let matrix = ScoringMatrix::zeros(alphabet);
        let lexstat = LexStatDistance {
            matrix: &matrix,
            gap: AlignmentConfig::default(),
        };
        let (a, b) = (encoded("pat"), encoded("pa"));
        assert_eq!(lexstat.distance(&a, &a), 0.0);
        assert_eq!(lexstat.distance(&a, &b), lexstat.distance(&b, &a));
        assert_eq!(lexstat.distance(&a, &b), 1.0);
    }

    #[test]
    fn test_turchin() {
        // vowel-initial words start with H
        assert_eq!(turchin_classes(&['A', 'P', 'A', 'T']), ['H', 'P']);
        assert_eq!(turchin_classes(&['B', 'A', 'D', 'A']), ['P', 'T']);
        assert_eq!(turchin_classes(&['M', 'A']), ['M', 'H']);
        let turchin = TurchinDistance;
        assert_eq!(turchin.distance(&encoded("pada"), &encoded("bot")), 0.0);
        assert_eq!(turchin.distance(&encoded("pada"), &encoded("mot")), 1.0);
    }

    #[test]
    fn test_kernel_precondition() {
        let result = kernel(Method::LexStat, None, AlignmentConfig::default());
        assert!(matches!(result, Err(LexStatError::Precondition { .. })));
        assert!(kernel(Method::EditDist, None, AlignmentConfig::default()).is_ok());
    }

    #[test]
    fn test_distance_matrix() {
        let words = [encoded("hand"), encoded("hand"), encoded("xyz")];
        let refs: Vec<&EncodedWord> = words.iter().collect();
        let matrix = distance_matrix(&EditDistance, &refs);
        assert_eq!(matrix[[0, 1]], 0.0);
        assert_eq!(matrix[[0, 2]], 1.0);
        assert_eq!(matrix[[2, 0]], 1.0);
        assert_eq!(batch_distance(&EditDistance, &[(&words[0], &words[2])]), vec![1.0]);
    }
}
