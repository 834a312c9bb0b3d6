//! Sound alphabets and per-doculect frequency tables.
//!
//! Two alphabets index everything downstream:
//! - chars: language-specific sounds `<doculect>.<class>.<prosody>`, e.g. `5.W.C`
//! - rchars: reduced sounds `<class>.<prosody>`, shared by all doculects
//!
//! Both are sorted once when the tables are built, so matrix indices are
//! stable for a given corpus.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use ahash::AHashMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::LexStatError;
use crate::segments::{Prosody, Word};

/// Sorted symbol set with reverse lookup
#[derive(Debug, Clone, Default)]
pub struct Alphabet {
    symbols: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Alphabet {
    pub fn from_symbols<I: IntoIterator<Item = String>>(symbols: I) -> Self {
        let symbols: Vec<String> = symbols
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = symbols
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.clone(), idx))
            .collect();
        Self { symbols, index }
    }

    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    pub fn symbol(&self, idx: usize) -> &str {
        &self.symbols[idx]
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Decomposition of a language-specific sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharInfo {
    pub doculect: usize,
    pub class: char,
    pub prosody: Prosody,
}

pub fn char_symbol(doculect: usize, class: char, prosody: Prosody) -> String {
    format!("{}.{}.{}", doculect, class, prosody)
}

pub fn rchar_symbol(class: char, prosody: Prosody) -> String {
    format!("{}.{}", class, prosody)
}

/// Occurrence counts over the valid words of a corpus
#[derive(Debug, Clone)]
pub struct FrequencyTables {
    chars: Alphabet,
    rchars: Alphabet,
    char_info: Vec<CharInfo>,
    char_counts: Vec<usize>,
    class_counts: Vec<FxHashMap<char, usize>>,
    segment_counts: Vec<BTreeMap<String, usize>>,
    doculect_chars: Vec<Vec<usize>>,
}

impl FrequencyTables {
    /// Count sounds of `(doculect index, word)` pairs over `n_doculects` doculects
    pub fn build<'a, I>(n_doculects: usize, words: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a Word)> + Clone,
    {
        let mut char_set = BTreeSet::new();
        let mut rchar_set = BTreeSet::new();
        for (doculect, word) in words.clone() {
            for (&class, &prosody) in word.classes.iter().zip(&word.prosody) {
                char_set.insert(char_symbol(doculect, class, prosody));
                rchar_set.insert(rchar_symbol(class, prosody));
            }
        }

        let chars = Alphabet::from_symbols(char_set);
        let rchars = Alphabet::from_symbols(rchar_set);

        let mut char_info = vec![
            CharInfo {
                doculect: 0,
                class: '0',
                prosody: Prosody::Vowel,
            };
            chars.len()
        ];
        let mut char_counts = vec![0; chars.len()];
        let mut class_counts = vec![FxHashMap::default(); n_doculects];
        let mut segment_counts = vec![BTreeMap::new(); n_doculects];

        for (doculect, word) in words {
            for ((segment, &class), &prosody) in
                word.segments.iter().zip(&word.classes).zip(&word.prosody)
            {
                if let Some(idx) = chars.index_of(&char_symbol(doculect, class, prosody)) {
                    char_info[idx] = CharInfo {
                        doculect,
                        class,
                        prosody,
                    };
                    char_counts[idx] += 1;
                }
                *class_counts[doculect].entry(class).or_insert(0) += 1;
                *segment_counts[doculect].entry(segment.clone()).or_insert(0) += 1;
            }
        }

        let mut doculect_chars = vec![Vec::new(); n_doculects];
        for (idx, info) in char_info.iter().enumerate() {
            doculect_chars[info.doculect].push(idx);
        }

        Self {
            chars,
            rchars,
            char_info,
            char_counts,
            class_counts,
            segment_counts,
            doculect_chars,
        }
    }

    pub fn chars(&self) -> &Alphabet {
        &self.chars
    }

    pub fn rchars(&self) -> &Alphabet {
        &self.rchars
    }

    /// Total alphabet size (language-specific sounds)
    pub fn alphabet_size(&self) -> usize {
        self.chars.len()
    }

    /// Reduced alphabet size (class and prosody only)
    pub fn reduced_size(&self) -> usize {
        self.rchars.len()
    }

    pub fn char_info(&self, idx: usize) -> CharInfo {
        self.char_info[idx]
    }

    /// Frequency of a language-specific sound such as `5.W.C`
    pub fn frequency(&self, symbol: &str) -> usize {
        self.chars
            .index_of(symbol)
            .map_or(0, |idx| self.char_counts[idx])
    }

    pub fn class_frequency(&self, doculect: usize, class: char) -> usize {
        self.class_counts
            .get(doculect)
            .and_then(|counts| counts.get(&class))
            .copied()
            .unwrap_or(0)
    }

    /// Sound counts of one doculect keyed by char symbol
    pub fn doculect_frequencies(&self, doculect: usize) -> BTreeMap<String, usize> {
        self.doculect_chars
            .get(doculect)
            .map(|chars| {
                chars
                    .iter()
                    .map(|&idx| (self.chars.symbol(idx).to_string(), self.char_counts[idx]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Raw segment counts of one doculect
    pub fn segment_counts(&self, doculect: usize) -> Option<&BTreeMap<String, usize>> {
        self.segment_counts.get(doculect)
    }

    /// Char indices belonging to one doculect, ascending
    pub fn doculect_chars(&self, doculect: usize) -> &[usize] {
        self.doculect_chars
            .get(doculect)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Char index sequence of a word; `None` if a sound was never counted
    pub fn encode(&self, doculect: usize, word: &Word) -> Option<Vec<usize>> {
        word.classes
            .iter()
            .zip(&word.prosody)
            .map(|(&class, &prosody)| self.chars.index_of(&char_symbol(doculect, class, prosody)))
            .collect()
    }
}

/// Quantity reported by a frequency query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyKind {
    Sounds,
    Wordlength,
    Diversity,
}

impl FromStr for FrequencyKind {
    type Err = LexStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sounds" => Ok(FrequencyKind::Sounds),
            "wordlength" => Ok(FrequencyKind::Wordlength),
            "diversity" => Ok(FrequencyKind::Diversity),
            _ => Err(LexStatError::invalid_method(
                "frequency",
                s,
                "sounds, wordlength, diversity",
            )),
        }
    }
}

/// Result of a frequency query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrequencyReport {
    /// Doculect -> sound -> count
    Sounds(BTreeMap<String, BTreeMap<String, usize>>),
    /// Segment -> count over all doculects
    AggregatedSounds(BTreeMap<String, usize>),
    /// One value per doculect
    PerDoculect(BTreeMap<String, f64>),
    Scalar(f64),
}

impl FrequencyReport {
    /// Number of keyed values (1 for a scalar)
    pub fn len(&self) -> usize {
        match self {
            FrequencyReport::Sounds(map) => map.len(),
            FrequencyReport::AggregatedSounds(map) => map.len(),
            FrequencyReport::PerDoculect(map) => map.len(),
            FrequencyReport::Scalar(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            FrequencyReport::Scalar(value) => Some(*value),
            _ => None,
        }
    }
}
