//! Shared data structures and algorithm selectors.

use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::LexStatError;

/// Edge between two wordlist entries in a distance graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceEdge {
    pub source: usize,
    pub target: usize,
    pub distance: OrderedFloat<f64>,
}

impl DistanceEdge {
    pub fn new(source: usize, target: usize, distance: f64) -> Self {
        Self {
            source,
            target,
            distance: OrderedFloat(distance),
        }
    }
}

/// Edit operation in sequence alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOp {
    Match,
    Substitute,
    Insert,
    Delete,
}

/// Gap symbol used in aligned sequences
pub const GAP: &str = "-";

/// Result of a pairwise phonetic alignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alignment {
    pub sequence_a: Vec<String>,
    pub sequence_b: Vec<String>,
    pub operations: Vec<EditOp>,
    pub score: f64,
}

impl Alignment {
    pub fn new(
        sequence_a: Vec<String>,
        sequence_b: Vec<String>,
        operations: Vec<EditOp>,
        score: f64,
    ) -> Self {
        Self {
            sequence_a,
            sequence_b,
            operations,
            score,
        }
    }
}

/// Group of entries judged cognate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CognateSet {
    pub id: usize,
    pub members: Vec<usize>,
    pub size: usize,
}

impl CognateSet {
    pub fn new(id: usize, members: Vec<usize>) -> Self {
        let size = members.len();
        Self { id, members, size }
    }
}

// ============================================================================
// SELECTORS
// ============================================================================

/// Word comparison method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Alignment with the combined log-odds scorer
    #[serde(rename = "lexstat")]
    LexStat,
    /// Alignment with the fixed sound-class model
    #[serde(rename = "sca")]
    Sca,
    /// Unit-cost edit distance over raw segments
    #[serde(rename = "edit-dist")]
    EditDist,
    /// Match of the first two consonant classes
    #[serde(rename = "turchin")]
    Turchin,
}

impl Method {
    pub const EXPECTED: &'static str = "lexstat, sca, edit-dist, turchin";

    pub fn name(&self) -> &'static str {
        match self {
            Method::LexStat => "lexstat",
            Method::Sca => "sca",
            Method::EditDist => "edit-dist",
            Method::Turchin => "turchin",
        }
    }

    /// Field name cluster ids are written to when the caller gives none
    pub fn default_reference(&self) -> &'static str {
        match self {
            Method::LexStat => "lexstatid",
            Method::Sca => "scaid",
            Method::EditDist => "editid",
            Method::Turchin => "turchinid",
        }
    }

    pub fn default_linkage(&self) -> Linkage {
        match self {
            Method::Turchin => Linkage::Complete,
            _ => Linkage::Single,
        }
    }
}

impl FromStr for Method {
    type Err = LexStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexstat" => Ok(Method::LexStat),
            "sca" => Ok(Method::Sca),
            "edit-dist" | "edit_dist" | "editdist" => Ok(Method::EditDist),
            "turchin" => Ok(Method::Turchin),
            _ => Err(LexStatError::invalid_method("method", s, Self::EXPECTED)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flat clustering rule applied to a concept's distance matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Connected components of the threshold graph
    Single,
    /// Average linkage, merged while the mean distance stays within threshold
    Upgma,
    /// Every member pair within threshold
    Complete,
}

impl FromStr for Linkage {
    type Err = LexStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Linkage::Single),
            "upgma" | "average" => Ok(Linkage::Upgma),
            "complete" => Ok(Linkage::Complete),
            _ => Err(LexStatError::invalid_method(
                "linkage",
                s,
                "single, upgma, complete",
            )),
        }
    }
}

/// Estimator for the background correspondence distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerMethod {
    /// Permutation resampling of real words
    Shuffle,
    /// Pseudo-words from per-doculect Markov chains
    Markov,
}

impl FromStr for ScorerMethod {
    type Err = LexStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shuffle" => Ok(ScorerMethod::Shuffle),
            "markov" => Ok(ScorerMethod::Markov),
            _ => Err(LexStatError::invalid_method(
                "scorer method",
                s,
                "shuffle, markov",
            )),
        }
    }
}

/// Aggregation of per-concept distances into a doculect distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Mean,
    Median,
}

impl FromStr for Aggregate {
    type Err = LexStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Aggregate::Mean),
            "median" => Ok(Aggregate::Median),
            _ => Err(LexStatError::invalid_method("aggregate", s, "mean, median")),
        }
    }
}
