//! LexStat Core: automated cognate detection over multilingual wordlists.
//!
//! Provides:
//! - Segmentation, sound classes and prosodic context
//! - Permutation-based estimation of sound-correspondence scorers
//! - Affine-gap word alignment and word distances
//! - Threshold clustering of words into cognate sets
//!
//! Python bindings via PyO3 are available behind the `python` feature.

pub mod attested;
pub mod cluster;
pub mod config;
pub mod error;
pub mod freqs;
pub mod graph;
pub mod lexstat;
pub mod phonetic;
pub mod random;
pub mod report;
pub mod scorer;
pub mod segments;
pub mod sound_class;
pub mod sparse;
pub mod types;
pub mod wordlist;

#[cfg(feature = "python")]
mod python;

pub use cluster::{ThresholdDecider, ThresholdProbe};
pub use config::{AlignmentConfig, ClusterConfig, LexStatConfig, ScorerConfig};
pub use error::{LexStatError, Result};
pub use freqs::{FrequencyKind, FrequencyReport};
pub use lexstat::{AlignedPair, LexStat, ScorerStatus};
pub use report::{ErrorReport, ErrorSink, MalformedEntry};
pub use scorer::{Scorer, ScoringMatrix};
pub use segments::tokenize;
pub use sparse::DistanceTable;
pub use types::{Aggregate, Alignment, CognateSet, Linkage, Method, ScorerMethod};
pub use wordlist::{Entry, Wordlist};
