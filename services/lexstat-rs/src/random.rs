//! Background correspondence counts from unrelated word pairs.
//!
//! Two estimators are available:
//! - shuffle: pair the real words of two doculects under random permutations
//! - markov: pair pseudo-words sampled from per-doculect bigram chains
//!
//! Each trial owns an RNG stream derived from the seed, the doculect pair
//! and the trial number, so results do not depend on thread scheduling.

use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::attested::{doculect_pairs, CharAligner};
use crate::config::ScorerConfig;
use crate::scorer::{CorrespondenceCounts, PairCounts};
use crate::types::ScorerMethod;

/// Alignments each trial contributes, capped so a pair never exceeds `limit`
pub fn trial_quotas(runs: usize, rands: usize, limit: usize) -> Vec<usize> {
    let mut used = 0;
    (0..runs)
        .map(|_| {
            let quota = rands.min(limit - used);
            used += quota;
            quota
        })
        .collect()
}

fn trial_rng(seed: u64, pair_idx: usize, runs: usize, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream((pair_idx * runs + trial) as u64);
    rng
}

/// Bigram chain over the sounds of one doculect.
///
/// `None` stands for the word boundary, both as start and end state.
#[derive(Debug, Clone)]
pub struct MarkovChain {
    transitions: FxHashMap<Option<usize>, (Vec<Option<usize>>, WeightedIndex<u32>)>,
    max_len: usize,
}

impl MarkovChain {
    pub fn train<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a [usize]>,
    {
        let mut counts: FxHashMap<Option<usize>, BTreeMap<Option<usize>, u32>> =
            FxHashMap::default();
        let mut longest = 0;
        for word in words {
            longest = longest.max(word.len());
            let states = std::iter::once(None)
                .chain(word.iter().copied().map(Some))
                .chain(std::iter::once(None));
            let mut prev = None;
            for (idx, state) in states.enumerate() {
                if idx > 0 {
                    *counts.entry(prev).or_default().entry(state).or_insert(0) += 1;
                }
                prev = state;
            }
        }

        let transitions = counts
            .into_iter()
            .filter_map(|(from, targets)| {
                let (states, weights): (Vec<_>, Vec<_>) = targets.into_iter().unzip();
                WeightedIndex::new(weights)
                    .ok()
                    .map(|dist| (from, (states, dist)))
            })
            .collect();

        Self {
            transitions,
            max_len: longest * 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Sample a pseudo-word; length is capped at twice the longest training word
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut word = Vec::new();
        let mut state = None;
        while word.len() < self.max_len {
            let Some((states, dist)) = self.transitions.get(&state) else {
                break;
            };
            match states[dist.sample(rng)] {
                Some(next) => {
                    word.push(next);
                    state = Some(next);
                }
                None => break,
            }
        }
        word
    }
}

/// Counts over unrelated pairs for every doculect pair.
///
/// `doculect_words` holds the char sequences of each doculect's valid words.
pub(crate) fn random_counts(
    doculect_words: &[Vec<&[usize]>],
    aligner: &CharAligner,
    config: &ScorerConfig,
) -> PairCounts {
    let quotas = trial_quotas(config.runs, config.rands, config.limit);
    let chains: Vec<MarkovChain> = match config.method {
        ScorerMethod::Markov => doculect_words
            .iter()
            .map(|words| MarkovChain::train(words.iter().copied()))
            .collect(),
        ScorerMethod::Shuffle => Vec::new(),
    };

    doculect_pairs(doculect_words.len())
        .into_par_iter()
        .enumerate()
        .map(|(pair_idx, (doc_a, doc_b))| {
            let words_a = &doculect_words[doc_a];
            let words_b = &doculect_words[doc_b];
            if words_a.is_empty() || words_b.is_empty() {
                return ((doc_a, doc_b), CorrespondenceCounts::new());
            }

            let trials: Vec<CorrespondenceCounts> = quotas
                .par_iter()
                .enumerate()
                .map(|(trial, &quota)| {
                    let mut rng = trial_rng(config.seed, pair_idx, config.runs, trial);
                    let mut counts = CorrespondenceCounts::new();
                    match config.method {
                        ScorerMethod::Shuffle => {
                            let mut permuted = words_b.clone();
                            permuted.shuffle(&mut rng);
                            for _ in 0..quota {
                                let i = rng.gen_range(0..words_a.len());
                                aligner.count(words_a[i], permuted[i % permuted.len()], &mut counts);
                            }
                        }
                        ScorerMethod::Markov => {
                            for _ in 0..quota {
                                let a = chains[doc_a].generate(&mut rng);
                                let b = chains[doc_b].generate(&mut rng);
                                aligner.count(&a, &b, &mut counts);
                            }
                        }
                    }
                    counts
                })
                .collect();

            let mut merged = CorrespondenceCounts::new();
            for counts in trials {
                merged.merge(counts);
            }
            debug!(doc_a, doc_b, total = merged.total(), "Random correspondences");
            ((doc_a, doc_b), merged)
        })
        .collect()
}
