//! The cognate-detection analysis over one wordlist.
//!
//! Lifecycle:
//! 1. Load: segment every entry, record malformed ones, build sound alphabets
//! 2. `get_scorer`: estimate attested and random correspondences, combine
//! 3. `cluster`: threshold word distances per concept into cognate sets
//!
//! Steps 2 and 3 can be repeated. Only `lexstat` clustering needs step 2.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ahash::AHashMap;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::attested::{attested_counts, CharAligner};
use crate::cluster::{assign_ids, flat_cluster, ThresholdDecider, ThresholdProbe};
use crate::config::{ClusterConfig, LexStatConfig, ScorerConfig};
use crate::error::{LexStatError, Result};
use crate::freqs::{FrequencyKind, FrequencyReport, FrequencyTables};
use crate::phonetic::{batch_distance, distance_matrix, kernel, PairwiseDistance, ScaDistance};
use crate::random::random_counts;
use crate::report::{ErrorReport, ErrorSink, MalformedEntry};
use crate::scorer::{combine, Scorer};
use crate::segments::{segment_entry, EncodedWord, Word};
use crate::sound_class::ClassModel;
use crate::sparse::DistanceTable;
use crate::types::{Aggregate, Alignment, CognateSet, Linkage, Method};
use crate::wordlist::Wordlist;

/// Random word pairs drawn for the null distance distribution
const NULL_SAMPLES: usize = 1000;

/// Quantile of the null distribution offered as an extra interactive probe
const NULL_QUANTILE: f64 = 0.05;

/// Outcome of a scorer request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorerStatus {
    /// Matrices were estimated and stored
    Built,
    /// A scorer of the same method already existed and was kept
    Cached,
}

/// Alignment of two words that share a concept
#[derive(Debug, Clone, Serialize)]
pub struct AlignedPair {
    pub concept: String,
    pub id_a: String,
    pub id_b: String,
    pub distance: f64,
    pub alignment: Alignment,
}

/// Segmented corpus with its scorer and cluster assignments
pub struct LexStat {
    wordlist: Wordlist,
    config: LexStatConfig,
    /// Sorted doculect names; positions are the doculect indices of chars
    doculects: Vec<String>,
    /// Concept names in order of first appearance
    concepts: Vec<String>,
    entry_doculect: Vec<usize>,
    entry_concept: Vec<usize>,
    /// Entry indices per concept, ascending
    concept_members: Vec<Vec<usize>>,
    /// `None` for malformed entries
    words: Vec<Option<EncodedWord>>,
    tables: FrequencyTables,
    errors: ErrorReport,
    scorer: Option<Scorer>,
    assignments: BTreeMap<String, Vec<usize>>,
}

impl LexStat {
    /// Load a wordlist with default configuration
    pub fn new(wordlist: Wordlist) -> Self {
        Self::load(wordlist, LexStatConfig::default(), &mut |_: MalformedEntry| {})
    }

    pub fn with_config(wordlist: Wordlist, config: LexStatConfig) -> Result<Self> {
        Self::with_sink(wordlist, config, &mut |_: MalformedEntry| {})
    }

    /// Load a wordlist, forwarding every malformed entry to `sink` as well
    pub fn with_sink(
        wordlist: Wordlist,
        config: LexStatConfig,
        sink: &mut dyn ErrorSink,
    ) -> Result<Self> {
        config.scorer.validate()?;
        config.cluster.validate()?;
        Ok(Self::load(wordlist, config, sink))
    }

    fn load(wordlist: Wordlist, config: LexStatConfig, sink: &mut dyn ErrorSink) -> Self {
        let mut doculects = wordlist.doculects();
        doculects.sort();
        let concepts = wordlist.concepts();

        let doculect_index: AHashMap<&str, usize> = doculects
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        let concept_index: AHashMap<&str, usize> = concepts
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();

        let mut entry_doculect = Vec::with_capacity(wordlist.len());
        let mut entry_concept = Vec::with_capacity(wordlist.len());
        let mut concept_members = vec![Vec::new(); concepts.len()];
        let mut segmented: Vec<Option<Word>> = Vec::with_capacity(wordlist.len());
        let mut errors = ErrorReport::new();

        for (idx, entry) in wordlist.entries().iter().enumerate() {
            let concept = concept_index[entry.concept.as_str()];
            entry_doculect.push(doculect_index[entry.doculect.as_str()]);
            entry_concept.push(concept);
            concept_members[concept].push(idx);

            match segment_entry(&entry.transcription, entry.tokens.as_deref()) {
                Ok(word) => segmented.push(Some(word)),
                Err(reason) => {
                    warn!(id = %entry.id, %reason, "Malformed entry");
                    let malformed = MalformedEntry::new(entry.id.clone(), reason);
                    sink.record(malformed.clone());
                    errors.record(malformed);
                    segmented.push(None);
                }
            }
        }

        let tables = FrequencyTables::build(
            doculects.len(),
            segmented
                .iter()
                .enumerate()
                .filter_map(|(idx, word)| word.as_ref().map(|w| (entry_doculect[idx], w))),
        );

        let words: Vec<Option<EncodedWord>> = segmented
            .into_iter()
            .enumerate()
            .map(|(idx, word)| {
                let word = word?;
                let doculect = entry_doculect[idx];
                let chars = tables.encode(doculect, &word)?;
                Some(EncodedWord {
                    doculect,
                    word,
                    chars,
                })
            })
            .collect();

        info!(
            entries = wordlist.len(),
            doculects = doculects.len(),
            concepts = concepts.len(),
            malformed = errors.len(),
            alphabet = tables.alphabet_size(),
            "Loaded wordlist"
        );

        Self {
            wordlist,
            config,
            doculects,
            concepts,
            entry_doculect,
            entry_concept,
            concept_members,
            words,
            tables,
            errors,
            scorer: None,
            assignments: BTreeMap::new(),
        }
    }

    // ========================================================================
    // SCORER
    // ========================================================================

    /// Build the combined scorer, or keep the cached one.
    ///
    /// A scorer built with the same method is reused unless `config.force`
    /// is set; reuse logs one warning and leaves the matrices untouched.
    pub fn get_scorer(&mut self, config: &ScorerConfig) -> Result<ScorerStatus> {
        config.validate()?;
        if let Some(existing) = &self.scorer {
            if existing.method == config.method && !config.force {
                warn!(
                    method = ?config.method,
                    "Scorer already built, reusing it; set force to rebuild"
                );
                return Ok(ScorerStatus::Cached);
            }
        }

        let aligner = CharAligner::new(ScaDistance::new(self.config.alignment), &self.tables);

        let concept_words: Vec<Vec<&EncodedWord>> = self
            .concept_members
            .iter()
            .map(|members| members.iter().filter_map(|&i| self.words[i].as_ref()).collect())
            .collect();
        let attested = attested_counts(
            &concept_words,
            self.doculects.len(),
            &aligner,
            config.preprocessing_threshold,
        );

        let mut doculect_words: Vec<Vec<&[usize]>> = vec![Vec::new(); self.doculects.len()];
        for word in self.words.iter().flatten() {
            doculect_words[word.doculect].push(&word.chars);
        }
        let random = random_counts(&doculect_words, &aligner, config);

        let scorer = combine(&self.tables, &attested, &random, config, &ClassModel::default())?;
        info!(
            method = ?config.method,
            runs = config.runs,
            rands = config.rands,
            limit = config.limit,
            sounds = scorer.combined.len(),
            "Built scorer"
        );
        self.scorer = Some(scorer);
        Ok(ScorerStatus::Built)
    }

    /// Drop the cached scorer; returns whether one existed
    pub fn clear_scorer(&mut self) -> bool {
        self.scorer.take().is_some()
    }

    pub fn scorer(&self) -> Option<&Scorer> {
        self.scorer.as_ref()
    }

    fn require_scorer(&self) -> Result<&Scorer> {
        self.scorer
            .as_ref()
            .ok_or_else(|| LexStatError::precondition("no scorer built, call get_scorer first"))
    }

    /// Write the combined scorer as nested JSON
    pub fn write_scorer<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.require_scorer()?.combined.write_json(path)
    }

    /// Combined scorer as `a<TAB>b<TAB>score` lines
    pub fn scorer_tsv(&self) -> Result<String> {
        Ok(self.require_scorer()?.combined.to_tsv())
    }

    // ========================================================================
    // DISTANCES
    // ========================================================================

    fn kernel(&self, method: Method) -> Result<Box<dyn PairwiseDistance + '_>> {
        kernel(
            method,
            self.scorer.as_ref().map(|s| &s.combined),
            self.config.alignment,
        )
    }

    /// Distances of all valid word pairs that share a concept
    pub fn distance_table(&self, method: Method) -> Result<DistanceTable> {
        let kernel = self.kernel(method)?;
        let blocks: Vec<(Vec<usize>, Array2<f64>)> = self
            .concept_members
            .iter()
            .map(|members| {
                let valid: Vec<usize> = members
                    .iter()
                    .copied()
                    .filter(|&i| self.words[i].is_some())
                    .collect();
                let words: Vec<&EncodedWord> =
                    valid.iter().filter_map(|&i| self.words[i].as_ref()).collect();
                let distances = distance_matrix(kernel.as_ref(), &words);
                (valid, distances)
            })
            .collect();
        let table = DistanceTable::from_blocks(self.entry_concept.clone(), &blocks);
        debug!(
            method = %method,
            stored = table.nnz(),
            sparsity = table.sparsity(),
            "Built distance table"
        );
        Ok(table)
    }

    /// Distances of random word pairs from different doculects and concepts
    pub fn random_distances(&self, method: Method, samples: usize) -> Result<Vec<f64>> {
        let kernel = self.kernel(method)?;
        let valid: Vec<usize> = (0..self.words.len())
            .filter(|&i| self.words[i].is_some())
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.scorer.seed);
        let mut pairs = Vec::with_capacity(samples);
        let max_attempts = samples.saturating_mul(10);
        let mut attempts = 0;
        while valid.len() > 1 && pairs.len() < samples && attempts < max_attempts {
            attempts += 1;
            let i = valid[rng.gen_range(0..valid.len())];
            let j = valid[rng.gen_range(0..valid.len())];
            if self.entry_doculect[i] == self.entry_doculect[j]
                || self.entry_concept[i] == self.entry_concept[j]
            {
                continue;
            }
            if let (Some(a), Some(b)) = (&self.words[i], &self.words[j]) {
                pairs.push((a, b));
            }
        }
        debug!(method = %method, drawn = pairs.len(), attempts, "Sampled unrelated pairs");

        Ok(batch_distance(kernel.as_ref(), &pairs))
    }

    /// Threshold guess: the given quantile of the null distance distribution
    pub fn guess_threshold(&self, method: Method, quantile: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(LexStatError::invalid_parameter(format!(
                "quantile must lie in [0, 1], got {}",
                quantile
            )));
        }
        let mut distances = self.random_distances(method, NULL_SAMPLES)?;
        if distances.is_empty() {
            return Err(LexStatError::precondition(
                "no word pairs across doculects and concepts to sample",
            ));
        }
        distances.sort_by(f64::total_cmp);
        let idx = ((distances.len() - 1) as f64 * quantile).round() as usize;
        Ok(distances[idx])
    }

    /// Doculect-by-doculect distances in the order of [`LexStat::doculects`].
    ///
    /// Per shared concept the closest word pair counts; concepts are then
    /// aggregated. Pairs without a shared concept get distance 1.
    pub fn doculect_distances(&self, method: Method, aggregate: Aggregate) -> Result<Array2<f64>> {
        let table = self.distance_table(method)?;
        let n = self.doculects.len();
        let mut matrix = Array2::<f64>::zeros((n, n));

        for a in 0..n {
            for b in a + 1..n {
                let mut best: Vec<f64> = Vec::new();
                for members in &self.concept_members {
                    let mut closest: Option<f64> = None;
                    for &i in members.iter().filter(|&&i| self.is_valid_in(i, a)) {
                        for &j in members.iter().filter(|&&j| self.is_valid_in(j, b)) {
                            if let Some(distance) = table.distance(i, j) {
                                closest = Some(closest.map_or(distance, |c| c.min(distance)));
                            }
                        }
                    }
                    best.extend(closest);
                }
                let value = aggregate_values(&mut best, aggregate).unwrap_or(1.0);
                matrix[[a, b]] = value;
                matrix[[b, a]] = value;
            }
        }
        Ok(matrix)
    }

    /// Aligned display of every word pair of two doculects sharing a concept
    pub fn align_pairs(
        &self,
        doculect_a: &str,
        doculect_b: &str,
        method: Method,
    ) -> Result<Vec<AlignedPair>> {
        if !matches!(method, Method::LexStat | Method::Sca) {
            return Err(LexStatError::invalid_method(
                "alignment method",
                method.name(),
                "lexstat, sca",
            ));
        }
        let a = self.doculect_index(doculect_a)?;
        let b = self.doculect_index(doculect_b)?;
        let kernel = self.kernel(method)?;

        let mut aligned = Vec::new();
        for (concept, members) in self.concepts.iter().zip(&self.concept_members) {
            for &i in members.iter().filter(|&&i| self.entry_doculect[i] == a) {
                for &j in members.iter().filter(|&&j| self.entry_doculect[j] == b) {
                    if a == b && j <= i {
                        continue;
                    }
                    let (Some(word_a), Some(word_b)) = (&self.words[i], &self.words[j]) else {
                        continue;
                    };
                    if let Some(alignment) = kernel.align(word_a, word_b) {
                        aligned.push(AlignedPair {
                            concept: concept.clone(),
                            id_a: self.wordlist.entries()[i].id.clone(),
                            id_b: self.wordlist.entries()[j].id.clone(),
                            distance: kernel.distance(word_a, word_b),
                            alignment,
                        });
                    }
                }
            }
        }
        Ok(aligned)
    }

    // ========================================================================
    // CLUSTERING
    // ========================================================================

    /// Cluster ids for all entries plus the number of clusters
    fn partition(
        &self,
        table: &DistanceTable,
        threshold: f64,
        linkage: Linkage,
    ) -> (Vec<usize>, usize) {
        let mut ids = vec![0; self.wordlist.len()];
        let mut count = 0;
        for members in &self.concept_members {
            let distances = table.to_dense_submatrix(members);
            let groups = flat_cluster(&distances, threshold, linkage);
            count += groups.len();
            for (entry, id) in assign_ids(&groups, members) {
                ids[entry] = id;
            }
        }
        (ids, count)
    }

    /// Partition every concept into cognate sets; returns the number of sets.
    ///
    /// Ids are stored under the config's reference name, replacing an
    /// earlier run of that name only.
    pub fn cluster(&mut self, config: &ClusterConfig) -> Result<usize> {
        config.validate()?;
        let table = self.distance_table(config.method)?;
        let (ids, count) = self.partition(&table, config.threshold, config.linkage());
        self.commit(config, ids, count);
        Ok(count)
    }

    /// [`LexStat::cluster`] with a method name; unknown names fail before any work
    pub fn cluster_named(&mut self, method: &str, threshold: f64) -> Result<usize> {
        self.cluster(&ClusterConfig::new(method, threshold)?)
    }

    /// Probe candidate thresholds and commit the one `decider` picks.
    ///
    /// The probes cover `candidates` plus a guess from the null distance
    /// distribution when one can be sampled. Returns the committed
    /// threshold, or `None` if the decider declined.
    pub fn cluster_interactive(
        &mut self,
        config: &ClusterConfig,
        candidates: &[f64],
        decider: &mut dyn ThresholdDecider,
    ) -> Result<Option<f64>> {
        config.validate()?;
        if let Some(bad) = candidates.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(LexStatError::invalid_parameter(format!(
                "candidate threshold must be a non-negative number, got {}",
                bad
            )));
        }
        let table = self.distance_table(config.method)?;
        let linkage = config.linkage();

        let mut thresholds = candidates.to_vec();
        match self.guess_threshold(config.method, NULL_QUANTILE) {
            Ok(guess) => thresholds.push(guess),
            Err(err) => debug!(error = %err, "No threshold guess"),
        }
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();

        let probes: Vec<ThresholdProbe> = thresholds
            .iter()
            .map(|&threshold| ThresholdProbe {
                threshold,
                clusters: self.partition(&table, threshold, linkage).1,
            })
            .collect();

        let Some(threshold) = decider.decide(&probes) else {
            info!(probes = probes.len(), "Threshold not confirmed, nothing stored");
            return Ok(None);
        };
        let config = ClusterConfig {
            threshold,
            ..config.clone()
        };
        config.validate()?;
        let (ids, count) = self.partition(&table, threshold, linkage);
        self.commit(&config, ids, count);
        Ok(Some(threshold))
    }

    fn commit(&mut self, config: &ClusterConfig, ids: Vec<usize>, count: usize) {
        info!(
            method = %config.method,
            threshold = config.threshold,
            linkage = ?config.linkage(),
            reference = config.reference(),
            clusters = count,
            "Clustered wordlist"
        );
        self.assignments.insert(config.reference().to_string(), ids);
    }

    /// Cluster id of every entry, in wordlist order
    pub fn assignment(&self, reference: &str) -> Result<&[usize]> {
        self.assignments
            .get(reference)
            .map(Vec::as_slice)
            .ok_or_else(|| LexStatError::UnknownReference(reference.to_string()))
    }

    /// Names of all stored assignments
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.assignments.keys().map(String::as_str)
    }

    /// Cognate sets of an assignment, ordered by id
    pub fn cognate_sets(&self, reference: &str) -> Result<Vec<CognateSet>> {
        let mut sets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (entry, &id) in self.assignment(reference)?.iter().enumerate() {
            sets.entry(id).or_default().push(entry);
        }
        Ok(sets
            .into_iter()
            .map(|(id, members)| CognateSet::new(id, members))
            .collect())
    }

    // ========================================================================
    // ANALYSES
    // ========================================================================

    /// Entry pairs sharing a concept for every doculect pair `(a, b)`, `a <= b`.
    ///
    /// Within one doculect each entry is paired with itself.
    pub fn pairs(&self) -> BTreeMap<(String, String), Vec<(usize, usize)>> {
        let n = self.doculects.len();
        let mut pairs = BTreeMap::new();
        for a in 0..n {
            for b in a..n {
                let mut found = Vec::new();
                for members in &self.concept_members {
                    for &i in members.iter().filter(|&&i| self.entry_doculect[i] == a) {
                        if a == b {
                            found.push((i, i));
                            continue;
                        }
                        for &j in members.iter().filter(|&&j| self.entry_doculect[j] == b) {
                            found.push((i, j));
                        }
                    }
                }
                pairs.insert((self.doculects[a].clone(), self.doculects[b].clone()), found);
            }
        }
        pairs
    }

    /// [`LexStat::pairs`] as JSON keyed `A---B`, listing entry identifiers
    pub fn pairs_json(&self) -> Result<String> {
        let entries = self.wordlist.entries();
        let export: BTreeMap<String, Vec<(&str, &str)>> = self
            .pairs()
            .into_iter()
            .map(|((a, b), pairs)| {
                let ids = pairs
                    .into_iter()
                    .map(|(i, j)| (entries[i].id.as_str(), entries[j].id.as_str()))
                    .collect();
                (format!("{}---{}", a, b), ids)
            })
            .collect();
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Sound, word-length or cognate-diversity statistics.
    ///
    /// `diversity` needs the reference of a stored assignment and is always
    /// a single value.
    pub fn frequencies(
        &self,
        kind: FrequencyKind,
        aggregated: bool,
        reference: Option<&str>,
    ) -> Result<FrequencyReport> {
        let report = match (kind, aggregated) {
            (FrequencyKind::Sounds, false) => FrequencyReport::Sounds(
                self.doculects
                    .iter()
                    .enumerate()
                    .map(|(d, name)| (name.clone(), self.tables.doculect_frequencies(d)))
                    .collect(),
            ),
            (FrequencyKind::Sounds, true) => {
                let mut counts = BTreeMap::new();
                for d in 0..self.doculects.len() {
                    for (segment, count) in self.tables.segment_counts(d).into_iter().flatten() {
                        *counts.entry(segment.clone()).or_insert(0) += count;
                    }
                }
                FrequencyReport::AggregatedSounds(counts)
            }
            (FrequencyKind::Wordlength, false) => {
                let mut sums = vec![(0usize, 0usize); self.doculects.len()];
                for word in self.words.iter().flatten() {
                    sums[word.doculect].0 += word.word.len();
                    sums[word.doculect].1 += 1;
                }
                FrequencyReport::PerDoculect(
                    self.doculects
                        .iter()
                        .zip(sums)
                        .map(|(name, (total, count))| (name.clone(), mean_of(total, count)))
                        .collect(),
                )
            }
            (FrequencyKind::Wordlength, true) => {
                let (total, count) = self
                    .words
                    .iter()
                    .flatten()
                    .fold((0, 0), |(total, count), w| (total + w.word.len(), count + 1));
                FrequencyReport::Scalar(mean_of(total, count))
            }
            (FrequencyKind::Diversity, _) => {
                let reference = reference.ok_or_else(|| {
                    LexStatError::invalid_parameter("diversity requires a cluster reference")
                })?;
                let ids = self.assignment(reference)?;
                let sets: BTreeSet<(usize, usize)> = self
                    .entry_concept
                    .iter()
                    .copied()
                    .zip(ids.iter().copied())
                    .collect();
                let concepts = self.concepts.len() as f64;
                let entries = self.wordlist.len() as f64;
                let diversity = if entries > concepts {
                    (sets.len() as f64 - concepts) / (entries - concepts)
                } else {
                    0.0
                };
                FrequencyReport::Scalar(diversity)
            }
        };
        Ok(report)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    fn is_valid_in(&self, entry: usize, doculect: usize) -> bool {
        self.entry_doculect[entry] == doculect && self.words[entry].is_some()
    }

    fn doculect_index(&self, name: &str) -> Result<usize> {
        self.doculects
            .binary_search_by(|d| d.as_str().cmp(name))
            .map_err(|_| LexStatError::UnknownDoculect(name.to_string()))
    }

    pub fn wordlist(&self) -> &Wordlist {
        &self.wordlist
    }

    pub fn config(&self) -> &LexStatConfig {
        &self.config
    }

    /// Doculect names, sorted
    pub fn doculects(&self) -> &[String] {
        &self.doculects
    }

    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }

    pub fn tables(&self) -> &FrequencyTables {
        &self.tables
    }

    /// Malformed entries found at load time
    pub fn errors(&self) -> &ErrorReport {
        &self.errors
    }

    /// Segmented word of an entry; `None` for malformed entries
    pub fn word(&self, idx: usize) -> Option<&EncodedWord> {
        self.words.get(idx).and_then(Option::as_ref)
    }
}

fn mean_of(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn aggregate_values(values: &mut [f64], aggregate: Aggregate) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    match aggregate {
        Aggregate::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        Aggregate::Median => {
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                Some((values[mid - 1] + values[mid]) / 2.0)
            } else {
                Some(values[mid])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlist::Entry;

    fn wordlist(rows: &[(&str, &str, &str, &str)]) -> Wordlist {
        let mut wordlist = Wordlist::new();
        for (id, doculect, concept, ipa) in rows {
            wordlist.push(Entry::new(*id, *doculect, *concept, *ipa)).unwrap();
        }
        wordlist
    }

    fn small() -> LexStat {
        LexStat::new(wordlist(&[
            ("1", "deu", "hand", "hant"),
            ("2", "eng", "hand", "hænd"),
            ("3", "deu", "water", "vasər"),
            ("4", "eng", "water", "wɔtər"),
            ("5", "nld", "water", "ʋaːtər"),
        ]))
    }

    #[test]
    fn test_load_indices() {
        let lex = small();
        assert_eq!(lex.doculects(), &["deu", "eng", "nld"]);
        assert_eq!(lex.concepts(), &["hand", "water"]);
        assert_eq!(lex.word(4).unwrap().doculect, 2);
        assert!(lex.errors().is_empty());
    }

    #[test]
    fn test_pairs() {
        let lex = small();
        let pairs = lex.pairs();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[&("deu".to_string(), "eng".to_string())], vec![(0, 1), (2, 3)]);
        assert_eq!(pairs[&("deu".to_string(), "deu".to_string())], vec![(0, 0), (2, 2)]);
        assert!(pairs[&("eng".to_string(), "nld".to_string())] == vec![(3, 4)]);

        let json = lex.pairs_json().unwrap();
        assert!(json.contains("\"deu---eng\""));
    }

    #[test]
    fn test_sca_clustering_and_sets() {
        let mut lex = small();
        let count = lex.cluster(&ClusterConfig::new("sca", 0.45).unwrap()).unwrap();
        let ids = lex.assignment("scaid").unwrap().to_vec();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2], 3);
        assert_eq!(count, lex.cognate_sets("scaid").unwrap().len());
        assert!(matches!(
            lex.assignment("cogid"),
            Err(LexStatError::UnknownReference(_))
        ));
    }

    #[test]
    fn test_align_pairs() {
        let lex = small();
        let aligned = lex.align_pairs("deu", "eng", Method::Sca).unwrap();
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].concept, "hand");
        assert_eq!(aligned[0].alignment.sequence_a.len(), aligned[0].alignment.sequence_b.len());

        assert!(matches!(
            lex.align_pairs("deu", "eng", Method::EditDist),
            Err(LexStatError::InvalidMethod { .. })
        ));
        assert!(matches!(
            lex.align_pairs("deu", "fra", Method::Sca),
            Err(LexStatError::UnknownDoculect(_))
        ));
        assert!(matches!(
            lex.align_pairs("deu", "eng", Method::LexStat),
            Err(LexStatError::Precondition { .. })
        ));
    }

    #[test]
    fn test_doculect_distances() {
        let lex = small();
        let matrix = lex.doculect_distances(Method::EditDist, Aggregate::Mean).unwrap();
        assert_eq!(matrix.dim(), (3, 3));
        assert_eq!(matrix[[0, 0]], 0.0);
        assert_eq!(matrix[[0, 1]], matrix[[1, 0]]);
        // deu and nld share only "water": vasər / ʋaːtər
        assert!((matrix[[0, 2]] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_guess_threshold() {
        let lex = small();
        let low = lex.guess_threshold(Method::Sca, 0.0).unwrap();
        let high = lex.guess_threshold(Method::Sca, 1.0).unwrap();
        assert!(low <= high);
        assert!(lex.guess_threshold(Method::Sca, 1.5).is_err());
    }

    #[test]
    fn test_aggregate_values() {
        assert_eq!(aggregate_values(&mut [], Aggregate::Mean), None);
        assert_eq!(aggregate_values(&mut [0.2, 0.4], Aggregate::Mean), Some(0.30000000000000004));
        assert_eq!(aggregate_values(&mut [0.9, 0.1, 0.5], Aggregate::Median), Some(0.5));
        assert_eq!(aggregate_values(&mut [0.4, 0.2], Aggregate::Median), Some(0.30000000000000004));
    }
}
