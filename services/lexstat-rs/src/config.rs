//! Configuration for scorer estimation, alignment and clustering.
//!
//! All structs deserialize from TOML with per-field defaults, so a config
//! file only needs to name the values it changes:
//!
//! ```toml
//! [scorer]
//! runs = 10
//! rands = 10
//! limit = 100
//!
//! [cluster]
//! method = "lexstat"
//! threshold = 0.6
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LexStatError, Result};
use crate::types::{Linkage, Method, ScorerMethod};

/// Parameters of the attested/random scorer estimation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScorerConfig {
    /// Independent permutation trials per doculect pair
    #[serde(default = "default_runs")]
    pub runs: usize,

    /// Random word pairs drawn per trial
    #[serde(default = "default_rands")]
    pub rands: usize,

    /// Cap on random alignments per doculect pair
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_scorer_method")]
    pub method: ScorerMethod,

    /// Weights of (log-odds, class model) in the combined score
    #[serde(default = "default_ratio")]
    pub ratio: (f64, f64),

    /// Probability floor for correspondences unseen in one distribution
    #[serde(default = "default_min_probability")]
    pub min_probability: f64,

    /// Skip attested pairs whose class-model distance exceeds this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocessing_threshold: Option<f64>,

    /// Rebuild even when a scorer of the same method is cached
    #[serde(default)]
    pub force: bool,
}

fn default_runs() -> usize {
    100
}

fn default_rands() -> usize {
    1000
}

fn default_limit() -> usize {
    10_000
}

fn default_seed() -> u64 {
    1
}

fn default_scorer_method() -> ScorerMethod {
    ScorerMethod::Shuffle
}

fn default_ratio() -> (f64, f64) {
    (2.0, 1.0)
}

fn default_min_probability() -> f64 {
    0.001
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            rands: default_rands(),
            limit: default_limit(),
            seed: default_seed(),
            method: default_scorer_method(),
            ratio: default_ratio(),
            min_probability: default_min_probability(),
            preprocessing_threshold: None,
            force: false,
        }
    }
}

impl ScorerConfig {
    /// Shorthand for the three sampling parameters
    pub fn sampling(runs: usize, rands: usize, limit: usize) -> Self {
        Self {
            runs,
            rands,
            limit,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_method(mut self, method: ScorerMethod) -> Self {
        self.method = method;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 || self.rands == 0 {
            return Err(LexStatError::invalid_parameter(
                "runs and rands must be > 0",
            ));
        }
        if !(self.min_probability > 0.0 && self.min_probability < 1.0) {
            return Err(LexStatError::invalid_parameter(
                "min_probability must lie in (0, 1)",
            ));
        }
        let (lexstat, classes) = self.ratio;
        if lexstat < 0.0 || classes < 0.0 || lexstat + classes <= 0.0 {
            return Err(LexStatError::invalid_parameter(
                "ratio weights must be non-negative with a positive sum",
            ));
        }
        Ok(())
    }
}

/// Gap penalties of the pairwise aligner.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AlignmentConfig {
    /// Score added when a gap opens (negative)
    #[serde(default = "default_gap_open")]
    pub gap_open: f64,

    /// Extension penalty as a fraction of gap_open
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_gap_open() -> f64 {
    -2.0
}

fn default_scale() -> f64 {
    0.5
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            gap_open: default_gap_open(),
            scale: default_scale(),
        }
    }
}

impl AlignmentConfig {
    pub fn gap_extend(&self) -> f64 {
        self.gap_open * self.scale
    }
}

/// Method, cutoff and output field of one clustering run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusterConfig {
    #[serde(default = "default_cluster_method")]
    pub method: Method,

    /// Maximal distance at which two words are linked
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Overrides the method's default linkage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkage: Option<Linkage>,

    /// Field the cluster ids are written to
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "ref")]
    pub reference: Option<String>,
}

fn default_cluster_method() -> Method {
    Method::Sca
}

fn default_threshold() -> f64 {
    0.3
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            method: default_cluster_method(),
            threshold: default_threshold(),
            linkage: None,
            reference: None,
        }
    }
}

impl ClusterConfig {
    /// Build from a method name; unknown names fail here, not at clustering time.
    pub fn new(method: &str, threshold: f64) -> Result<Self> {
        Ok(Self {
            method: method.parse()?,
            threshold,
            ..Self::default()
        })
    }

    pub fn with_linkage(mut self, linkage: &str) -> Result<Self> {
        self.linkage = Some(linkage.parse()?);
        Ok(self)
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage.unwrap_or_else(|| self.method.default_linkage())
    }

    pub fn reference(&self) -> &str {
        self.reference
            .as_deref()
            .unwrap_or_else(|| self.method.default_reference())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(LexStatError::invalid_parameter(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Complete analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LexStatConfig {
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl LexStatConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LexStatConfig = toml::from_str(content)?;
        config.scorer.validate()?;
        config.cluster.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LexStatConfig::default();
        assert_eq!(config.scorer.runs, 100);
        assert_eq!(config.scorer.rands, 1000);
        assert_eq!(config.scorer.limit, 10_000);
        assert_eq!(config.scorer.ratio, (2.0, 1.0));
        assert_eq!(config.alignment.gap_extend(), -1.0);
        assert_eq!(config.cluster.method, Method::Sca);
        assert_eq!(config.cluster.reference(), "scaid");
    }

    #[test]
    fn test_partial_toml() {
        let config = LexStatConfig::from_toml_str(
            r#"
            [scorer]
            runs = 10
            rands = 10
            limit = 100
            method = "markov"

            [cluster]
            method = "edit-dist"
            threshold = 0.7
            ref = "cogid"
            "#,
        )
        .unwrap();

        assert_eq!(config.scorer.runs, 10);
        assert_eq!(config.scorer.method, ScorerMethod::Markov);
        assert_eq!(config.scorer.seed, 1);
        assert_eq!(config.cluster.method, Method::EditDist);
        assert_eq!(config.cluster.reference(), "cogid");
        assert_eq!(config.cluster.linkage(), Linkage::Single);
    }

    #[test]
    fn test_unknown_method_in_toml() {
        let result = LexStatConfig::from_toml_str("[cluster]\nmethod = \"fuzzy\"\n");
        assert!(matches!(result, Err(LexStatError::Config { .. })));
    }

    #[test]
    fn test_cluster_config_new() {
        assert!(ClusterConfig::new("fuzzy", 0.5).is_err());
        let config = ClusterConfig::new("turchin", 0.5).unwrap();
        assert_eq!(config.linkage(), Linkage::Complete);
        let config = config.with_linkage("single").unwrap();
        assert_eq!(config.linkage(), Linkage::Single);
    }

    #[test]
    fn test_validation() {
        assert!(ScorerConfig::sampling(0, 10, 100).validate().is_err());
        let mut config = ScorerConfig::default();
        config.min_probability = 0.0;
        assert!(config.validate().is_err());
        assert!(ClusterConfig::new("sca", -0.1).unwrap().validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexstat.toml");
        let mut config = LexStatConfig::default();
        config.scorer.runs = 7;
        config.cluster = ClusterConfig::new("lexstat", 0.6)
            .unwrap()
            .with_reference("cogid");
        config.to_file(&path).unwrap();

        let loaded = LexStatConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
