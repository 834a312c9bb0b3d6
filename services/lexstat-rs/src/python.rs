//! PyO3 bindings.

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::{ClusterConfig, ScorerConfig};
use crate::error::LexStatError;
use crate::lexstat::{LexStat, ScorerStatus};
use crate::phonetic::edit_distance;
use crate::segments::tokenize;
use crate::types::CognateSet;
use crate::wordlist::Wordlist;

impl From<LexStatError> for PyErr {
    fn from(err: LexStatError) -> Self {
        match err {
            LexStatError::Io(_) => PyIOError::new_err(err.to_string()),
            LexStatError::Precondition { .. } => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

// ============================================================================
// SEGMENT FUNCTIONS
// ============================================================================

#[pyfunction]
fn py_tokenize(ipa: &str) -> PyResult<Vec<String>> {
    Ok(tokenize(ipa))
}

#[pyfunction]
fn py_edit_distance(ipa_a: &str, ipa_b: &str) -> PyResult<f64> {
    Ok(edit_distance(&tokenize(ipa_a), &tokenize(ipa_b)))
}

// ============================================================================
// PYTHON WRAPPER TYPES
// ============================================================================

#[pyclass]
struct PyLexStat {
    inner: LexStat,
}

#[pymethods]
impl PyLexStat {
    /// Build from a header row and string rows
    #[new]
    fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> PyResult<Self> {
        let wordlist = Wordlist::from_table(&header, &rows)?;
        Ok(Self {
            inner: LexStat::new(wordlist),
        })
    }

    /// Returns True when a new scorer was built, False when the cache was kept
    #[pyo3(signature = (runs=100, rands=1000, limit=10000, seed=1, method="shuffle", force=false))]
    fn get_scorer(
        &mut self,
        runs: usize,
        rands: usize,
        limit: usize,
        seed: u64,
        method: &str,
        force: bool,
    ) -> PyResult<bool> {
        let mut config = ScorerConfig::sampling(runs, rands, limit)
            .with_seed(seed)
            .with_method(method.parse()?);
        config.force = force;
        Ok(self.inner.get_scorer(&config)? == ScorerStatus::Built)
    }

    #[pyo3(signature = (method="sca", threshold=0.3, reference=None))]
    fn cluster(&mut self, method: &str, threshold: f64, reference: Option<String>) -> PyResult<usize> {
        let mut config = ClusterConfig::new(method, threshold)?;
        if let Some(reference) = reference {
            config = config.with_reference(reference);
        }
        Ok(self.inner.cluster(&config)?)
    }

    fn assignment(&self, reference: &str) -> PyResult<Vec<usize>> {
        Ok(self.inner.assignment(reference)?.to_vec())
    }

    fn cognate_sets(&self, reference: &str) -> PyResult<Vec<PyCognateSet>> {
        Ok(self
            .inner
            .cognate_sets(reference)?
            .into_iter()
            .map(PyCognateSet::from)
            .collect())
    }

    /// `(id, reason)` of every malformed entry
    fn errors(&self) -> Vec<(String, String)> {
        self.inner
            .errors()
            .entries()
            .iter()
            .map(|e| (e.id.clone(), e.reason.clone()))
            .collect()
    }
}

#[pyclass]
struct PyCognateSet {
    #[pyo3(get)]
    id: usize,
    #[pyo3(get)]
    members: Vec<usize>,
    #[pyo3(get)]
    size: usize,
}

impl From<CognateSet> for PyCognateSet {
    fn from(set: CognateSet) -> Self {
        Self {
            id: set.id,
            members: set.members,
            size: set.size,
        }
    }
}

// ============================================================================
// MODULE DEFINITION
// ============================================================================

#[pymodule]
fn lexstat_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_tokenize, m)?)?;
    m.add_function(wrap_pyfunction!(py_edit_distance, m)?)?;

    m.add_class::<PyLexStat>()?;
    m.add_class::<PyCognateSet>()?;

    Ok(())
}
