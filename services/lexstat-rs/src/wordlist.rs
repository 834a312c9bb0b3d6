//! Wordlist entries and tabular construction.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{LexStatError, Result};

/// One word: a transcription of a concept in a doculect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub doculect: String,
    pub concept: String,
    pub transcription: String,
    /// Externally supplied segmentation, if any
    pub tokens: Option<Vec<String>>,
}

impl Entry {
    pub fn new(
        id: impl Into<String>,
        doculect: impl Into<String>,
        concept: impl Into<String>,
        transcription: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            doculect: doculect.into(),
            concept: concept.into(),
            transcription: transcription.into(),
            tokens: None,
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<String>) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

/// Ordered collection of entries with unique identifiers
#[derive(Debug, Clone, Default)]
pub struct Wordlist {
    entries: Vec<Entry>,
    ids: AHashSet<String>,
}

const ID_COLUMNS: &[&str] = &["id"];
const DOCULECT_COLUMNS: &[&str] = &["doculect", "language", "taxon"];
const CONCEPT_COLUMNS: &[&str] = &["concept", "gloss"];
const IPA_COLUMNS: &[&str] = &["ipa", "transcription", "form"];
const TOKEN_COLUMNS: &[&str] = &["tokens", "segments"];

impl Wordlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) -> Result<()> {
        if !self.ids.insert(entry.id.clone()) {
            return Err(LexStatError::DuplicateEntry { id: entry.id });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Build from a header row and string rows.
    ///
    /// Header names are case-insensitive. `id`, `doculect` and `concept` are
    /// required, plus `ipa` or `tokens` (whitespace-separated segments).
    pub fn from_table<S: AsRef<str>>(header: &[S], rows: &[Vec<S>]) -> Result<Self> {
        let columns: Vec<String> = header
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let find = |names: &[&str]| columns.iter().position(|c| names.contains(&c.as_str()));

        let id_col = find(ID_COLUMNS).ok_or_else(|| LexStatError::missing_field("id"))?;
        let doculect_col =
            find(DOCULECT_COLUMNS).ok_or_else(|| LexStatError::missing_field("doculect"))?;
        let concept_col =
            find(CONCEPT_COLUMNS).ok_or_else(|| LexStatError::missing_field("concept"))?;
        let ipa_col = find(IPA_COLUMNS);
        let token_col = find(TOKEN_COLUMNS);
        if ipa_col.is_none() && token_col.is_none() {
            return Err(LexStatError::missing_field("ipa or tokens"));
        }

        let mut wordlist = Self::new();
        for (row_idx, row) in rows.iter().enumerate() {
            let cell = |col: usize| {
                row.get(col).map(|c| c.as_ref()).ok_or_else(|| {
                    LexStatError::invalid_parameter(format!(
                        "row {} has {} cells, expected at least {}",
                        row_idx + 1,
                        row.len(),
                        col + 1
                    ))
                })
            };

            let tokens = match token_col {
                Some(col) => Some(
                    cell(col)?
                        .split(char::is_whitespace)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                ),
                None => None,
            };
            let transcription = match ipa_col {
                Some(col) => cell(col)?.to_string(),
                None => tokens.as_ref().map(|t| t.join(" ")).unwrap_or_default(),
            };

            let mut entry = Entry::new(
                cell(id_col)?,
                cell(doculect_col)?,
                cell(concept_col)?,
                transcription,
            );
            entry.tokens = tokens;
            wordlist.push(entry)?;
        }
        Ok(wordlist)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&Entry> {
        self.entries.get(idx)
    }

    /// Position of the entry with the given identifier
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Doculect names in order of first appearance
    pub fn doculects(&self) -> Vec<String> {
        first_appearance(self.entries.iter().map(|e| e.doculect.as_str()))
    }

    /// Concept names in order of first appearance
    pub fn concepts(&self) -> Vec<String> {
        first_appearance(self.entries.iter().map(|e| e.concept.as_str()))
    }
}

fn first_appearance<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = AHashSet::new();
    names
        .filter(|n| seen.insert(*n))
        .map(str::to_string)
        .collect()
}
