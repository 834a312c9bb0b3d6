//! Segmentation of transcriptions and prosodic context.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::sound_class::{is_affricate, is_vowel_class, sound_class, TIE_BARS};

/// Split a transcription into phonetic segments.
///
/// Input containing whitespace is taken as already segmented. Otherwise each
/// extended grapheme cluster is a segment, except that spacing modifier
/// letters (aspiration, length, labialization, ...) attach to the preceding
/// one and affricates (`ts`, `tʃ`, `t͡s`, ...) stay together.
/// Re-segmenting `segments.join(" ")` returns the same segments.
pub fn tokenize(transcription: &str) -> Vec<String> {
    let transcription = transcription.trim();
    if transcription.contains(char::is_whitespace) {
        return transcription
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }

    let mut segments: Vec<String> = Vec::new();
    for grapheme in transcription.graphemes(true) {
        match segments.last_mut() {
            Some(last) if joins(last, grapheme) => last.push_str(grapheme),
            _ => segments.push(grapheme.to_string()),
        }
    }
    segments
}

fn joins(last: &str, grapheme: &str) -> bool {
    is_modifier(grapheme)
        || last.ends_with(TIE_BARS)
        || is_affricate(&format!("{}{}", last, grapheme))
}

fn is_modifier(grapheme: &str) -> bool {
    grapheme.chars().next().map_or(false, |c| {
        matches!(c as u32, 0x02B0..=0x02FF | 0x1D2C..=0x1DBF)
    })
}

/// Position of a segment within the syllable structure of its word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prosody {
    /// Word-initial consonant
    Initial,
    /// Consonant before a vowel
    Ascending,
    Vowel,
    /// Medial consonant not followed by a vowel
    Descending,
    /// Word-final consonant
    Final,
}

impl Prosody {
    pub fn symbol(&self) -> char {
        match self {
            Prosody::Initial => '#',
            Prosody::Ascending => 'C',
            Prosody::Vowel => 'V',
            Prosody::Descending => 'c',
            Prosody::Final => '$',
        }
    }
}

impl fmt::Display for Prosody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Prosodic context of every position in a class sequence
pub fn prosodic_string(classes: &[char]) -> Vec<Prosody> {
    let n = classes.len();
    classes
        .iter()
        .enumerate()
        .map(|(i, &class)| {
            if is_vowel_class(class) {
                Prosody::Vowel
            } else if i == 0 {
                Prosody::Initial
            } else if i == n - 1 {
                Prosody::Final
            } else if is_vowel_class(classes[i + 1]) {
                Prosody::Ascending
            } else {
                Prosody::Descending
            }
        })
        .collect()
}

/// A validated word: segments with their classes and prosody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub segments: Vec<String>,
    pub classes: Vec<char>,
    pub prosody: Vec<Prosody>,
}

impl Word {
    /// Derive classes and prosody; `None` when there are no segments
    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let classes: Vec<char> = segments.iter().map(|s| sound_class(s)).collect();
        let prosody = prosodic_string(&classes);
        Some(Self {
            segments,
            classes,
            prosody,
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A word with the indices of its language-specific sounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedWord {
    pub doculect: usize,
    pub word: Word,
    pub chars: Vec<usize>,
}

/// Segment an entry.
///
/// Supplied tokens are taken as given once they pass validation: none may be
/// empty or contain whitespace, and they must either spell out the
/// transcription or match its re-segmentation in number. Returns the reason
/// on failure; callers record it as a data-quality error.
pub fn segment_entry(transcription: &str, tokens: Option<&[String]>) -> Result<Word, String> {
    let segments = match tokens {
        Some(tokens) => {
            check_tokens(transcription, tokens)?;
            tokens.to_vec()
        }
        None => tokenize(transcription),
    };

    Word::from_segments(segments).ok_or_else(|| "no segments".to_string())
}

fn check_tokens(transcription: &str, tokens: &[String]) -> Result<(), String> {
    for token in tokens {
        if token.is_empty() {
            return Err("empty segment".to_string());
        }
        if token.contains(char::is_whitespace) {
            return Err(format!("segment '{}' contains whitespace", token));
        }
    }

    let expected = tokenize(transcription);
    if expected.is_empty() || expected.len() == tokens.len() {
        return Ok(());
    }
    let spelled: String = transcription.split_whitespace().collect();
    if spelled == tokens.concat() {
        return Ok(());
    }
    Err(format!(
        "{} tokens supplied for {} segments of '{}'",
        tokens.len(),
        expected.len(),
        transcription
    ))
}
