//! Sound-class reduction and the fixed class substitution model.
//!
//! Segments map onto an SCA-style alphabet of coarse classes. Vowels are
//! `A E I O U Y`, consonants `B C D G H J K L M N P R S T W`, and `0` marks
//! anything the table does not know.

/// Class symbol for unknown segments
pub const UNKNOWN_CLASS: char = '0';

const VOWEL_CLASSES: &str = "AEIOUY";

const CLASS_TABLE: &[(char, &str)] = &[
    ('A', "aɑæɐɒä"),
    ('E', "eɛəɜɘɞɤ"),
    ('I', "iɪɨ"),
    ('O', "oɔɵ"),
    ('U', "uʊɯʉ"),
    ('Y', "yʏøœɶ"),
    ('P', "pb"),
    ('B', "fvβɸ"),
    ('M', "mɱ"),
    ('W', "wʋʍɥ"),
    ('T', "tdʈɖ"),
    ('D', "θð"),
    ('N', "nŋɲɳɴ"),
    ('S', "szʃʒɕʑʂʐçʝ"),
    ('C', "ʦʣʧʤʨʥ"),
    ('K', "kgqɢɡcɟ"),
    ('G', "xɣχʁ"),
    ('H', "hɦʔħʕ"),
    ('J', "j"),
    ('L', "lɭʎɫɬɮʟ"),
    ('R', "rɾʀɹɽɻ"),
];

/// Consonant classes that substitute for each other more often than chance
const RELATED_CLASSES: &[(char, char)] = &[
    ('P', 'B'),
    ('B', 'W'),
    ('M', 'N'),
    ('T', 'D'),
    ('T', 'C'),
    ('S', 'C'),
    ('S', 'D'),
    ('K', 'G'),
    ('G', 'H'),
    ('L', 'R'),
];

/// Two-letter affricates written without a tie bar
const AFFRICATES: &[(&str, char)] = &[
    ("ts", 'C'),
    ("dz", 'C'),
    ("tʃ", 'C'),
    ("dʒ", 'C'),
    ("tɕ", 'C'),
    ("dʑ", 'C'),
    ("tʂ", 'C'),
    ("dʐ", 'C'),
    ("pf", 'B'),
];

/// Combining double inverted breve and double breve below
pub const TIE_BARS: [char; 2] = ['\u{0361}', '\u{035C}'];

/// Whether `segment` is exactly one of the untied affricates
pub fn is_affricate(segment: &str) -> bool {
    AFFRICATES.iter().any(|(affricate, _)| *affricate == segment)
}

fn affricate_class(segment: &str) -> Option<char> {
    let untied: String = segment.chars().filter(|c| !TIE_BARS.contains(c)).collect();
    AFFRICATES
        .iter()
        .find(|(affricate, _)| untied.starts_with(affricate))
        .map(|(_, class)| *class)
}

fn lookup(c: char) -> Option<char> {
    CLASS_TABLE
        .iter()
        .find(|(_, members)| members.contains(c))
        .map(|(class, _)| *class)
}

/// Sound class of a segment.
///
/// Affricates (`ts`, `t͡ʃ`, `pfʰ`, ...) are recognized as a whole; anything
/// else is decided by its first character.
pub fn sound_class(segment: &str) -> char {
    if let Some(class) = affricate_class(segment) {
        return class;
    }
    let Some(first) = segment.chars().next() else {
        return UNKNOWN_CLASS;
    };
    lookup(first)
        .or_else(|| first.to_lowercase().next().and_then(lookup))
        .unwrap_or(UNKNOWN_CLASS)
}

pub fn is_vowel_class(class: char) -> bool {
    VOWEL_CLASSES.contains(class)
}

/// Dolgopolsky-style reduction used by the Turchin comparison.
///
/// Returns `None` for vowels, which the comparison skips.
pub fn dolgopolsky_class(class: char) -> Option<char> {
    match class {
        c if is_vowel_class(c) => None,
        'P' | 'B' => Some('P'),
        'T' | 'D' => Some('T'),
        'S' | 'C' => Some('S'),
        'K' | 'G' => Some('K'),
        'L' | 'R' => Some('R'),
        'H' | UNKNOWN_CLASS => Some('H'),
        other => Some(other),
    }
}

/// Fixed substitution scores over sound classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassModel {
    pub consonant_match: f64,
    pub vowel_match: f64,
    pub unknown_match: f64,
    pub vowel_mismatch: f64,
    pub related_consonants: f64,
    pub consonant_mismatch: f64,
    pub vowel_consonant: f64,
}

impl Default for ClassModel {
    fn default() -> Self {
        Self {
            consonant_match: 10.0,
            vowel_match: 5.0,
            unknown_match: 2.0,
            vowel_mismatch: 1.0,
            related_consonants: 2.0,
            consonant_mismatch: -5.0,
            vowel_consonant: -10.0,
        }
    }
}

impl ClassModel {
    /// Symmetric substitution score of two classes
    pub fn score(&self, a: char, b: char) -> f64 {
        let (vowel_a, vowel_b) = (is_vowel_class(a), is_vowel_class(b));
        if a == b {
            return if vowel_a {
                self.vowel_match
            } else if a == UNKNOWN_CLASS {
                self.unknown_match
            } else {
                self.consonant_match
            };
        }
        match (vowel_a, vowel_b) {
            (true, true) => self.vowel_mismatch,
            (true, false) | (false, true) => self.vowel_consonant,
            (false, false) => {
                let related = RELATED_CLASSES
                    .iter()
                    .any(|&(x, y)| (x == a && y == b) || (x == b && y == a));
                if related {
                    self.related_consonants
                } else {
                    self.consonant_mismatch
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_class() {
        assert_eq!(sound_class("h"), 'H');
        assert_eq!(sound_class("a"), 'A');
        assert_eq!(sound_class("tʰ"), 'T');
        assert_eq!(sound_class("N"), 'N');
        assert_eq!(sound_class("3"), UNKNOWN_CLASS);
        assert_eq!(sound_class(""), UNKNOWN_CLASS);
    }

    #[test]
    fn test_affricate_class() {
        assert_eq!(sound_class("ts"), 'C');
        assert_eq!(sound_class("tʃ"), 'C');
        assert_eq!(sound_class("t\u{0361}ʃ"), 'C');
        assert_eq!(sound_class("tsʰ"), 'C');
        assert_eq!(sound_class("pf"), 'B');
        // plain stops keep their own class
        assert_eq!(sound_class("t"), 'T');
        assert!(is_affricate("dʒ"));
        assert!(!is_affricate("tsʰ"));
        assert!(!is_affricate("st"));
    }

    #[test]
    fn test_class_model_symmetry() {
        let model = ClassModel::default();
        let classes = "AEIOUYBCDGHJKLMNPRSTW0";
        for a in classes.chars() {
            for b in classes.chars() {
                assert_eq!(model.score(a, b), model.score(b, a));
            }
        }
    }

    #[test]
    fn test_class_model_values() {
        let model = ClassModel::default();
        assert_eq!(model.score('T', 'T'), 10.0);
        assert_eq!(model.score('A', 'A'), 5.0);
        assert_eq!(model.score('A', 'E'), 1.0);
        assert_eq!(model.score('T', 'D'), 2.0);
        assert_eq!(model.score('T', 'K'), -5.0);
        assert_eq!(model.score('A', 'K'), -10.0);
    }

    #[test]
    fn test_dolgopolsky() {
        assert_eq!(dolgopolsky_class('A'), None);
        assert_eq!(dolgopolsky_class('B'), Some('P'));
        assert_eq!(dolgopolsky_class('N'), Some('N'));
    }
}
