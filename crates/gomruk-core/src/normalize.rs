//! Correction of systematic OCR misreads for the Azerbaijani Latin alphabet.
//!
//! The rules run in a fixed order:
//!
//! 1. non-breaking spaces become plain spaces
//! 2. base letter + combining mark sequences become precomposed letters
//! 3. look-alike code points become the alphabet's own letters (`ǝ` → `ə`, `ș` → `ş`)
//! 4. whole-word corrections for form vocabulary read without diacritics
//! 5. runs of spaces and tabs collapse to one space; line ends are trimmed
//!
//! Rule 4 matches words produced by rules 2 and 3, so it must stay after
//! them. Every rule's output is outside the domain of every rule, which makes
//! the whole pass idempotent.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

lazy_static! {
    static ref WORD_RULES: Vec<(Regex, &'static str)> = WORDS
        .iter()
        .map(|(from, to)| (Regex::new(&format!(r"\b{}\b", regex::escape(from))).unwrap(), *to))
        .collect();
    static ref HORIZONTAL_RUNS: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref TRAILING_SPACE: Regex = Regex::new(r"(?m) +$").unwrap();
    static ref LEADING_SPACE: Regex = Regex::new(r"(?m)^ +").unwrap();
}

/// Combining sequences and the precomposed letter they stand for.
const COMBINING: &[(&str, &str)] = &[
    ("s\u{0327}", "ş"),
    ("S\u{0327}", "Ş"),
    ("c\u{0327}", "ç"),
    ("C\u{0327}", "Ç"),
    ("g\u{0306}", "ğ"),
    ("G\u{0306}", "Ğ"),
    ("o\u{0308}", "ö"),
    ("O\u{0308}", "Ö"),
    ("u\u{0308}", "ü"),
    ("U\u{0308}", "Ü"),
    ("I\u{0307}", "İ"),
    ("i\u{0307}", "i"),
];

/// Code points that look like alphabet letters but are not.
const LOOK_ALIKES: &[(char, char)] = &[
    ('ǝ', 'ə'),
    ('Ǝ', 'Ə'),
    ('ș', 'ş'),
    ('Ș', 'Ş'),
    ('ţ', 't'),
];

/// Form vocabulary commonly recognized without its diacritics.
const WORDS: &[(&str, &str)] = &[
    ("Gonderen", "Göndərən"),
    ("GONDEREN", "GÖNDƏRƏN"),
    ("Ixracatci", "İxracatçı"),
    ("IXRACATCI", "İXRACATÇI"),
    ("Unvan", "Ünvan"),
    ("UNVAN", "ÜNVAN"),
    ("VOEN", "VÖEN"),
    ("Voen", "VÖEN"),
    ("OGLU", "OĞLU"),
    ("oglu", "oğlu"),
    ("GOMRUK", "GÖMRÜK"),
    ("Gomruk", "Gömrük"),
    ("Soyadi", "Soyadı"),
    ("Atasinin", "Atasının"),
];

/// Deterministic rewrite pass over recognized and native text.
///
/// The normalizer holds no state: the same input always yields the same output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Create a normalizer with the built-in rule set.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a text. Never fails.
    pub fn normalize(&self, text: &str) -> String {
        let mut out = text.replace('\u{00A0}', " ");

        for (from, to) in COMBINING {
            // `i` + dot yields `i`, which can pair with a following dot again
            while out.contains(from) {
                out = out.replace(from, to);
            }
        }

        if out.chars().any(|c| LOOK_ALIKES.iter().any(|(from, _)| *from == c)) {
            out = out
                .chars()
                .map(|c| {
                    LOOK_ALIKES
                        .iter()
                        .find(|(from, _)| *from == c)
                        .map_or(c, |(_, to)| *to)
                })
                .collect();
        }

        for (pattern, replacement) in WORD_RULES.iter() {
            if pattern.is_match(&out) {
                trace!("Correcting {} -> {}", pattern, replacement);
                out = pattern.replace_all(&out, *replacement).into_owned();
            }
        }

        let out = HORIZONTAL_RUNS.replace_all(&out, " ");
        let out = TRAILING_SPACE.replace_all(&out, "");
        LEADING_SPACE.replace_all(&out, "").into_owned()
    }
}
