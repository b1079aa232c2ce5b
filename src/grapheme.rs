//! `grapheme` — segmentation and comparison of user-perceived characters.
//!
//! Every grid cell holds exactly one grapheme cluster, never a raw code
//! unit, so all placement decisions go through this module. Text is
//! NFC-normalized first, then segmented into extended grapheme clusters
//! (UAX #29, including the Indic conjunct rules), which keeps Devanagari
//! clusters like क्र in a single cell.
//!
//! The editor export alphabet wraps multi-codepoint graphemes in `{…}`
//! so a downstream consumer can re-tokenize an answer without running
//! its own segmenter: single-codepoint graphemes appear bare.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Zero-width characters stripped from answers (ZWSP, ZWNJ, ZWJ, BOM).
const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Punctuation stripped from answers before normalization.
const STRIPPED_PUNCTUATION: &str = ".,!?;:'\"()[]{}-\u{2013}\u{2014}";

/// BCP-47 language tag carried alongside text.
///
/// Segmentation currently uses the locale-independent default rules; the
/// tag is kept so callers record which language produced the answer set
/// and so tailored segmentation can slot in without an API change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// NFC-normalize a string.
#[must_use]
pub fn nfc(text: &str) -> String {
    text.nfc().collect()
}

/// NFC-normalize, then segment into grapheme clusters.
///
/// Concatenating the result round-trips to `nfc(text)`.
#[must_use]
pub fn to_graphemes(text: &str, locale: &Locale) -> Vec<String> {
    // default rules are locale-independent until tailoring lands
    let _ = locale;
    nfc(text)
        .graphemes(true)
        .map(str::to_string)
        .collect()
}

/// Number of grapheme clusters in `text`.
#[must_use]
pub fn grapheme_length(text: &str, locale: &Locale) -> usize {
    let _ = locale;
    nfc(text).graphemes(true).count()
}

/// The `i`-th grapheme cluster of `text`, if any.
#[must_use]
pub fn grapheme_at(text: &str, i: usize, locale: &Locale) -> Option<String> {
    to_graphemes(text, locale).into_iter().nth(i)
}

/// Number of Unicode scalar values in a single grapheme.
#[must_use]
pub fn codepoint_count(g: &str) -> usize {
    g.chars().count()
}

/// A grapheme is multi-codepoint iff it holds more than one scalar value
/// (e.g. a consonant+virama+consonant conjunct, or an emoji ZWJ sequence).
#[must_use]
pub fn is_multi_codepoint(g: &str) -> bool {
    codepoint_count(g) > 1
}

/// Encode one grapheme for the export alphabet: multi-codepoint graphemes
/// are wrapped in braces, single-codepoint graphemes pass through bare.
#[must_use]
pub fn encode_grapheme(g: &str) -> String {
    if is_multi_codepoint(g) {
        format!("{{{g}}}")
    } else {
        g.to_string()
    }
}

/// Encode a whole answer per [`encode_grapheme`].
#[must_use]
pub fn encode_answer(text: &str, locale: &Locale) -> String {
    to_graphemes(text, locale)
        .iter()
        .map(|g| encode_grapheme(g))
        .collect()
}

/// Two graphemes are equal iff their NFC forms are byte-equal.
#[must_use]
pub fn compare_graphemes(a: &str, b: &str) -> bool {
    // Fast path: inputs coming out of `to_graphemes` are already NFC.
    a == b || nfc(a) == nfc(b)
}

/// All index pairs `(i, j)` where `a[i]` and `b[j]` are the same grapheme,
/// emitted in `(i ascending, j ascending)` order.
#[must_use]
pub fn find_common_graphemes(a: &[String], b: &[String]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, ga) in a.iter().enumerate() {
        for (j, gb) in b.iter().enumerate() {
            if compare_graphemes(ga, gb) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Strip ASCII whitespace, zero-width characters, and sentence punctuation
/// from an answer, then NFC-normalize what remains.
///
/// Clues are left untouched; only answers become grid cells.
#[must_use]
pub fn clean_answer_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| {
            !c.is_ascii_whitespace()
                && !ZERO_WIDTH.contains(c)
                && !STRIPPED_PUNCTUATION.contains(*c)
        })
        .collect();
    nfc(&stripped)
}
