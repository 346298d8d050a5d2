use crate::error::{AnalysisError, AnalysisResult};
use chatstats_core::config::TextConfig;
use chatstats_core::ChatStatsConfig;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, trace};
use unicode_bidi::BidiInfo;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

const ZWNJ: char = '\u{200C}';

/// Text normalizer for Persian and Arabic script.
///
/// Unifies Arabic letter variants to their Persian forms, strips diacritics and
/// tatweel, tidies zero-width non-joiners, and collapses whitespace. Latin text
/// passes through apart from whitespace handling and digits.
#[derive(Debug, Clone)]
pub struct Normalizer {
    persian_digits: bool,
    zwnj_space_regex: Regex,
    zwnj_repeat_regex: Regex,
    whitespace_regex: Regex,
    newline_regex: Regex,
}

impl Normalizer {
    /// Create a new Normalizer that maps digits to Persian digits.
    pub fn new() -> AnalysisResult<Self> {
        Ok(Self {
            persian_digits: true,
            zwnj_space_regex: Regex::new(r"\s+\x{200C}+|\x{200C}+\s+")
                .map_err(|e| AnalysisError::Nlp(e.to_string()))?,
            zwnj_repeat_regex: Regex::new(r"\x{200C}{2,}")
                .map_err(|e| AnalysisError::Nlp(e.to_string()))?,
            whitespace_regex: Regex::new(r"[^\S\n]+")
                .map_err(|e| AnalysisError::Nlp(e.to_string()))?,
            newline_regex: Regex::new(r"\n\s*\n\s*\n").map_err(|e| AnalysisError::Nlp(e.to_string()))?,
        })
    }

    /// Enable or disable digit conversion.
    pub fn with_persian_digits(mut self, enabled: bool) -> Self {
        self.persian_digits = enabled;
        self
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        let mut unified = String::with_capacity(text.len());
        for c in text.nfc() {
            if let Some(c) = self.unify_char(c) {
                unified.push(c);
            }
        }

        let text = self.zwnj_space_regex.replace_all(&unified, " ");
        let text = self.zwnj_repeat_regex.replace_all(&text, "\u{200C}");
        let text = self.whitespace_regex.replace_all(&text, " ");
        let text = self.newline_regex.replace_all(&text, "\n\n");
        text.trim_matches(|c: char| c.is_whitespace() || c == ZWNJ)
            .to_string()
    }

    /// Map one character to its normalized form, or drop it.
    fn unify_char(&self, c: char) -> Option<char> {
        match c {
            // Arabic kaf, yeh and alef maksura, ae
            '\u{0643}' => Some('\u{06A9}'),
            '\u{064A}' | '\u{0649}' => Some('\u{06CC}'),
            '\u{06D5}' => Some('\u{0647}'),
            // Harakat, superscript alef, tatweel
            '\u{064B}'..='\u{0652}' | '\u{0670}' | '\u{0640}' => None,
            '0'..='9' if self.persian_digits => shift_digit(c, '0'),
            '\u{0660}'..='\u{0669}' if self.persian_digits => shift_digit(c, '\u{0660}'),
            _ => Some(c),
        }
    }
}

fn shift_digit(c: char, zero: char) -> Option<char> {
    char::from_u32(0x06F0 + (c as u32 - zero as u32))
}

/// Word tokenizer following Unicode word boundaries.
///
/// Punctuation and emoji come out as their own tokens; whitespace is dropped.
/// Zero-width non-joiners stay inside the word they join.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    /// Split text into word tokens.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_word_bounds()
            .filter(|token| !token.trim().is_empty())
            .collect()
    }
}

/// Sentence tokenizer following Unicode sentence boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceTokenizer;

impl SentenceTokenizer {
    /// Split text into trimmed, non-empty sentences.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_sentence_bounds()
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .collect()
    }
}

/// Stop-word set, normalized the same way as the text it filters.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Load a word-per-line list.
    ///
    /// Lines are stripped of surrounding whitespace and empty lines are skipped.
    pub fn from_file(path: &Path, normalizer: &Normalizer) -> AnalysisResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let stop_words = Self::from_words(content.lines(), normalizer);
        info!(
            "Loaded {} stop words from {}",
            stop_words.len(),
            path.display()
        );
        Ok(stop_words)
    }

    /// Build the set from an in-memory word list.
    pub fn from_words<I, S>(words: I, normalizer: &Normalizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| normalizer.normalize(word.as_ref().trim()))
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    /// Check if a token is a stop word.
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Number of distinct stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Normalizer, tokenizer, and stop words bundled for one run.
#[derive(Debug, Clone)]
pub struct TextPipeline {
    normalizer: Normalizer,
    tokenizer: WordTokenizer,
    stop_words: StopWords,
    separator: String,
}

impl TextPipeline {
    /// Create a pipeline that joins surviving tokens with no separator.
    pub fn new(normalizer: Normalizer, stop_words: StopWords) -> Self {
        Self {
            normalizer,
            tokenizer: WordTokenizer,
            stop_words,
            separator: String::new(),
        }
    }

    /// Build the pipeline described by `config`, reading the stop-word list.
    pub fn from_config(config: &ChatStatsConfig) -> AnalysisResult<Self> {
        Self::from_text_config(&config.text, &config.stop_words_path())
    }

    /// Build a pipeline from text settings and an explicit stop-word file.
    pub fn from_text_config(text: &TextConfig, stop_words_path: &Path) -> AnalysisResult<Self> {
        let normalizer = Normalizer::new()?.with_persian_digits(text.persian_digits);
        let stop_words = StopWords::from_file(stop_words_path, &normalizer)?;
        Ok(Self::new(normalizer, stop_words).with_separator(text.token_separator.clone()))
    }

    /// Set the string placed between tokens kept by [`Self::remove_stop_words`].
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// The normalizer shared by text and stop words.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// The loaded stop words.
    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Separator between kept tokens.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Normalize and tokenize `text`, drop stop words, and join the rest.
    pub fn remove_stop_words(&self, text: &str) -> String {
        let normalized = self.normalizer.normalize(text);
        let tokens = self.tokenizer.tokenize(&normalized);
        let total = tokens.len();
        let kept: Vec<&str> = tokens
            .into_iter()
            .filter(|token| !self.stop_words.contains(token))
            .collect();
        trace!("Kept {} of {} tokens", kept.len(), total);
        kept.join(&self.separator)
    }
}

/// Reshape Arabic-script letters into their joined presentation forms and
/// reorder the text visually, so glyph-by-glyph renderers draw it correctly.
pub fn reshape_for_display(text: &str) -> String {
    let shaped = ar_reshaper::reshape_line(text);
    let bidi_info = BidiInfo::new(&shaped, None);

    let mut display = String::with_capacity(shaped.len());
    for paragraph in &bidi_info.paragraphs {
        let line = paragraph.range.clone();
        display.push_str(&bidi_info.reorder_line(paragraph, line));
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new().unwrap()
    }

    #[test]
    fn normalizer_unifies_arabic_letters() {
        assert_eq!(normalizer().normalize("كتاب علي"), "کتاب علی");
    }

    #[test]
    fn normalizer_strips_diacritics_and_tatweel() {
        assert_eq!(normalizer().normalize("مُحَمَّد"), "محمد");
        assert_eq!(normalizer().normalize("سلـــام"), "سلام");
    }

    #[test]
    fn normalizer_converts_digits_when_enabled() {
        assert_eq!(normalizer().normalize("room 12 ٣"), "room ۱۲ ۳");
        assert_eq!(
            normalizer().with_persian_digits(false).normalize("room 12"),
            "room 12"
        );
    }

    #[test]
    fn normalizer_tidies_whitespace_and_zwnj() {
        assert_eq!(
            normalizer().normalize("  می\u{200C}\u{200C}روم   به \u{200C}خانه \n\n\n\nفردا "),
            "می\u{200C}روم به خانه \n\nفردا"
        );
    }

    #[test]
    fn word_tokenizer_keeps_punctuation_and_zwnj_words() {
        let tokens = WordTokenizer.tokenize("می\u{200C}روم، خانه؟ ok!");
        assert_eq!(tokens, vec!["می\u{200C}روم", "،", "خانه", "؟", "ok", "!"]);
    }

    #[test]
    fn sentence_tokenizer_splits_on_terminators() {
        let sentences = SentenceTokenizer.tokenize("Hello there. Are you free? Yes!");
        assert_eq!(sentences, vec!["Hello there.", "Are you free?", "Yes!"]);
        assert!(SentenceTokenizer.tokenize("   ").is_empty());
    }

    #[test]
    fn stop_words_are_trimmed_and_normalized() {
        let stop_words = StopWords::from_words(["  از ", "", "كه\t"], &normalizer());
        assert_eq!(stop_words.len(), 2);
        assert!(stop_words.contains("از"));
        assert!(stop_words.contains("که"));
    }

    #[test]
    fn stop_words_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop_words.txt");
        std::fs::write(&path, "the\na  \n\nو\n").unwrap();

        let stop_words = StopWords::from_file(&path, &normalizer()).unwrap();
        assert_eq!(stop_words.len(), 3);
        assert!(stop_words.contains("the"));
        assert!(!stop_words.contains("cat"));
    }

    #[test]
    fn removal_joins_kept_tokens_without_separator() {
        let normalizer = normalizer();
        let stop_words = StopWords::from_words(["the", "a"], &normalizer);
        let pipeline = TextPipeline::new(normalizer, stop_words);

        assert_eq!(pipeline.remove_stop_words("the cat sat"), "catsat");
        assert_eq!(pipeline.remove_stop_words("the a"), "");
    }

    #[test]
    fn removal_uses_configured_separator() {
        let normalizer = normalizer();
        let stop_words = StopWords::from_words(["را"], &normalizer);
        let pipeline = TextPipeline::new(normalizer, stop_words).with_separator(" ");

        assert_eq!(pipeline.remove_stop_words("كتاب را خواندم"), "کتاب خواندم");
    }

    #[test]
    fn display_shaping_leaves_latin_text_alone() {
        assert_eq!(reshape_for_display("rust lang"), "rust lang");
    }

    #[test]
    fn display_shaping_reverses_rtl_order() {
        let display = reshape_for_display("کتاب");
        assert_eq!(display.chars().count(), 4);
        assert_ne!(display, "کتاب");
    }
}
