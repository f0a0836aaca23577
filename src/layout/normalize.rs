//! OCR text normalization.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Optional cleanup applied on top of the line-joining rule.
///
/// Everything is off by default, so the default normalizer only joins
/// hyphenated line breaks, turns the remaining breaks into spaces and trims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub unicode_nfc: bool,

    /// Expand typographic ligatures (ﬁ → fi)
    pub fix_ligatures: bool,

    /// Collapse runs of spaces and tabs into one space
    pub collapse_spaces: bool,
}

impl NormalizeOptions {
    /// Every optional cleanup enabled.
    pub fn full() -> Self {
        Self {
            unicode_nfc: true,
            fix_ligatures: true,
            collapse_spaces: true,
        }
    }

    pub fn with_unicode_nfc(mut self, enabled: bool) -> Self {
        self.unicode_nfc = enabled;
        self
    }

    pub fn with_fix_ligatures(mut self, enabled: bool) -> Self {
        self.fix_ligatures = enabled;
        self
    }

    pub fn with_collapse_spaces(mut self, enabled: bool) -> Self {
        self.collapse_spaces = enabled;
        self
    }
}

/// Turns raw OCR output into a single clean line of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer {
    options: NormalizeOptions,
}

impl TextNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize one block of OCR output.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = if self.options.unicode_nfc {
            raw.nfc().collect::<String>()
        } else {
            raw.to_string()
        };

        if self.options.fix_ligatures {
            text = expand_ligatures(&text);
        }

        text = join_lines(&text);

        if self.options.collapse_spaces {
            text = space_run().replace_all(&text, " ").into_owned();
        }

        text.trim().to_string()
    }
}

/// Normalize with default options.
pub fn normalize_ocr_text(raw: &str) -> String {
    TextNormalizer::default().normalize(raw)
}

// Hyphenated breaks are dropped before other breaks become spaces.
fn join_lines(text: &str) -> String {
    text.replace("-\n", "").replace('\n', " ")
}

fn expand_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expanded)) => out.push_str(expanded),
            None => out.push(c),
        }
    }
    out
}

fn space_run() -> &'static Regex {
    static SPACE_RUN: OnceLock<Regex> = OnceLock::new();
    SPACE_RUN.get_or_init(|| Regex::new(r"[ \t]{2,}").expect("literal pattern is valid"))
}
