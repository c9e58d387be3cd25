use isolang::Language;
use whatlang::{Detector, Lang};

/// Source-language detection, used when no source language is given.
/// Yields an uppercase ISO 639-1 code.
pub trait LanguageDetector: Send + Sync {
    /// `None` when the text gives no usable signal.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Whatlang-based detector
pub struct WhatlangDetector {
    detector: Detector,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let lang = self.detector.detect_lang(text)?;
        iso_639_1(lang).map(|code| code.to_uppercase())
    }
}

fn iso_639_1(lang: Lang) -> Option<&'static str> {
    match lang {
        // whatlang reports Mandarin, which has no two-letter code of its own
        Lang::Cmn => Some("zh"),
        l => Language::from_639_3(l.code()).and_then(|l| l.to_639_1()),
    }
}
