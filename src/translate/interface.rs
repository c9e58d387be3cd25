use async_trait::async_trait;

use crate::error::Result;

/// One line to translate. Empty language fields mean "use the default".
#[derive(Debug, Clone, Default)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslateRequest {
    pub fn new(source_lang: &str, target_lang: &str, text: &str) -> Self {
        Self {
            text: text.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

/// Translator interface trait
#[async_trait]
pub trait TranslatorInterface: Send + Sync {
    /// Translate `text` from `source_lang` into `target_lang`.
    ///
    /// An empty `source_lang` asks for detection, an empty `target_lang`
    /// falls back to the configured default.
    async fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> Result<String>;

    async fn translate_request(&self, request: &TranslateRequest) -> Result<String> {
        self.translate(&request.source_lang, &request.target_lang, &request.text)
            .await
    }
}
