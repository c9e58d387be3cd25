use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::error::Result;
use crate::translate::{TranslateRequest, TranslatorInterface};

#[derive(Debug, Clone, Default)]
pub struct PipeOptions {
    pub source_lang: String,
    pub target_lang: String,
    /// Write the original line after each translation.
    pub print_original: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipeSummary {
    pub translated: usize,
    pub failed: usize,
}

impl PipeSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Translate every line of `input` into `output`, one request at a time.
///
/// A failed translation is logged and skipped; reading or writing failures
/// end the run.
pub async fn run<T, R, W>(
    translator: &T,
    options: &PipeOptions,
    input: R,
    mut output: W,
) -> Result<PipeSummary>
where
    T: TranslatorInterface + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = PipeSummary::default();
    let mut lines = input.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            output.write_all(b"\n").await?;
            continue;
        }

        let request = TranslateRequest::new(&options.source_lang, &options.target_lang, line);
        match translator.translate_request(&request).await {
            Ok(translated) => {
                output.write_all(translated.as_bytes()).await?;
                output.write_all(b"\n").await?;
                if options.print_original {
                    output.write_all(line.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
                summary.translated += 1;
            }
            Err(e) => {
                error!("Translation error on line {}: {}", line_no, e);
                summary.failed += 1;
            }
        }
        output.flush().await?;
    }

    output.flush().await?;
    info!(
        "Finished: {} translated, {} failed",
        summary.translated, summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Uppercases text, fails on lines containing "fail", records what it saw.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl TranslatorInterface for Recording {
        async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((source.to_string(), target.to_string(), text.to_string()));
            if text.contains("fail") {
                return Err(TranslateError::TooManyRequests("busy".to_string()));
            }
            Ok(text.to_uppercase())
        }
    }

    async fn run_on(input: &str, options: PipeOptions) -> (String, PipeSummary, Recording) {
        let translator = Recording::default();
        let mut out = Vec::new();
        let summary = run(&translator, &options, input.as_bytes(), &mut out)
            .await
            .unwrap();
        (String::from_utf8(out).unwrap(), summary, translator)
    }

    #[tokio::test]
    async fn translates_each_line() {
        let (out, summary, _) = run_on("one\ntwo\n", PipeOptions::default()).await;
        assert_eq!(out, "ONE\nTWO\n");
        assert_eq!(summary, PipeSummary { translated: 2, failed: 0 });
    }

    #[tokio::test]
    async fn last_line_without_newline_is_translated() {
        let (out, _, _) = run_on("one\r\ntwo", PipeOptions::default()).await;
        assert_eq!(out, "ONE\nTWO\n");
    }

    #[tokio::test]
    async fn prints_original_after_translation() {
        let options = PipeOptions {
            print_original: true,
            ..Default::default()
        };
        let (out, _, _) = run_on("hi\n", options).await;
        assert_eq!(out, "HI\nhi\n");
    }

    #[tokio::test]
    async fn failures_are_counted_and_skipped() {
        let (out, summary, _) = run_on("a\nfail here\nb\n", PipeOptions::default()).await;
        assert_eq!(out, "A\nB\n");
        assert_eq!(summary, PipeSummary { translated: 2, failed: 1 });
        assert!(!summary.all_succeeded());
    }

    #[tokio::test]
    async fn blank_lines_skip_the_translator() {
        let (out, summary, translator) = run_on("a\n\n  \nb\n", PipeOptions::default()).await;
        assert_eq!(out, "A\n\n\nB\n");
        assert_eq!(summary.translated, 2);
        assert_eq!(translator.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn passes_languages_through() {
        let options = PipeOptions {
            source_lang: "EN".to_string(),
            target_lang: "JA".to_string(),
            print_original: false,
        };
        let (_, _, translator) = run_on("x\n", options).await;
        let seen = translator.seen.lock().unwrap();
        assert_eq!(seen[0], ("EN".to_string(), "JA".to_string(), "x".to_string()));
    }
}
