use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::header::CONTENT_ENCODING;
use reqwest::Client;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::decode::{decode_body, interpret_response};
use super::detect::{LanguageDetector, WhatlangDetector};
use super::interface::TranslatorInterface;
use super::payload::{decoy_timestamp, random_id, trigger_count, MethodKeySpacing, RpcRequest};
use crate::config::{ClientIdentity, Config};
use crate::error::Result;

/// Client for the DeepL `jsonrpc` endpoint, presenting itself as the iOS app.
pub struct DeepLClient {
    client: Client,
    endpoint: String,
    default_target_lang: String,
    identity: ClientIdentity,
    detector: Arc<dyn LanguageDetector>,
    rng: Mutex<StdRng>,
}

impl DeepLClient {
    /// Create a client from configuration, seeding the id generator from the OS.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a client with an explicit random source.
    pub fn with_rng(config: &Config, rng: StdRng) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            default_target_lang: config.default_target_lang.clone(),
            identity: config.client.clone(),
            detector: Arc::new(WhatlangDetector::new()),
            rng: Mutex::new(rng),
        })
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    fn next_id(&self) -> i64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        random_id(&mut *rng)
    }

    fn resolve_source(&self, source_lang: &str, text: &str) -> String {
        if !source_lang.is_empty() {
            return source_lang.to_string();
        }
        match self.detector.detect(text) {
            Some(code) => {
                debug!("Detected source language {}", code);
                code
            }
            None => {
                warn!("Could not detect source language, leaving it to the server");
                String::new()
            }
        }
    }

    /// Build the request body for one text, returning it with its id.
    pub fn build_body(&self, source_lang: &str, target_lang: &str, text: &str) -> Result<(i64, String)> {
        let source_lang = self.resolve_source(source_lang, text);
        let target_lang = if target_lang.is_empty() {
            self.default_target_lang.as_str()
        } else {
            target_lang
        };

        let id = self.next_id();
        let timestamp = decoy_timestamp(chrono::Utc::now().timestamp_millis(), trigger_count(text));
        let body = RpcRequest::new(&source_lang, target_lang, text, id, timestamp)
            .to_wire(MethodKeySpacing::for_id(id))?;

        debug!(
            "Built request id={} timestamp={} {}->{}",
            id, timestamp, source_lang, target_lang
        );
        Ok((id, body))
    }
}

#[async_trait]
impl TranslatorInterface for DeepLClient {
    async fn translate(&self, source_lang: &str, target_lang: &str, text: &str) -> Result<String> {
        let (id, body) = self.build_body(source_lang, target_lang, text)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "*/*")
            .header("x-app-os-name", "iOS")
            .header("x-app-os-version", self.identity.os_version.as_str())
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("x-app-device", self.identity.device.as_str())
            .header("User-Agent", self.identity.user_agent())
            .header("x-app-build", self.identity.app_build.as_str())
            .header("x-app-version", self.identity.app_version.as_str())
            .header("Connection", "keep-alive")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let raw = response.bytes().await?;
        debug!(
            "Response for id={}: status={} encoding={:?} {} bytes",
            id,
            status,
            encoding,
            raw.len()
        );

        let decoded = decode_body(encoding.as_deref(), &raw)?;
        interpret_response(status, &decoded)
    }
}
