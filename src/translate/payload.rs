use rand::Rng;
use serde::Serialize;

pub const METHOD: &str = "LMT_handle_texts";

/// Character whose occurrences drive the timestamp adjustment
pub const TRIGGER_CHAR: char = 'i';

const ID_BASE_MIN: i64 = 8_300_000;
const ID_BASE_MAX: i64 = 8_399_999;
const ID_SCALE: i64 = 1000;

const COMPACT_METHOD_KEY: &str = "\"method\":\"";

// JSON-RPC body for `LMT_handle_texts`, as the iOS app sends it
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: i64,
    pub params: Params,
}

#[derive(Debug, Clone, Serialize)]
pub struct Params {
    pub texts: Vec<TextItem>,
    pub splitting: String,
    pub lang: LangPair,
    pub timestamp: i64,
    #[serde(rename = "commonJobParams")]
    pub common_job_params: CommonJobParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextItem {
    pub text: String,
    #[serde(rename = "requestAlternatives")]
    pub request_alternatives: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LangPair {
    pub source_lang_user_selected: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommonJobParams {
    #[serde(rename = "wasSpoken")]
    pub was_spoken: bool,
    pub transcribe_as: String,
}

impl RpcRequest {
    pub fn new(source_lang: &str, target_lang: &str, text: &str, id: i64, timestamp: i64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: METHOD.to_string(),
            id,
            params: Params {
                texts: vec![TextItem {
                    text: text.to_string(),
                    request_alternatives: 3,
                }],
                splitting: "newlines".to_string(),
                lang: LangPair {
                    source_lang_user_selected: source_lang.to_string(),
                    target_lang: target_lang.to_string(),
                },
                timestamp,
                common_job_params: CommonJobParams::default(),
            },
        }
    }

    /// Serialize compactly, then rewrite the method key with `spacing`.
    pub fn to_wire(&self, spacing: MethodKeySpacing) -> serde_json::Result<String> {
        let compact = serde_json::to_string(self)?;
        Ok(spacing.apply(&compact))
    }
}

/// How the `"method"` key is separated from its value in the serialized body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKeySpacing {
    /// `"method" : "`
    Both,
    /// `"method": "`
    After,
}

impl MethodKeySpacing {
    /// Choose the spacing the app uses for a given request id.
    pub fn for_id(id: i64) -> Self {
        if (id + 5) % 29 == 0 || (id + 3) % 13 == 0 {
            Self::Both
        } else {
            Self::After
        }
    }

    pub fn replacement(self) -> &'static str {
        match self {
            Self::Both => "\"method\" : \"",
            Self::After => "\"method\": \"",
        }
    }

    pub fn apply(self, serialized: &str) -> String {
        serialized.replace(COMPACT_METHOD_KEY, self.replacement())
    }
}

/// Draw a request id: a value in `[8_300_000, 8_399_999]` scaled by 1000.
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.random_range(ID_BASE_MIN..=ID_BASE_MAX) * ID_SCALE
}

pub fn trigger_count(text: &str) -> i64 {
    text.chars().filter(|&c| c == TRIGGER_CHAR).count() as i64
}

/// Round `now_millis` up past the next multiple of `count + 1`.
///
/// With no trigger characters the clock is returned as-is.
pub fn decoy_timestamp(now_millis: i64, count: i64) -> i64 {
    if count == 0 {
        return now_millis;
    }
    let modulus = count + 1;
    now_millis - now_millis % modulus + modulus
}
