use flate2::read::{GzDecoder, ZlibDecoder};
use reqwest::StatusCode;
use serde_json::Value;
use std::io::Read;

use crate::error::{Result, TranslateError};

pub const INVALID_REQUEST_CODE: i64 = -32600;
pub const SERVICE_ERROR_CODES: [i64; 2] = [1042911, 1042912];

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Decompress a body according to its `Content-Encoding`.
///
/// Unknown or missing encodings pass the bytes through untouched.
pub fn decode_body(content_encoding: Option<&str>, body: &[u8]) -> Result<Vec<u8>> {
    let encoding = content_encoding.map(|e| e.trim().to_ascii_lowercase());
    match encoding.as_deref() {
        Some("br") => decompress_brotli(body),
        Some("gzip") => {
            let mut out = Vec::new();
            GzDecoder::new(body)
                .read_to_end(&mut out)
                .map_err(|source| TranslateError::Decompress {
                    encoding: "gzip".to_string(),
                    source,
                })?;
            Ok(out)
        }
        Some("deflate") => {
            let mut out = Vec::new();
            ZlibDecoder::new(body)
                .read_to_end(&mut out)
                .map_err(|source| TranslateError::Decompress {
                    encoding: "deflate".to_string(),
                    source,
                })?;
            Ok(out)
        }
        _ => Ok(body.to_vec()),
    }
}

pub fn decompress_brotli(body: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    brotli::Decompressor::new(body, BROTLI_BUFFER_SIZE)
        .read_to_end(&mut out)
        .map_err(|source| TranslateError::Decompress {
            encoding: "br".to_string(),
            source,
        })?;
    Ok(out)
}

/// Map a decoded reply to the translated text.
///
/// Remote errors win over the status code; a reply with neither an error nor
/// a `result.texts[0].text` yields an empty string.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<String> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) if status == StatusCode::TOO_MANY_REQUESTS => {
            return Err(TranslateError::TooManyRequests(
                String::from_utf8_lossy(body).into_owned(),
            ));
        }
        Err(e) => return Err(TranslateError::Parse(e)),
    };

    let error = value.get("error");
    if let Some(code) = error.and_then(|e| e.get("code")).and_then(error_code) {
        if code == INVALID_REQUEST_CODE {
            let what = value
                .pointer("/error/data/what")
                .map(value_text)
                .unwrap_or_default();
            return Err(TranslateError::InvalidRequest(what));
        }
        if SERVICE_ERROR_CODES.contains(&code) {
            let message = value
                .pointer("/error/message")
                .map(value_text)
                .unwrap_or_default();
            return Err(TranslateError::Service { code, message });
        }
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranslateError::TooManyRequests(
            error.map(value_text).unwrap_or_default(),
        ));
    }

    Ok(value
        .pointer("/result/texts/0/text")
        .map(value_text)
        .unwrap_or_default())
}

/// Error codes arrive as numbers but are tolerated as numeric strings.
fn error_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strings come out unquoted, anything else as its JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
