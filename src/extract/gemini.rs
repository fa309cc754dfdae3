//! Gemini `generateContent` client.

use super::{DocumentExtractor, SourceDocument};
use crate::config::GeminiConfig;
use crate::error::ExtractError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::thread;
use tracing::{debug, info, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Inline request payload cap, applied to the raw document before base64.
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Part<'a> {
    Text(&'a str),
    InlineData { mime_type: &'a str, data: String },
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, joined.
    fn into_text(self) -> Result<String, ExtractError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            Err(ExtractError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

fn request_body<'a>(document: &'a SourceDocument, instruction: &'a str) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: [Content {
            parts: vec![
                Part::Text(instruction),
                Part::InlineData {
                    mime_type: document.mime_type,
                    data: STANDARD.encode(&document.bytes),
                },
            ],
        }],
    }
}

/// Blocking Gemini extractor with retry.
pub struct GeminiExtractor {
    client: Client,
    config: GeminiConfig,
}

impl GeminiExtractor {
    pub fn new(config: GeminiConfig) -> Result<Self, ExtractError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        info!(model = %config.model, "gemini extractor ready");
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/models/{}:generateContent", self.config.model)
    }

    fn request_once(
        &self,
        document: &SourceDocument,
        instruction: &str,
    ) -> Result<String, ExtractError> {
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body(document, instruction))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ExtractError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = resp.json()?;
        payload.into_text()
    }
}

/// Refuse documents the API would reject, instead of retrying a sure 400.
fn check_inline_size(document: &SourceDocument) -> Result<(), ExtractError> {
    // base64 grows the payload by a third.
    let encoded = document.bytes.len().div_ceil(3) * 4;
    if encoded > MAX_INLINE_BYTES {
        return Err(ExtractError::DocumentTooLarge {
            path: document.path.clone(),
            size: document.bytes.len(),
            limit: MAX_INLINE_BYTES / 4 * 3,
        });
    }
    Ok(())
}

fn is_rate_limited(error: &ExtractError) -> bool {
    matches!(
        error,
        ExtractError::Service { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
    )
}

impl DocumentExtractor for GeminiExtractor {
    fn extract(&self, document: &SourceDocument, instruction: &str) -> Result<String, ExtractError> {
        check_inline_size(document)?;
        let attempts = self.config.retries.max(1);
        let base_delay = self.config.retry_delay();
        let mut last = String::new();

        for attempt in 1..=attempts {
            debug!(document = %document.path.display(), attempt, "requesting extraction");
            match self.request_once(document, instruction) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    let delay = if is_rate_limited(&e) {
                        base_delay * attempt
                    } else {
                        base_delay
                    };
                    last = e.to_string();
                    if attempt < attempts {
                        warn!(
                            attempt,
                            error = %e,
                            delay_secs = delay.as_secs_f64(),
                            "extraction failed, retrying"
                        );
                        thread::sleep(delay);
                    }
                }
            }
        }

        Err(ExtractError::RetriesExhausted { attempts, last })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn request_carries_instruction_and_inline_pdf() {
        let document = SourceDocument {
            path: PathBuf::from("공고.pdf"),
            bytes: b"%PDF".to_vec(),
            mime_type: "application/pdf",
        };
        let body = serde_json::to_value(request_body(&document, "추출하세요")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{
                    "parts": [
                        {"text": "추출하세요"},
                        {"inline_data": {"mime_type": "application/pdf", "data": "JVBERg=="}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn oversized_documents_are_refused_before_sending() {
        let document = |len: usize| SourceDocument {
            path: PathBuf::from("모집공고.pdf"),
            bytes: vec![0; len],
            mime_type: "application/pdf",
        };

        assert!(check_inline_size(&document(MAX_INLINE_BYTES / 4 * 3)).is_ok());
        let err = check_inline_size(&document(MAX_INLINE_BYTES)).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::DocumentTooLarge { size, .. } if size == MAX_INLINE_BYTES
        ));
    }

    #[test]
    fn response_text_parts_are_joined() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"일정\""}, {"text": ": []}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.into_text().unwrap(), r#"{"일정": []}"#);
    }

    #[test]
    fn blocked_response_is_empty() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "OTHER"}}"#).unwrap();
        assert!(matches!(resp.into_text(), Err(ExtractError::EmptyResponse)));
    }

    #[test]
    fn only_429_counts_as_rate_limited() {
        let limited = ExtractError::Service {
            status: 429,
            body: String::new(),
        };
        let failed = ExtractError::Service {
            status: 500,
            body: String::new(),
        };
        assert!(is_rate_limited(&limited));
        assert!(!is_rate_limited(&failed));
        assert!(!is_rate_limited(&ExtractError::EmptyResponse));
    }
}
