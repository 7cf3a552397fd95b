//! Gemini provider using the `generateContent` REST API.
//!
//! Sends the user prompt and the image as inline base64 data, with the
//! prompt variant as `systemInstruction` and all safety filters disabled.

use super::provider::{CaptionProvider, CaptionRequest, CaptionResponse, SafetySetting};
use crate::error::CaptionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default API base URL.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider for `model` at `endpoint` with a request timeout.
    pub fn with_endpoint(
        api_key: &str,
        model: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<Content<'a>>,
    safety_settings: &'a [SafetySetting],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a CaptionRequest) -> Self {
        Self {
            system_instruction: SystemInstruction {
                parts: vec![Part::Text {
                    text: &request.system_instruction,
                }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: &request.prompt,
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.media_type.as_deref(),
                            data: &request.image.data,
                        },
                    },
                ],
            }],
            safety_settings: &request.safety,
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Collapse the envelope into a `CaptionResponse`.
    ///
    /// Text comes from the first candidate only. A blocked prompt or a
    /// missing candidate yields empty text with the reason attached.
    fn into_caption(self, fallback_model: &str, latency_ms: u64) -> CaptionResponse {
        let block_reason = self
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {r}"));

        let (text, finish_reason) = match self.candidates.into_iter().next() {
            Some(candidate) => {
                let text = candidate
                    .content
                    .map(|c| {
                        c.parts
                            .into_iter()
                            .filter_map(|p| p.text)
                            .collect::<Vec<_>>()
                            .join("")
                    })
                    .unwrap_or_default();
                (text, candidate.finish_reason)
            }
            None => (String::new(), Some("no candidates returned".to_string())),
        };

        CaptionResponse {
            text,
            model: self
                .model_version
                .unwrap_or_else(|| fallback_model.to_string()),
            finish_reason: block_reason.or(finish_reason),
            tokens_used: self.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms,
        }
    }
}

#[async_trait]
impl CaptionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn caption(&self, request: &CaptionRequest) -> Result<CaptionResponse, CaptionError> {
        let start = Instant::now();
        let body = GenerateContentRequest::from_request(request);

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| CaptionError::Request {
                message: format!("Gemini request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CaptionError::Request {
                message: format!("Gemini HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: GenerateContentResponse =
            resp.json().await.map_err(|e| CaptionError::Request {
                message: format!("Failed to parse Gemini response: {e}"),
                status_code: None,
            })?;

        Ok(parsed.into_caption(&self.model, start.elapsed().as_millis() as u64))
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;
    use std::path::{Path, PathBuf};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn sample_request() -> CaptionRequest {
        CaptionRequest {
            path: PathBuf::from("/photos/a.jpg"),
            image: ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], Path::new("a.jpg")),
            prompt: "Caption the image.".to_string(),
            system_instruction: "You caption images.".to_string(),
            safety: SafetySetting::block_none(),
            temperature: 0.7,
        }
    }

    /// Accept one HTTP request on a loopback port, answer with `status`/`body`,
    /// and hand back the raw request text.
    async fn serve_once(
        status: u16,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_request_body_shape() {
        let request = sample_request();
        let body = GenerateContentRequest::from_request(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You caption images."
        );
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Caption the image.");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "/9j/");
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(json["safetySettings"][3]["category"], "HARM_CATEGORY_DANGEROUS_CONTENT");
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_request_body_omits_unknown_mime_type() {
        let mut request = sample_request();
        request.image.media_type = None;
        let json = serde_json::to_value(GenerateContentRequest::from_request(&request)).unwrap();
        let inline = &json["contents"][0]["parts"][1]["inlineData"];
        assert!(inline.get("mimeType").is_none());
        assert_eq!(inline["data"], "/9j/");
    }

    #[test]
    fn test_response_joins_first_candidate_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "A cat "}, {"text": "on a mat."}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10, "totalTokenCount": 42},
            "modelVersion": "gemini-2.0-flash-exp"
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let resp = parsed.into_caption("fallback", 12);

        assert_eq!(resp.text, "A cat on a mat.");
        assert_eq!(resp.model, "gemini-2.0-flash-exp");
        assert_eq!(resp.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(resp.tokens_used, Some(42));
        assert_eq!(resp.latency_ms, 12);
    }

    #[test]
    fn test_blocked_prompt_yields_empty_text() {
        let json = r#"{"promptFeedback": {"blockReason": "OTHER"}}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let resp = parsed.into_caption("gemini-2.0-flash-exp", 0);

        assert!(resp.text.is_empty());
        assert_eq!(resp.model, "gemini-2.0-flash-exp");
        assert_eq!(resp.finish_reason.as_deref(), Some("prompt blocked: OTHER"));
    }

    #[test]
    fn test_candidate_without_content_yields_empty_text() {
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let resp = parsed.into_caption("m", 0);
        assert!(resp.text.is_empty());
        assert_eq!(resp.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[tokio::test]
    async fn test_caption_round_trip_over_http() {
        let (endpoint, server) = serve_once(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"  A cat.\n"}]},"finishReason":"STOP"}]}"#,
        )
        .await;
        let provider = GeminiProvider::with_endpoint(
            "test-key",
            "gemini-2.0-flash-exp",
            &format!("{endpoint}/"),
            Duration::from_secs(5),
        );

        let resp = provider.caption(&sample_request()).await.unwrap();
        assert_eq!(resp.text, "  A cat.\n");
        assert_eq!(resp.model, "gemini-2.0-flash-exp");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /models/gemini-2.0-flash-exp:generateContent "));
        assert!(raw.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(raw.contains("\"systemInstruction\""));
        assert!(raw.contains("BLOCK_NONE"));
    }

    #[tokio::test]
    async fn test_http_error_carries_status_code() {
        let (endpoint, server) = serve_once(429, r#"{"error":{"message":"quota"}}"#).await;
        let provider =
            GeminiProvider::with_endpoint("k", "m", &endpoint, Duration::from_secs(5));

        let err = provider.caption(&sample_request()).await.unwrap_err();
        match err {
            CaptionError::Request {
                status_code,
                message,
            } => {
                assert_eq!(status_code, Some(429));
                assert!(message.contains("quota"));
            }
            other => panic!("Expected Request error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_is_request_error() {
        let (endpoint, server) = serve_once(200, "not json").await;
        let provider =
            GeminiProvider::with_endpoint("k", "m", &endpoint, Duration::from_secs(5));

        let err = provider.caption(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse Gemini response"));
        server.await.unwrap();
    }
}
