//! AI fallback extraction of video servers from arbitrary HTML
//!
//! Sends a truncated HTML fragment to a Gemini model with an instruction to
//! answer with a JSON array of `{server, url}` objects. Best effort: every
//! failure is logged and turned into an empty result, and nothing is retried.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::constants::endpoints;
use crate::models::VideoServer;

/// Failures of a single model call; never surfaced past [`AiExtractor::extract_from_fragment`]
#[derive(Error, Debug)]
pub enum AiError {
    #[error("No API key configured for AI extraction")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    ClientError(String),

    #[error("Failed to reach model API: {0}")]
    NetworkError(String),

    #[error("Model API returned status {0}")]
    HttpError(u16),

    #[error("Failed to read model response: {0}")]
    ResponseError(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Model output is not a JSON array: {0}")]
    InvalidOutput(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Server entry as described in the prompt
#[derive(Debug, Deserialize)]
struct ModelServer {
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Keep at most `limit` characters of `html`
pub fn truncate_fragment(html: &str, limit: usize) -> &str {
    match html.char_indices().nth(limit) {
        Some((idx, _)) => &html[..idx],
        None => html,
    }
}

/// Instruction sent to the model, with the fragment appended
pub fn build_prompt(fragment: &str) -> String {
    format!(
        "Analyze this HTML fragment and extract only the URLs of video iframes or \
         streaming servers (such as ok.ru, mega, vidoza, streamtape). Respond with \
         JSON only, in this exact format: [{{\"server\": \"Name\", \"url\": \"URL\"}}]. \
         HTML: {}",
        fragment
    )
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string (e.g. "json") on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse the model's text output into video servers
///
/// Entries without a URL are dropped; a missing server name falls back to the
/// URL host.
pub fn parse_model_output(text: &str) -> Result<Vec<VideoServer>, AiError> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    let entries: Vec<Value> =
        serde_json::from_str(json).map_err(|e| AiError::InvalidOutput(e.to_string()))?;

    Ok(entries
        .iter()
        .filter_map(|entry| ModelServer::deserialize(entry).ok())
        .filter_map(|raw| {
            let url = raw.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
            let server = raw
                .server
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .or_else(|| Url::parse(&url).ok().and_then(|u| u.host_str().map(str::to_string)))
                .unwrap_or_else(|| "unknown".to_string());
            Some(VideoServer::new(server, raw.title, url))
        })
        .collect())
}

/// Client for the generative model used as extraction fallback
#[derive(Clone)]
pub struct AiExtractor {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    fragment_limit: usize,
}

impl AiExtractor {
    /// Create an extractor from the application configuration
    pub fn new(config: &Config) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AiError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            api_base: config.gemini_api_base.clone(),
            fragment_limit: config.ai_fragment_limit,
        })
    }

    /// Whether an API key is configured
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Extract video servers from an HTML fragment, empty on any failure
    pub async fn extract_from_fragment(&self, html: &str) -> Vec<VideoServer> {
        match self.try_extract(html).await {
            Ok(servers) => {
                info!("AI extraction found {} servers", servers.len());
                servers
            }
            Err(e) => {
                warn!("AI extraction failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_extract(&self, html: &str) -> Result<Vec<VideoServer>, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let fragment = truncate_fragment(html, self.fragment_limit);
        if fragment.len() < html.len() {
            debug!("Truncated HTML fragment from {} to {} bytes", html.len(), fragment.len());
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(fragment),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(endpoints::generate_content(&self.api_base, &self.model))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::HttpError(status.as_u16()));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::ResponseError(e.to_string()))?;

        parse_model_output(&body.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extractor_for(server: &MockServer, api_key: Option<&str>) -> AiExtractor {
        let config = Config {
            gemini_api_key: api_key.map(str::to_string),
            gemini_api_base: server.uri(),
            gemini_model: "test-model".to_string(),
            ..Config::default()
        };
        AiExtractor::new(&config).unwrap()
    }

    fn model_reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
    }

    #[test]
    fn test_truncate_fragment() {
        assert_eq!(truncate_fragment("abcdef", 3), "abc");
        assert_eq!(truncate_fragment("abc", 5000), "abc");
        // multi-byte characters are counted, not bytes
        assert_eq!(truncate_fragment("ñañaña", 2), "ña");
    }

    #[test]
    fn test_prompt_embeds_fragment_and_format() {
        let prompt = build_prompt("<iframe src=\"x\"></iframe>");
        assert!(prompt.contains(r#"[{"server": "Name", "url": "URL"}]"#));
        assert!(prompt.ends_with("HTML: <iframe src=\"x\"></iframe>"));
    }

    #[test]
    fn test_parse_model_output() {
        let servers = parse_model_output(
            r#"[{"server":"Okru","url":"https://ok.ru/videoembed/1"},{"server":"x"}]"#,
        )
        .unwrap();
        assert_eq!(
            servers,
            vec![VideoServer::new("Okru", None, "https://ok.ru/videoembed/1")]
        );
    }

    #[test]
    fn test_parse_model_output_fenced() {
        let text = "```json\n[{\"url\":\"https://streamtape.com/e/1\"}]\n```";
        let servers = parse_model_output(text).unwrap();
        assert_eq!(servers[0].server, "streamtape.com");
        assert_eq!(servers[0].title, "streamtape.com");
    }

    #[test]
    fn test_parse_model_output_malformed() {
        assert!(matches!(
            parse_model_output("[{\"server\": \"a\", "),
            Err(AiError::InvalidOutput(_))
        ));
        assert!(matches!(parse_model_output("  "), Err(AiError::EmptyResponse)));
        assert!(matches!(
            parse_model_output(r#"{"server":"a","url":"b"}"#),
            Err(AiError::InvalidOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_without_api_key_is_empty() {
        let server = MockServer::start().await;
        let extractor = extractor_for(&server, None);
        assert!(!extractor.is_enabled());
        assert!(extractor.extract_from_fragment("<iframe>").await.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extract_from_fragment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"/models/test-model:generateContent$"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(model_reply(
                r#"[{"server":"Mega","url":"https://mega.nz/embed/a"}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let servers = extractor_for(&server, Some("secret"))
            .extract_from_fragment("<iframe src=\"https://mega.nz/embed/a\"></iframe>")
            .await;
        assert_eq!(servers, vec![VideoServer::new("Mega", None, "https://mega.nz/embed/a")]);
    }

    #[tokio::test]
    async fn test_request_asks_for_json_and_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(model_reply("[]"))
            .mount(&server)
            .await;

        let html = format!("{}TAIL", "Z".repeat(6000));
        let servers = extractor_for(&server, Some("k"))
            .extract_from_fragment(&html)
            .await;
        assert!(servers.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.ends_with(&format!("HTML: {}", "Z".repeat(5000))));
        assert!(!text.contains("TAIL"));
    }

    #[tokio::test]
    async fn test_malformed_model_output_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(model_reply("Sorry, I found [these servers"))
            .mount(&server)
            .await;

        let servers = extractor_for(&server, Some("k"))
            .extract_from_fragment("<div></div>")
            .await;
        assert!(servers.is_empty());
    }

    #[tokio::test]
    async fn test_model_api_error_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let servers = extractor_for(&server, Some("k"))
            .extract_from_fragment("<div></div>")
            .await;
        assert!(servers.is_empty());
    }
}
