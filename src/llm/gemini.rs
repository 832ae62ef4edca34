//! Google Gemini API 客户端
//!
//! 直接调用 generateContent 端点，每次请求携带图片 inlineData、
//! 任务提示和结构化输出 schema。不重试，超时之外无额外传输策略。
//!
//! https://ai.google.dev/api/generate-content

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::config::GeminiConfig;
use crate::error::{AppError, Result};
use crate::llm::prompt;
use crate::llm::{CalendarAnswer, CalendarModel};
use crate::models::session::CalendarImage;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API 客户端
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    /// 从配置创建客户端，配置的超时必须生效
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let base_url = if config.base_url.is_empty() {
            GEMINI_API_BASE.to_string()
        } else {
            config.base_url.clone()
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
            temperature: config.temperature,
        })
    }

    /// 创建指向自定义基地址的客户端（测试用）
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.to_string(),
            temperature: None,
        }
    }

    fn build_request(&self, image: &CalendarImage, context: &str, question: &str) -> GeminiRequest {
        let parts = vec![
            GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            },
            GeminiPart::Text {
                text: prompt::task_prompt(context, question),
            },
        ];

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    text: prompt::SYSTEM_INSTRUCTION.to_string(),
                }],
            }),
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: prompt::response_schema(),
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl CalendarModel for GeminiClient {
    async fn answer_about_image(
        &self,
        image: &CalendarImage,
        context: &str,
        question: &str,
    ) -> Result<CalendarAnswer> {
        if self.api_key.is_empty() {
            return Err(AppError::Config(
                "Gemini API key is not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let payload = self.build_request(image, context, question);

        debug!(model = %self.model, "Calling Gemini generateContent");

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("gemini request failed: {}", e)))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "gemini api error ({}): {}",
                status,
                truncate(&text, 512)
            )));
        }

        let body: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("gemini response body invalid: {}", e)))?;

        extract_answer(body)
    }
}

/// 从响应体取出候选文本并解析为结构化回答
fn extract_answer(body: GeminiResponse) -> Result<CalendarAnswer> {
    let text = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Upstream("empty response from model".to_string()))?;

    serde_json::from_str(&text)
        .map_err(|e| AppError::Upstream(format!("malformed structured payload: {}", e)))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ===== 请求报文 =====

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// ===== 响应报文 =====

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_image() -> CalendarImage {
        CalendarImage::new("aGVsbG8=", "image/png", 5)
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[test]
    fn test_build_request_contains_image_and_prompt() {
        let client = GeminiClient::with_base_url("k", "gemini-2.5-flash", "http://localhost");
        let request = client.build_request(&png_image(), "User: hi", "When is the exam?");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(
            value["contents"][0]["parts"][0]["inlineData"]["data"],
            "aGVsbG8="
        );
        let prompt_text = value["contents"][0]["parts"][1]["text"].as_str().unwrap();
        assert!(prompt_text.contains("User: hi"));
        assert!(prompt_text.contains(r#"User's New Question: "When is the exam?""#));
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseSchema"]["required"][0],
            "answer"
        );
        assert_eq!(
            value["systemInstruction"]["parts"][0]["text"],
            prompt::SYSTEM_INSTRUCTION
        );
    }

    #[tokio::test]
    async fn test_from_config_applies_timeout_to_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate_body(r#"{"answer":"late"}"#))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = GeminiConfig {
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: server.uri(),
            timeout: 1,
            temperature: None,
        };
        let client = GeminiClient::from_config(&config).unwrap();

        let result = client.answer_about_image(&png_image(), "", "q").await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast_with_config_error() {
        let client = GeminiClient::with_base_url("", "gemini-2.5-flash", "http://localhost:1");
        let result = client.answer_about_image(&png_image(), "", "q").await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_successful_call_parses_answer_and_entities() {
        let server = MockServer::start().await;
        let structured = json!({
            "answer": "May 10",
            "entities": {
                "dates": ["May 10"],
                "semesters": ["Sem 4"],
                "courses": [],
                "events": ["MSE"]
            }
        });
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(
                json!({"generationConfig": {"responseMimeType": "application/json"}}),
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body(&structured.to_string())),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", "gemini-2.5-flash", &server.uri());
        let answer = client
            .answer_about_image(&png_image(), "", "When is the Sem 4 MSE?")
            .await
            .unwrap();

        assert_eq!(answer.answer, "May 10");
        assert_eq!(answer.entities.dates, vec!["May 10"]);
        assert_eq!(answer.entities.semesters, vec!["Sem 4"]);
        assert!(answer.entities.courses.is_empty());
        assert_eq!(answer.entities.events, vec!["MSE"]);
    }

    #[tokio::test]
    async fn test_missing_entities_defaults_to_empty_sets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate_body(r#"{"answer":"Semester starts in July"}"#)),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", "gemini-2.5-flash", &server.uri());
        let answer = client
            .answer_about_image(&png_image(), "", "when?")
            .await
            .unwrap();

        assert_eq!(answer.answer, "Semester starts in July");
        assert!(answer.entities.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_candidate_text_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body("not json at all")),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", "gemini-2.5-flash", &server.uri());
        let result = client.answer_about_image(&png_image(), "", "q").await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", "gemini-2.5-flash", &server.uri());
        let result = client.answer_about_image(&png_image(), "", "q").await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_upstream_500_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url("test-key", "gemini-2.5-flash", &server.uri());
        let result = client.answer_about_image(&png_image(), "", "q").await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
