//! Gemini Client
//!
//! Wraps a Gemini-compatible `generateContent` REST endpoint. Text
//! operations are schema-constrained JSON; image operations return inline
//! base64 payloads which are validated by decoding before being wrapped
//! as data URIs. A response that cannot be parsed into the expected shape
//! is a failure; partially parsed data never escapes this module.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::types::{AppConfig, ContentGenerator, GenerateFailure, GeneratedProject, StoreMetadata};

use super::prompts;

/// Default base URL of the generation API.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for the text operations.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";

/// Default model for the image operations.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// HTTP client for the generation API.
pub struct GeminiClient {
    api_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    http: Client,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// * `api_url` - Base URL for the generation API.
    /// * `api_key` - API key sent on every request.
    /// * `text_model` - Model identifier for text generation.
    /// * `image_model` - Model identifier for image generation.
    pub fn new(api_url: String, api_key: String, text_model: String, image_model: String) -> Self {
        Self {
            api_url,
            api_key,
            text_model,
            image_model,
            http: Client::new(),
        }
    }

    /// One `generateContent` round trip against the given model.
    async fn generate_content(&self, model: &str, body: Value) -> Result<Value, GenerateFailure> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_url, model);
        debug!("generateContent -> {}", model);

        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateFailure::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerateFailure::Request(format!(
                "{}: {}",
                status.as_u16(),
                text
            )));
        }

        resp.json()
            .await
            .map_err(|e| GenerateFailure::Malformed(e.to_string()))
    }

    async fn generate_json(&self, prompt: String, schema: Value) -> Result<Value, GenerateFailure> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });
        self.generate_content(&self.text_model, body).await
    }

    async fn generate_image(
        &self,
        prompt: String,
        aspect_ratio: &str,
    ) -> Result<String, GenerateFailure> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "imageConfig": { "aspectRatio": aspect_ratio },
            },
        });
        let data = self.generate_content(&self.image_model, body).await?;
        extract_image(&data)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_project(
        &self,
        config: &AppConfig,
    ) -> Result<GeneratedProject, GenerateFailure> {
        let data = self
            .generate_json(prompts::project_prompt(config), prompts::project_schema())
            .await?;
        parse_project(&data)
    }

    async fn generate_icon(&self, config: &AppConfig) -> Result<String, GenerateFailure> {
        self.generate_image(prompts::icon_prompt(config), "1:1").await
    }

    async fn generate_store_metadata(
        &self,
        config: &AppConfig,
    ) -> Result<StoreMetadata, GenerateFailure> {
        let data = self
            .generate_json(prompts::metadata_prompt(config), prompts::metadata_schema())
            .await?;
        parse_metadata(&data)
    }

    async fn generate_feature_graphic(
        &self,
        config: &AppConfig,
    ) -> Result<String, GenerateFailure> {
        // 16:9 is the closest supported ratio to the store's 1024x500.
        self.generate_image(prompts::feature_graphic_prompt(config), "16:9")
            .await
    }
}

// ---- Response parsing -------------------------------------------------------

/// Pull the first text part out of a `generateContent` response.
fn extract_text(data: &Value) -> Result<&str, GenerateFailure> {
    data["candidates"]
        .get(0)
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .and_then(|parts| parts.iter().find_map(|part| part["text"].as_str()))
        .ok_or_else(|| GenerateFailure::Malformed("no text part in response".to_string()))
}

/// Pull the first inline image out of a `generateContent` response and
/// wrap it as a data URI. The base64 payload is decoded to verify it is
/// well formed before anything is returned.
fn extract_image(data: &Value) -> Result<String, GenerateFailure> {
    let parts = data["candidates"]
        .get(0)
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .ok_or_else(|| GenerateFailure::Malformed("no content parts in response".to_string()))?;

    for part in parts {
        let inline = &part["inlineData"];
        if let Some(payload) = inline["data"].as_str() {
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| GenerateFailure::Malformed(format!("undecodable image data: {}", e)))?;
            let mime = inline["mimeType"].as_str().unwrap_or("image/png");
            return Ok(format!("data:{};base64,{}", mime, payload));
        }
    }

    Err(GenerateFailure::Malformed(
        "no image generated".to_string(),
    ))
}

fn parse_project(data: &Value) -> Result<GeneratedProject, GenerateFailure> {
    let text = extract_text(data)?;
    serde_json::from_str(text.trim())
        .map_err(|e| GenerateFailure::Malformed(format!("project payload: {}", e)))
}

fn parse_metadata(data: &Value) -> Result<StoreMetadata, GenerateFailure> {
    let text = extract_text(data)?;
    serde_json::from_str(text.trim())
        .map_err(|e| GenerateFailure::Malformed(format!("metadata payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    #[test]
    fn test_parse_project_round_trips_schema_fields() {
        let payload = json!({
            "mainActivity": "class MainActivity {}",
            "manifest": "<manifest/>",
            "buildGradle": "plugins {}",
            "stringsXml": "<resources/>",
            "stylesXml": "<resources/>",
        });
        let project = parse_project(&text_response(&payload.to_string())).unwrap();
        assert_eq!(project.main_activity, "class MainActivity {}");
        assert_eq!(project.manifest, "<manifest/>");
    }

    #[test]
    fn test_parse_project_rejects_missing_fields() {
        let payload = json!({ "mainActivity": "class MainActivity {}" });
        let err = parse_project(&text_response(&payload.to_string())).unwrap_err();
        assert!(matches!(err, GenerateFailure::Malformed(_)));
    }

    #[test]
    fn test_parse_metadata_rejects_non_json_text() {
        let err = parse_metadata(&text_response("sorry, I cannot do that")).unwrap_err();
        assert!(matches!(err, GenerateFailure::Malformed(_)));
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        let err = extract_text(&json!({ "candidates": [] })).unwrap_err();
        assert!(matches!(err, GenerateFailure::Malformed(_)));
    }

    #[test]
    fn test_extract_image_wraps_valid_payload() {
        let data = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "here is your icon" },
                    { "inlineData": { "mimeType": "image/png", "data": "AAAA" } }
                ] }
            }]
        });
        let uri = extract_image(&data).unwrap();
        assert_eq!(uri, "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_extract_image_rejects_undecodable_base64() {
        let data = json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "not base64!!" } }
                ] }
            }]
        });
        let err = extract_image(&data).unwrap_err();
        assert!(matches!(err, GenerateFailure::Malformed(_)));
    }

    #[test]
    fn test_extract_image_requires_an_image_part() {
        let data = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "no image here" }] }
            }]
        });
        let err = extract_image(&data).unwrap_err();
        assert!(matches!(err, GenerateFailure::Malformed(_)));
    }
}
