use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};
use std::time::Duration;

use crate::envelope::TokenUsage;
use crate::providers::{Generation, GenerationConfig, TextProvider};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content
{   #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig
{   pub max_output_tokens: u32
  , pub temperature: f32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
  , pub generation_config: GeminiGenerationConfig
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
  , pub prompt_feedback: Option<PromptFeedback>
  , pub usage_metadata: Option<UsageMetadata>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   pub content: Option<Content>
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback
{   pub block_reason: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata
{   #[serde(default)]
    pub prompt_token_count: u32
  , #[serde(default)]
    pub candidates_token_count: u32
  , #[serde(default)]
    pub total_token_count: u32
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleErrorBody
{   error: GoogleError
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleError
{   message: String
}

// ===== Request / Response shaping =====

/// Wire request for a single user prompt
pub fn build_request(
  prompt: &str
, config: &GenerationConfig
) -> GenerateContentRequest
{   GenerateContentRequest
    {   contents: vec![
          Content
          {   role: Some("user".to_string())
            , parts: vec![
                Part
                {   text: Some(prompt.to_string())
                }
              ]
          }
        ]
      , generation_config: GeminiGenerationConfig
        {   max_output_tokens: config.max_output_tokens
          , temperature: config.temperature
        }
    }
}

/// Collapse a wire response into a [`Generation`].
/// No candidates or no text parts yields `text: None`.
pub fn into_generation(response: GenerateContentResponse) -> Generation
{   let first = response.candidates.into_iter().next();
    let finish_reason = first
      .as_ref()
      .and_then(|c| c.finish_reason.clone());

    let text = first
      .and_then(|c| c.content)
      .map(|content| {
        content.parts
          .into_iter()
          .filter_map(|p| p.text)
          .collect::<String>()
      })
      .filter(|t| !t.is_empty());

    let usage = response.usage_metadata.map(|u| TokenUsage
    {   prompt_tokens: u.prompt_token_count
      , completion_tokens: u.candidates_token_count
      , total_tokens: u.total_token_count
    });

    Generation
    {   text
      , usage
      , finish_reason
      , block_reason: response.prompt_feedback
          .and_then(|f| f.block_reason)
    }
}

/// Pull the human-readable message out of a Google error body,
/// falling back to the raw text
fn error_message(body: &str) -> String
{   serde_json::from_str::<GoogleErrorBody>(body)
      .map(|b| b.error.message)
      .unwrap_or_else(|_| body.to_string())
}

// ===== Gemini Client =====

/// Gemini `generateContent` client.
/// Built once at startup and shared; holds no per-request state.
pub struct GeminiClient
{   api_key: Option<String>
  , model: String
  , api_base: String
  , http_client: reqwest::Client
}

impl GeminiClient
{   /// Create a client from provider configuration
    pub fn new(
      config: &crate::config::ProviderConfig
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating GeminiClient for model: {}", config.model);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Failed to build HTTP client: {}", e);
          crate::error::Error::InvalidConfiguration(e.to_string())
        })?;

        Ok(GeminiClient
        {   api_key: config.api_key
              .clone()
              .filter(|k| !k.trim().is_empty())
          , model: config.model.clone()
          , api_base: config.api_base
              .trim_end_matches('/')
              .to_string()
          , http_client
        })
    }

    pub fn model(&self) -> &str
    {   &self.model
    }

    fn endpoint(&self) -> String
    {   format!(
          "{}/models/{}:generateContent",
          self.api_base, self.model
        )
    }

    fn get_api_key(&self) -> Result<&str, crate::error::Error>
    {   self.api_key.as_deref().ok_or_else(|| {
          error!("No API key for model: {}", self.model);
          crate::error::Error::MissingApiKey(
            format!("Gemini:{}", self.model)
          )
        })
    }
}

#[async_trait]
impl TextProvider for GeminiClient
{   async fn generate(
      &self
    , prompt: &str
    , config: &GenerationConfig
    ) -> Result<Generation, crate::error::Error>
    {   debug!(
          "Gemini generate: model={}, max_tokens={}, temperature={}",
          self.model, config.max_output_tokens, config.temperature
        );
        let api_key = self.get_api_key()?;
        let request = build_request(prompt, config);

        trace!("Gemini request: {:?}", request);

        let response = self.http_client
          .post(self.endpoint())
          .header("x-goog-api-key", api_key)
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(crate::error::Error::ApiError
            {   status: status.as_u16()
              , message: error_message(&error_text)
            });
        }

        let body = response.text().await.map_err(|e| {
          error!("Failed to read Gemini body: {}", e);
          crate::error::Error::from(e)
        })?;
        let parsed: GenerateContentResponse
          = serde_json::from_str(&body).map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::from(e)
          })?;

        let generation = into_generation(parsed);
        if generation.is_empty()
        {   debug!(
              "Gemini returned no text (finish={:?}, block={:?})",
              generation.finish_reason, generation.block_reason
            );
        }
        Ok(generation)
    }

    fn name(&self) -> &str
    {   "Gemini"
    }

    fn is_configured(&self) -> bool
    {   self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::config::ProviderConfig;
    use serde_json::json;

    #[test]
    fn request_wire_shape()
    {   let request = build_request(
          "Say hello",
          &GenerationConfig
          {   max_output_tokens: 100
            , temperature: 0.5
          }
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({
          "contents": [
            { "role": "user", "parts": [ { "text": "Say hello" } ] }
          ],
          "generationConfig": {
            "maxOutputTokens": 100,
            "temperature": 0.5
          }
        }));
    }

    #[test]
    fn parses_text_and_usage()
    {   let response: GenerateContentResponse = serde_json::from_value(json!({
          "candidates": [{
            "content": {
              "role": "model",
              "parts": [ { "text": "Hello, " }, { "text": "world" } ]
            },
            "finishReason": "STOP"
          }],
          "usageMetadata": {
            "promptTokenCount": 4,
            "candidatesTokenCount": 3,
            "totalTokenCount": 7
          }
        })).unwrap();
        let generation = into_generation(response);
        assert_eq!(generation.text.as_deref(), Some("Hello, world"));
        assert_eq!(generation.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(generation.usage, Some(TokenUsage
        {   prompt_tokens: 4
          , completion_tokens: 3
          , total_tokens: 7
        }));
    }

    #[test]
    fn blocked_prompt_has_no_text()
    {   let response: GenerateContentResponse = serde_json::from_value(json!({
          "promptFeedback": { "blockReason": "SAFETY" },
          "usageMetadata": { "promptTokenCount": 9, "totalTokenCount": 9 }
        })).unwrap();
        let generation = into_generation(response);
        assert!(generation.is_empty());
        assert_eq!(generation.block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn candidate_without_parts_is_empty()
    {   let response: GenerateContentResponse = serde_json::from_value(json!({
          "candidates": [{ "content": { "role": "model" }, "finishReason": "SAFETY" }]
        })).unwrap();
        let generation = into_generation(response);
        assert!(generation.is_empty());
        assert!(generation.usage.is_none());
    }

    #[test]
    fn google_error_message_extraction()
    {   let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid");
        assert_eq!(error_message("gateway down"), "gateway down");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request()
    {   let client = GeminiClient::new(&ProviderConfig::default()).unwrap();
        assert!(!client.is_configured());
        let err = client
          .generate(
            "hi",
            &GenerationConfig
            {   max_output_tokens: 10
              , temperature: 0.1
            }
          )
          .await
          .unwrap_err();
        assert_eq!(
          err,
          crate::error::Error::MissingApiKey("Gemini:gemini-2.5-flash".to_string())
        );
    }

    #[test]
    fn endpoint_uses_model_and_trimmed_base()
    {   let config = ProviderConfig
        {   api_base: "http://localhost:8080/v1beta/".to_string()
          , ..ProviderConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
          client.endpoint(),
          "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
