//! Inbound request types, validated generation parameters,
//! and the prompt templates for each request kind

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Characters of analysis input echoed back in `data_summary`
pub const DATA_SUMMARY_CHARS: usize = 200;

const ANALYSIS_SAMPLING: (u32, f32) = (800, 0.3);
const RECOMMENDATION_SAMPLING: (u32, f32) = (600, 0.4);

fn default_max_tokens() -> u32 { 1000 }
fn default_temperature() -> f32 { 0.7 }
fn default_analysis_type() -> String { "general".to_string() }

/// Free-form content generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRequest
{   pub prompt: String
  , #[serde(default = "default_max_tokens")]
    pub max_tokens: u32
  , #[serde(default = "default_temperature")]
    pub temperature: f32
}

impl ContentRequest
{   /// Request with default length and temperature
    pub fn new(prompt: impl Into<String>) -> Self
    {   ContentRequest
        {   prompt: prompt.into()
          , max_tokens: default_max_tokens()
          , temperature: default_temperature()
        }
    }
}

/// Data analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest
{   pub data: String
  , #[serde(default = "default_analysis_type")]
    pub analysis_type: String
}

impl AnalysisRequest
{   pub fn new(data: impl Into<String>) -> Self
    {   AnalysisRequest
        {   data: data.into()
          , analysis_type: default_analysis_type()
        }
    }

    pub fn with_type(mut self, analysis_type: impl Into<String>) -> Self
    {   self.analysis_type = analysis_type.into();
        self
    }

    /// Input echo: the first [`DATA_SUMMARY_CHARS`] characters,
    /// followed by `...` when anything was cut.
    pub fn data_summary(&self) -> String
    {   match self.data.char_indices().nth(DATA_SUMMARY_CHARS)
        {   Some((cut, _)) => format!("{}...", &self.data[..cut])
          , None => self.data.clone()
        }
    }
}

/// Personalised recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest
{   pub context: String
  , #[serde(default)]
    pub user_data: Map<String, Value>
}

impl RecommendationRequest
{   pub fn new(context: impl Into<String>) -> Self
    {   RecommendationRequest
        {   context: context.into()
          , user_data: Map::new()
        }
    }

    pub fn with_user_data(mut self, user_data: Map<String, Value>) -> Self
    {   self.user_data = user_data;
        self
    }
}

/// The three shapes of work the normalizer performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind
{   Content
  , Analysis
  , Recommendation
}

impl RequestKind
{   /// Sampling fixed by the kind, overriding anything the caller sent
    pub fn fixed_sampling(&self) -> Option<(u32, f32)>
    {   match self
        {   RequestKind::Content => None
          , RequestKind::Analysis => Some(ANALYSIS_SAMPLING)
          , RequestKind::Recommendation => Some(RECOMMENDATION_SAMPLING)
        }
    }

    pub fn as_str(&self) -> &'static str
    {   match self
        {   RequestKind::Content => "content"
          , RequestKind::Analysis => "analysis"
          , RequestKind::Recommendation => "recommendation"
        }
    }
}

impl std::fmt::Display for RequestKind
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}

/// Validated, immutable parameters for one provider call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParameters
{   prompt: String
  , max_tokens: u32
  , temperature: f32
}

impl GenerationParameters
{   /// Validate caller input against `limits`.
    /// `max_tokens` above the provider cap is clamped, not rejected.
    pub fn new(
      prompt: impl Into<String>
    , max_tokens: u32
    , temperature: f32
    , limits: &crate::config::GenerationLimits
    ) -> Result<Self, crate::error::Error>
    {   let prompt = prompt.into();
        if prompt.trim().is_empty()
        {   return Err(crate::error::Error::InvalidParameters(
              "prompt must not be empty".to_string()
            ));
        }
        if max_tokens == 0
        {   return Err(crate::error::Error::InvalidParameters(
              "max_tokens must be positive".to_string()
            ));
        }
        if !temperature.is_finite()
          || temperature < 0.0
          || temperature > limits.max_temperature
        {   return Err(crate::error::Error::InvalidParameters(
              format!(
                "temperature must be between 0 and {}, got {}",
                limits.max_temperature, temperature
              )
            ));
        }
        Ok(GenerationParameters
        {   prompt
          , max_tokens: max_tokens.min(limits.max_output_tokens)
          , temperature
        })
    }

    /// Parameters for a templated kind. Its fixed sampling is used as-is;
    /// caller limits do not apply.
    pub fn for_kind(
      kind: RequestKind
    , prompt: String
    ) -> Result<Self, crate::error::Error>
    {   if prompt.trim().is_empty()
        {   return Err(crate::error::Error::InvalidParameters(
              "prompt must not be empty".to_string()
            ));
        }
        let (max_tokens, temperature) = kind
          .fixed_sampling()
          .unwrap_or((default_max_tokens(), default_temperature()));
        Ok(GenerationParameters
        {   prompt
          , max_tokens
          , temperature
        })
    }

    pub fn prompt(&self) -> &str { &self.prompt }
    pub fn max_tokens(&self) -> u32 { self.max_tokens }
    pub fn temperature(&self) -> f32 { self.temperature }
}

/// Analysis instructions wrapped around the caller's data
pub fn analysis_prompt(request: &AnalysisRequest) -> String
{   format!(
"Analyze the following data and provide insights based on the analysis type: {analysis_type}

Data: {data}

Please provide:
1. Key insights
2. Trends or patterns
3. Recommendations
4. Summary
",
      analysis_type = request.analysis_type,
      data = request.data,
    )
}

/// Recommendation instructions wrapped around context and user data
pub fn recommendation_prompt(request: &RecommendationRequest) -> String
{   let user_data = Value::Object(request.user_data.clone());
    format!(
"Based on the following context and user data, provide personalized recommendations:

Context: {context}
User Data: {user_data}

Please provide:
1. Top 3 recommendations
2. Reasoning for each recommendation
3. Expected benefits
4. Implementation steps
",
      context = request.context,
      user_data = user_data,
    )
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::config::GenerationLimits;

    #[test]
    fn content_request_defaults_from_json()
    {   let req: ContentRequest
          = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(req.max_tokens, 1000);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn analysis_and_recommendation_defaults_from_json()
    {   let req: AnalysisRequest
          = serde_json::from_str(r#"{"data": "1,2,3"}"#).unwrap();
        assert_eq!(req.analysis_type, "general");

        let req: RecommendationRequest
          = serde_json::from_str(r#"{"context": "gardening"}"#).unwrap();
        assert!(req.user_data.is_empty());
    }

    #[test]
    fn data_summary_truncates_long_input()
    {   let req = AnalysisRequest::new("x".repeat(500))
          .with_type("financial");
        let summary = req.data_summary();
        assert_eq!(summary, format!("{}...", "x".repeat(200)));
    }

    #[test]
    fn data_summary_keeps_short_and_boundary_input()
    {   assert_eq!(AnalysisRequest::new("short").data_summary(), "short");
        let exact = "y".repeat(200);
        assert_eq!(AnalysisRequest::new(exact.clone()).data_summary(), exact);
    }

    #[test]
    fn data_summary_counts_characters_not_bytes()
    {   let req = AnalysisRequest::new("é".repeat(201));
        let summary = req.data_summary();
        assert_eq!(summary.chars().count(), 203);
        assert!(summary.starts_with(&"é".repeat(200)));
    }

    #[test]
    fn parameters_reject_bad_input()
    {   let limits = GenerationLimits::default();
        assert!(GenerationParameters::new("  ", 10, 0.5, &limits).is_err());
        assert!(GenerationParameters::new("hi", 0, 0.5, &limits).is_err());
        assert!(GenerationParameters::new("hi", 10, -0.1, &limits).is_err());
        assert!(GenerationParameters::new("hi", 10, 1.5, &limits).is_err());
        assert!(GenerationParameters::new("hi", 10, f32::NAN, &limits).is_err());
    }

    #[test]
    fn parameters_clamp_to_provider_cap()
    {   let limits = GenerationLimits
        {   max_output_tokens: 512
          , max_temperature: 1.0
        };
        let params = GenerationParameters::new("hi", 4000, 1.0, &limits)
          .unwrap();
        assert_eq!(params.max_tokens(), 512);
    }

    #[test]
    fn templated_kinds_use_fixed_sampling()
    {   let params = GenerationParameters::for_kind(
          RequestKind::Analysis, "p".to_string()
        ).unwrap();
        assert_eq!(params.max_tokens(), 800);
        assert!((params.temperature() - 0.3).abs() < f32::EPSILON);

        let params = GenerationParameters::for_kind(
          RequestKind::Recommendation, "p".to_string()
        ).unwrap();
        assert_eq!(params.max_tokens(), 600);
        assert!((params.temperature() - 0.4).abs() < f32::EPSILON);

        assert!(GenerationParameters::for_kind(
          RequestKind::Analysis, " ".to_string()
        ).is_err());
    }

    #[test]
    fn templates_embed_inputs()
    {   let prompt = analysis_prompt(
          &AnalysisRequest::new("Q1: 10, Q2: 14").with_type("sales")
        );
        assert!(prompt.contains("analysis type: sales"));
        assert!(prompt.contains("Data: Q1: 10, Q2: 14"));
        assert!(prompt.contains("4. Summary"));

        let mut user_data = Map::new();
        user_data.insert("level".to_string(), Value::from("beginner"));
        let prompt = recommendation_prompt(
          &RecommendationRequest::new("learning rust")
            .with_user_data(user_data)
        );
        assert!(prompt.contains("Context: learning rust"));
        assert!(prompt.contains(r#"User Data: {"level":"beginner"}"#));
        assert!(prompt.contains("1. Top 3 recommendations"));
    }
}
