//! The uniform result envelope returned by every normalizer operation

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::request::RequestKind;

/// Message returned in place of content when the provider
/// produced nothing (safety filter or empty candidate list)
pub const SAFETY_FILTER_MESSAGE: &str
  = "Content could not be generated due to safety filters. \
     Please try a different prompt.";

/// Prefix of the content text in a failed content envelope
pub const UNAVAILABLE_PREFIX: &str
  = "AI generation temporarily unavailable: ";

/// Token counters reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct TokenUsage
{   pub prompt_tokens: u32
  , pub completion_tokens: u32
  , pub total_tokens: u32
}

impl TokenUsage
{   pub fn is_zero(&self) -> bool
    {   *self == TokenUsage::default()
    }
}

/// Result of one normalizer call.
/// Success variants carry text, `Failed` carries an error; never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope
{   Content
    {   content: String
      , usage: TokenUsage
    }
  , Analysis
    {   analysis: String
      , analysis_type: String
      , data_summary: String
    }
  , Recommendations
    {   recommendations: String
      , context: String
      , personalization_data: Map<String, Value>
    }
  , Failed
    {   kind: RequestKind
      , error: String
    }
}

impl ResultEnvelope
{   /// Degraded success: provider returned nothing usable
    pub fn safety_filtered() -> Self
    {   ResultEnvelope::Content
        {   content: SAFETY_FILTER_MESSAGE.to_string()
          , usage: TokenUsage::default()
        }
    }

    pub fn failed(kind: RequestKind, error: impl Into<String>) -> Self
    {   ResultEnvelope::Failed
        {   kind
          , error: error.into()
        }
    }

    pub fn kind(&self) -> RequestKind
    {   match self
        {   ResultEnvelope::Content { .. } => RequestKind::Content
          , ResultEnvelope::Analysis { .. } => RequestKind::Analysis
          , ResultEnvelope::Recommendations { .. }
              => RequestKind::Recommendation
          , ResultEnvelope::Failed { kind, .. } => *kind
        }
    }

    pub fn is_error(&self) -> bool
    {   matches!(self, ResultEnvelope::Failed { .. })
    }

    pub fn error(&self) -> Option<&str>
    {   match self
        {   ResultEnvelope::Failed { error, .. } => Some(error)
          , _ => None
        }
    }

    /// Primary text of the envelope. A failed content envelope
    /// still answers with its "temporarily unavailable" message.
    pub fn text(&self) -> Option<String>
    {   match self
        {   ResultEnvelope::Content { content, .. } => Some(content.clone())
          , ResultEnvelope::Analysis { analysis, .. } => Some(analysis.clone())
          , ResultEnvelope::Recommendations { recommendations, .. }
              => Some(recommendations.clone())
          , ResultEnvelope::Failed { kind: RequestKind::Content, error }
              => Some(format!("{}{}", UNAVAILABLE_PREFIX, error))
          , ResultEnvelope::Failed { .. } => None
        }
    }

    pub fn usage(&self) -> Option<TokenUsage>
    {   match self
        {   ResultEnvelope::Content { usage, .. } => Some(*usage)
          , _ => None
        }
    }

    /// JSON form handed to the HTTP layer
    pub fn to_json(&self) -> Value
    {   serde_json::to_value(self).unwrap_or_else(|e| {
          log::error!("Envelope serialization failed: {}", e);
          serde_json::json!({ "error": e.to_string() })
        })
    }
}

impl Serialize for ResultEnvelope
{   fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
      S: Serializer
    {   match self
        {   ResultEnvelope::Content { content, usage } => {
              let mut map = serializer.serialize_map(Some(2))?;
              map.serialize_entry("content", content)?;
              map.serialize_entry("usage", usage)?;
              map.end()
            }
          , ResultEnvelope::Analysis
            {   analysis, analysis_type, data_summary
            } => {
              let mut map = serializer.serialize_map(Some(3))?;
              map.serialize_entry("analysis", analysis)?;
              map.serialize_entry("analysis_type", analysis_type)?;
              map.serialize_entry("data_summary", data_summary)?;
              map.end()
            }
          , ResultEnvelope::Recommendations
            {   recommendations, context, personalization_data
            } => {
              let mut map = serializer.serialize_map(Some(3))?;
              map.serialize_entry("recommendations", recommendations)?;
              map.serialize_entry("context", context)?;
              map.serialize_entry(
                "personalization_data", personalization_data
              )?;
              map.end()
            }
          , ResultEnvelope::Failed { kind, error } => {
              let mut map = serializer.serialize_map(Some(2))?;
              match kind
              {   RequestKind::Content => {
                    map.serialize_entry(
                      "content",
                      &format!("{}{}", UNAVAILABLE_PREFIX, error)
                    )?;
                    map.serialize_entry("error", error)?;
                  }
                , RequestKind::Analysis => {
                    map.serialize_entry("error", error)?;
                    map.serialize_entry("analysis", &Value::Null)?;
                  }
                , RequestKind::Recommendation => {
                    map.serialize_entry("error", error)?;
                    map.serialize_entry("recommendations", &Value::Null)?;
                  }
              }
              map.end()
            }
        }
    }
}
