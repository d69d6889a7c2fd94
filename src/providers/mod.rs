//! Text-generation provider boundary and implementations

use async_trait::async_trait;

use crate::envelope::TokenUsage;

pub mod gemini;

// Re-export for convenience
pub use gemini::GeminiClient;

/// Sampling settings for one provider call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig
{   pub max_output_tokens: u32
  , pub temperature: f32
}

impl From<&crate::request::GenerationParameters> for GenerationConfig
{   fn from(params: &crate::request::GenerationParameters) -> Self
    {   GenerationConfig
        {   max_output_tokens: params.max_tokens()
          , temperature: params.temperature()
        }
    }
}

/// What a provider produced for one prompt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation
{   /// Generated text; `None` when the provider returned no parts
    pub text: Option<String>
  , /// Usage counters, when the provider reported them
    pub usage: Option<TokenUsage>
  , pub finish_reason: Option<String>
  , /// Set when the prompt itself was blocked
    pub block_reason: Option<String>
}

impl Generation
{   /// Plain text result with usage
    pub fn text(text: impl Into<String>, usage: TokenUsage) -> Self
    {   Generation
        {   text: Some(text.into())
          , usage: Some(usage)
          , ..Generation::default()
        }
    }

    /// No parts or empty text
    pub fn is_empty(&self) -> bool
    {   self.text.as_deref().map_or(true, str::is_empty)
    }

    pub fn usage_or_zero(&self) -> TokenUsage
    {   self.usage.unwrap_or_default()
    }
}

/// Contract the normalizer consumes:
/// `generate(prompt, max output length, temperature) -> text + usage | error`.
/// Implementations hold no per-request state and are shared across
/// concurrent calls.
#[async_trait]
pub trait TextProvider: Send + Sync
{   async fn generate(
      &self
    , prompt: &str
    , config: &GenerationConfig
    ) -> Result<Generation, crate::error::Error>;

    fn name(&self) -> &str;

    /// Whether credentials are present; used by health reporting
    fn is_configured(&self) -> bool
    {   true
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn empty_generation_detection()
    {   assert!(Generation::default().is_empty());
        assert!(Generation::text("", TokenUsage::default()).is_empty());
        assert!(!Generation::text("ok", TokenUsage::default()).is_empty());
    }

    #[test]
    fn missing_usage_reads_as_zero()
    {   let generation = Generation
        {   text: Some("ok".to_string())
          , ..Generation::default()
        };
        assert!(generation.usage_or_zero().is_zero());
    }
}
