//! Configuration for the text-generation provider and request limits

use serde::{Deserialize, Serialize};
use log::{debug, warn};

pub const GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API key; `None` or blank means the provider is unconfigured
    pub api_key: Option<String>
  , /// Model name
    pub model: String
  , /// API base URL
    pub api_base: String
  , /// Request timeout in seconds, applied to the HTTP client
    pub timeout_secs: Option<u64>
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_key: None
          , model: GEMINI_DEFAULT_MODEL.to_string()
          , api_base: GEMINI_API_BASE.to_string()
          , timeout_secs: Some(60)
        }
    }
}

/// Bounds applied to caller-supplied generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationLimits
{   /// Provider cap on output tokens; larger requests are clamped
    pub max_output_tokens: u32
  , /// Inclusive upper bound on sampling temperature
    pub max_temperature: f32
}

impl Default for GenerationLimits
{   fn default() -> Self
    {   GenerationLimits
        {   max_output_tokens: 8192
          , max_temperature: 1.0
        }
    }
}

/// How much provider failure detail reaches the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDetail
{   /// Envelope carries the provider failure description as-is
    #[default]
    Verbatim
  , /// Envelope carries a generic message; detail goes to the log only
    Redacted
}

impl std::str::FromStr for ErrorDetail
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "verbatim" => Ok(ErrorDetail::Verbatim)
          , "redacted" => Ok(ErrorDetail::Redacted)
          , other => Err(crate::error::Error::InvalidConfiguration(
              format!("unknown error detail mode: {}", other)
            ))
        }
    }
}

/// Studio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfig
{   pub provider: ProviderConfig
  , pub limits: GenerationLimits
  , pub error_detail: ErrorDetail
}

impl StudioConfig
{   /// Load configuration from the process environment,
    /// reading a `.env` file first when one exists.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   if dotenv::dotenv().is_err()
        {   debug!("No .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let mut config = StudioConfig::default();

        config.provider.api_key = lookup("GEMINI_API_KEY")
          .filter(|k| !k.trim().is_empty());
        if config.provider.api_key.is_none()
        {   warn!("GEMINI_API_KEY not set; generation will fail");
        }
        if let Some(model) = lookup("GEMINI_MODEL")
        {   config.provider.model = model;
        }
        if let Some(base) = lookup("GEMINI_API_BASE")
        {   config.provider.api_base
              = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("GEMINI_TIMEOUT_SECS")
        {   config.provider.timeout_secs
              = Some(parse_number("GEMINI_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("AI_MAX_OUTPUT_TOKENS")
        {   let cap: u32 = parse_number("AI_MAX_OUTPUT_TOKENS", &raw)?;
            if cap == 0
            {   return Err(crate::error::Error::InvalidConfiguration(
                  "AI_MAX_OUTPUT_TOKENS must be positive".to_string()
                ));
            }
            config.limits.max_output_tokens = cap;
        }
        if let Some(raw) = lookup("AI_MAX_TEMPERATURE")
        {   let max: f32 = parse_number("AI_MAX_TEMPERATURE", &raw)?;
            if !max.is_finite() || max <= 0.0
            {   return Err(crate::error::Error::InvalidConfiguration(
                  "AI_MAX_TEMPERATURE must be a positive number".to_string()
                ));
            }
            config.limits.max_temperature = max;
        }
        if let Some(raw) = lookup("AI_ERROR_DETAIL")
        {   config.error_detail = raw.parse()?;
        }

        debug!(
          "Loaded config: model={}, base={}, timeout={:?}",
          config.provider.model,
          config.provider.api_base,
          config.provider.timeout_secs
        );
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str)
  -> Result<T, crate::error::Error>
{   raw.trim().parse().map_err(|_| {
      crate::error::Error::InvalidConfiguration(
        format!("{} is not a valid number: {}", key, raw)
      )
    })
}
