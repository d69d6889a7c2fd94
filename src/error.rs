use thiserror::Error as ThisError;

/// Custom error type for studio AI operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error
{   /// API key is missing or blank for a provider
    #[error("API key not configured for: {0}")]
    MissingApiKey(String)
  , /// Transport-level failure talking to the provider
    #[error("HTTP error: {0}")]
    HttpError(String)
  , /// Provider answered with a non-success status
    #[error("API error ({status}): {message}")]
    ApiError
    {   status: u16
      , message: String
    }
  , /// Failed to decode the provider response
    #[error("Parse error: {0}")]
    ParseError(String)
  , /// Caller supplied unusable generation parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String)
  , /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String)
  , /// Provider did not answer within the client timeout
    #[error("Request timed out")]
    Timeout
  , /// Backend task is gone
    #[error("Backend disconnected")]
    Disconnected
  , /// Provider answered but produced no text
    #[error("Provider returned no content ({0})")]
    EmptyGeneration(String)
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ParseError(e.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn api_error_display_carries_status()
    {   let e = Error::ApiError
        {   status: 429
          , message: "quota exhausted".to_string()
        };
        assert_eq!(e.to_string(), "API error (429): quota exhausted");
    }

    #[test]
    fn empty_generation_display_carries_reason()
    {   let e = Error::EmptyGeneration("SAFETY".to_string());
        assert_eq!(e.to_string(), "Provider returned no content (SAFETY)");
    }
}
