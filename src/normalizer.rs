//! Request normalization around the text-generation provider.
//!
//! Every operation validates or templates its input, makes exactly one
//! provider call through a single dispatch point, and folds the
//! outcome into a [`ResultEnvelope`]. Provider faults never escape.

use std::sync::Arc;
use log::{debug, trace, error, warn};

use crate::config::{ErrorDetail, GenerationLimits};
use crate::envelope::ResultEnvelope;
use crate::error::Error;
use crate::providers::{Generation, GenerationConfig, TextProvider};
use crate::request::{
  analysis_prompt, recommendation_prompt, AnalysisRequest, ContentRequest,
  GenerationParameters, RecommendationRequest, RequestKind,
};

/// Envelope text used for provider faults in redacted mode
pub const REDACTED_ERROR: &str = "provider request failed";

pub struct RequestNormalizer
{   provider: Arc<dyn TextProvider>
  , limits: GenerationLimits
  , error_detail: ErrorDetail
}

impl RequestNormalizer
{   pub fn new(
      provider: Arc<dyn TextProvider>
    , limits: GenerationLimits
    ) -> Self
    {   debug!("Creating RequestNormalizer over {}", provider.name());
        RequestNormalizer
        {   provider
          , limits
          , error_detail: ErrorDetail::default()
        }
    }

    /// Build the normalizer and its Gemini client from configuration
    pub fn from_config(
      config: &crate::config::StudioConfig
    ) -> Result<Self, Error>
    {   let client = crate::providers::GeminiClient::new(&config.provider)?;
        Ok(RequestNormalizer::new(Arc::new(client), config.limits)
          .with_error_detail(config.error_detail))
    }

    pub fn with_error_detail(mut self, error_detail: ErrorDetail) -> Self
    {   self.error_detail = error_detail;
        self
    }

    pub fn provider(&self) -> &dyn TextProvider
    {   self.provider.as_ref()
    }

    /// Free-form generation with the caller's length and temperature.
    /// Empty output becomes the safety-filter placeholder.
    pub async fn generate(&self, request: &ContentRequest) -> ResultEnvelope
    {   let params = match GenerationParameters::new(
          request.prompt.clone()
        , request.max_tokens
        , request.temperature
        , &self.limits
        )
        {   Ok(p) => p
          , Err(e) => return self.failure(RequestKind::Content, e)
        };

        match self.dispatch(RequestKind::Content, &params).await
        {   Ok(generation) if generation.is_empty() => {
              warn!(
                "Empty generation (block={:?}, finish={:?}); \
                 returning safety placeholder",
                generation.block_reason, generation.finish_reason
              );
              ResultEnvelope::safety_filtered()
            }
          , Ok(generation) => ResultEnvelope::Content
            {   usage: generation.usage_or_zero()
              , content: generation.text.unwrap_or_default()
            }
          , Err(e) => self.failure(RequestKind::Content, e)
        }
    }

    /// Four-part analysis of `data` at fixed sampling
    pub async fn analyze(&self, request: &AnalysisRequest) -> ResultEnvelope
    {   let outcome = self
          .templated(RequestKind::Analysis, analysis_prompt(request))
          .await;
        match outcome
        {   Ok(analysis) => ResultEnvelope::Analysis
            {   analysis
              , analysis_type: request.analysis_type.clone()
              , data_summary: request.data_summary()
            }
          , Err(e) => self.failure(RequestKind::Analysis, e)
        }
    }

    /// Top-3 recommendations for `context` at fixed sampling
    pub async fn recommend(
      &self
    , request: &RecommendationRequest
    ) -> ResultEnvelope
    {   let outcome = self
          .templated(
            RequestKind::Recommendation,
            recommendation_prompt(request)
          )
          .await;
        match outcome
        {   Ok(recommendations) => ResultEnvelope::Recommendations
            {   recommendations
              , context: request.context.clone()
              , personalization_data: request.user_data.clone()
            }
          , Err(e) => self.failure(RequestKind::Recommendation, e)
        }
    }

    async fn templated(
      &self
    , kind: RequestKind
    , prompt: String
    ) -> Result<String, Error>
    {   let params = GenerationParameters::for_kind(kind, prompt)?;
        let generation = self.dispatch(kind, &params).await?;
        match generation.text
        {   Some(text) if !text.is_empty() => Ok(text)
          , _ => Err(Error::EmptyGeneration(
              generation.block_reason
                .or(generation.finish_reason)
                .unwrap_or_else(|| "no parts".to_string())
            ))
        }
    }

    /// The single provider call site
    async fn dispatch(
      &self
    , kind: RequestKind
    , params: &GenerationParameters
    ) -> Result<Generation, Error>
    {   let config = GenerationConfig::from(params);
        debug!(
          "Dispatching {} request to {} (max_tokens={}, temperature={})",
          kind, self.provider.name(),
          config.max_output_tokens, config.temperature
        );
        trace!("Prompt: {}", params.prompt());

        let generation = self.provider
          .generate(params.prompt(), &config)
          .await?;

        if let Some(usage) = generation.usage
        {   debug!(
              "{} request used {} tokens",
              kind, usage.total_tokens
            );
        }
        Ok(generation)
    }

    fn failure(&self, kind: RequestKind, e: Error) -> ResultEnvelope
    {   if let Error::InvalidParameters(_) = e
        {   warn!("Rejected {} request: {}", kind, e);
            return ResultEnvelope::failed(kind, e.to_string());
        }

        error!("{} request failed at {}: {}", kind, self.provider.name(), e);
        match self.error_detail
        {   ErrorDetail::Verbatim => ResultEnvelope::failed(kind, e.to_string())
          , ErrorDetail::Redacted => ResultEnvelope::failed(kind, REDACTED_ERROR)
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl TextProvider for Echo
    {   async fn generate(
          &self
        , prompt: &str
        , _config: &GenerationConfig
        ) -> Result<Generation, Error>
        {   Ok(Generation::text(prompt, Default::default()))
        }

        fn name(&self) -> &str { "echo" }
    }

    #[test]
    fn generate_echoes_through_provider()
    {   let normalizer
          = RequestNormalizer::new(Arc::new(Echo), GenerationLimits::default());
        let envelope = tokio_test::block_on(
          normalizer.generate(&ContentRequest::new("ping"))
        );
        assert_eq!(envelope.text().as_deref(), Some("ping"));
        assert!(!envelope.is_error());
    }

    #[test]
    fn validation_errors_are_not_redacted()
    {   let normalizer
          = RequestNormalizer::new(Arc::new(Echo), GenerationLimits::default())
            .with_error_detail(ErrorDetail::Redacted);
        let envelope = tokio_test::block_on(
          normalizer.generate(&ContentRequest::new(""))
        );
        assert_eq!(
          envelope.error(),
          Some("Invalid parameters: prompt must not be empty")
        );
    }
}
