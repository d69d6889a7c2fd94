pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod envelope;
pub mod normalizer;
pub mod client;
use serde::{Deserialize, Serialize};

/*

studio-ai: the AI layer behind the studio backend. One normalizer
sits between the HTTP routes and the text-generation provider and
turns every outcome (text, safety-filtered nothing, failure) into
a well-formed envelope.

studio-ai/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and backend channel types
│   ├── error.rs        # Error taxonomy
│   ├── config.rs       # Provider config, limits, env loading
│   ├── request.rs      # Inbound requests, parameters, templates
│   ├── envelope.rs     # ResultEnvelope and its JSON shape
│   ├── normalizer.rs   # RequestNormalizer
│   ├── client.rs       # StudioBackend task handle
│   ├── providers/
│   │   ├── mod.rs      # TextProvider trait
│   │   └── gemini.rs   # Gemini generateContent client
│   └── bin/ai_probe.rs # Smoke-test CLI
└── tests/

*/

pub use client::StudioBackend;
pub use config::{ErrorDetail, GenerationLimits, ProviderConfig, StudioConfig};
pub use envelope::{ResultEnvelope, TokenUsage};
pub use error::Error;
pub use normalizer::RequestNormalizer;
pub use providers::{Generation, GenerationConfig, GeminiClient, TextProvider};
pub use request::{
  AnalysisRequest, ContentRequest, GenerationParameters,
  RecommendationRequest, RequestKind,
};

/// STUDIO BACKEND INTERFACE:

// ===== Envelope replies (generate / analyze / recommend) =====

pub type EnvelopeReply = crate::envelope::ResultEnvelope;
pub type EnvelopeReplySender
  = tokio::sync::mpsc::UnboundedSender<EnvelopeReply>;

pub struct GenerateContentArgs
{   pub request: crate::request::ContentRequest
  , pub reply: EnvelopeReplySender
}

pub struct AnalyzeDataArgs
{   pub request: crate::request::AnalysisRequest
  , pub reply: EnvelopeReplySender
}

pub struct GetRecommendationsArgs
{   pub request: crate::request::RecommendationRequest
  , pub reply: EnvelopeReplySender
}

// ===== Health =====

pub type HealthReply = HealthReport;
pub type HealthReplySender
  = tokio::sync::mpsc::UnboundedSender<HealthReply>;

pub struct HealthArgs
{   pub reply: HealthReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== StudioHand (sender side) =====

pub struct StudioHand
{   pub generate_content_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateContentArgs>
  , pub analyze_data_tx
      : tokio::sync::mpsc::UnboundedSender<AnalyzeDataArgs>
  , pub get_recommendations_tx
      : tokio::sync::mpsc::UnboundedSender<GetRecommendationsArgs>
  , pub health_tx
      : tokio::sync::mpsc::UnboundedSender<HealthArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== StudioFoot (receiver side) =====

pub struct StudioFoot
{   pub generate_content_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateContentArgs>
  , pub analyze_data_rx
      : tokio::sync::mpsc::UnboundedReceiver<AnalyzeDataArgs>
  , pub get_recommendations_rx
      : tokio::sync::mpsc::UnboundedReceiver<GetRecommendationsArgs>
  , pub health_rx
      : tokio::sync::mpsc::UnboundedReceiver<HealthArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// STUDIO STRUCTURES:

/// Liveness report for the `/health` route
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthReport
{   /// Always "healthy" while the backend loop answers
    pub status: String
  , /// Provider name (e.g. "Gemini")
    pub provider: String
  , /// Whether the provider has credentials
    pub provider_configured: bool
}
