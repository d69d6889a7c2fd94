use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serde_json::{Map, Value};

use studio_ai::{
  AnalysisRequest, ContentRequest, RecommendationRequest, RequestNormalizer,
  StudioConfig,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind
{   Content
  , Analysis
  , Recommendation
}

/// Send one request through the normalizer and print the envelope
#[derive(Parser, Debug)]
#[command(
  name = "ai_probe",
  about = "Smoke-test the configured text-generation provider"
)]
struct ProbeCli
{   /// Request kind
    #[arg(long, value_enum, default_value = "content")]
    kind: Kind

  , /// Prompt (content), data (analysis) or context (recommendation)
    #[arg(
      long,
      default_value = "Generate a short welcome message for an AI studio application"
    )]
    prompt: String

  , /// Max output tokens for content requests
    #[arg(long, default_value_t = 100)]
    max_tokens: u32

  , /// Sampling temperature for content requests
    #[arg(long, default_value_t = 0.7)]
    temperature: f32

  , /// Analysis type for analysis requests
    #[arg(long, default_value = "general")]
    analysis_type: String

  , /// JSON object of user data for recommendation requests
    #[arg(long, default_value = "{}")]
    user_data: String

  , /// Overrides GEMINI_MODEL
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>
}

#[tokio::main]
async fn main() -> Result<()>
{   env_logger::init();
    let cli = ProbeCli::parse();

    let mut config = StudioConfig::from_env()
      .context("loading configuration")?;
    if let Some(model) = cli.model
    {   config.provider.model = model;
    }
    let normalizer = RequestNormalizer::from_config(&config)
      .context("building provider client")?;

    info!(
      "Probing {} ({}) with a {:?} request",
      normalizer.provider().name(), config.provider.model, cli.kind
    );

    let envelope = match cli.kind
    {   Kind::Content => {
          normalizer.generate(&ContentRequest
          {   prompt: cli.prompt
            , max_tokens: cli.max_tokens
            , temperature: cli.temperature
          }).await
        }
      , Kind::Analysis => {
          normalizer.analyze(
            &AnalysisRequest::new(cli.prompt)
              .with_type(cli.analysis_type)
          ).await
        }
      , Kind::Recommendation => {
          let user_data: Map<String, Value>
            = serde_json::from_str(&cli.user_data)
              .context("--user-data must be a JSON object")?;
          normalizer.recommend(
            &RecommendationRequest::new(cli.prompt)
              .with_user_data(user_data)
          ).await
        }
    };

    println!("{}", serde_json::to_string_pretty(&envelope.to_json())?);

    if let Some(e) = envelope.error()
    {   bail!("provider call failed: {}", e);
    }
    if let Some(usage) = envelope.usage()
    {   info!("Tokens used: {}", usage.total_tokens);
    }
    Ok(())
}
