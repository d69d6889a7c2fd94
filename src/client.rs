use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::StudioFoot;

/// Public API for the studio backend - owns the task
pub struct StudioBackend
{   hand: crate::StudioHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl StudioBackend
{   /// Create and spawn a new backend around `normalizer`
    /// Returns immediately - spawns background task
    pub fn new(
      normalizer: crate::normalizer::RequestNormalizer
    ) -> Self
    {   debug!("Creating StudioBackend with task ownership");

        let (generate_content_tx, generate_content_rx)
          = mpsc::unbounded_channel();
        let (analyze_data_tx, analyze_data_rx)
          = mpsc::unbounded_channel();
        let (get_recommendations_tx, get_recommendations_rx)
          = mpsc::unbounded_channel();
        let (health_tx, health_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::StudioHand
        {   generate_content_tx
          , analyze_data_tx
          , get_recommendations_tx
          , health_tx
          , kill_process_tx
        };

        let foot = crate::StudioFoot
        {   generate_content_rx
          , analyze_data_rx
          , get_recommendations_rx
          , health_rx
          , kill_process_rx
        };

        let normalizer = Arc::new(normalizer);
        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, normalizer).await
        });

        StudioBackend
        {   hand
          , _task_handle
        }
    }

    /// Build the Gemini-backed backend from configuration
    pub fn from_config(
      config: &crate::config::StudioConfig
    ) -> Result<Self, crate::error::Error>
    {   let normalizer
          = crate::normalizer::RequestNormalizer::from_config(config)?;
        Ok(StudioBackend::new(normalizer))
    }

    /// Queue a content generation - returns almost immediately
    pub async fn generate_content(
      &self
    , request: crate::request::ContentRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::EnvelopeReply>,
        crate::error::Error
      >
    {   debug!("generate_content queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GenerateContentArgs
        {   request
          , reply: reply_tx
        };

        self.hand.generate_content_tx
          .send(cmd)
          .map_err(|_| disconnected())?;

        Ok(reply_rx)
    }

    /// Queue a data analysis - returns almost immediately
    pub async fn analyze_data(
      &self
    , request: crate::request::AnalysisRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::EnvelopeReply>,
        crate::error::Error
      >
    {   debug!(
          "analyze_data queuing command ({})",
          request.analysis_type
        );
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::AnalyzeDataArgs
        {   request
          , reply: reply_tx
        };

        self.hand.analyze_data_tx
          .send(cmd)
          .map_err(|_| disconnected())?;

        Ok(reply_rx)
    }

    /// Queue a recommendation request - returns almost immediately
    pub async fn get_recommendations(
      &self
    , request: crate::request::RecommendationRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::EnvelopeReply>,
        crate::error::Error
      >
    {   debug!("get_recommendations queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GetRecommendationsArgs
        {   request
          , reply: reply_tx
        };

        self.hand.get_recommendations_tx
          .send(cmd)
          .map_err(|_| disconnected())?;

        Ok(reply_rx)
    }

    /// Queue a health check - returns almost immediately
    pub async fn health(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::HealthReply>,
        crate::error::Error
      >
    {   debug!("health queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        self.hand.health_tx
          .send(crate::HealthArgs { reply: reply_tx })
          .map_err(|_| disconnected())?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down StudioBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Disconnected
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend dropped shutdown reply");
            Err(crate::error::Error::Disconnected)
        }
    }
}

fn disconnected() -> crate::error::Error
{   error!("Backend channel closed");
    crate::error::Error::Disconnected
}

/// Main backend event loop
///
/// tokio::select! only routes. Each work command is spawned onto
/// its own task so one slow provider call never holds up another.
async fn run_backend_loop(
  foot: crate::StudioFoot
, normalizer: Arc<crate::normalizer::RequestNormalizer>
)
{   debug!("Starting StudioBackend event loop");
    let StudioFoot
    {   mut generate_content_rx
      , mut analyze_data_rx
      , mut get_recommendations_rx
      , mut health_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = generate_content_rx.recv() => {
          debug!("Received GenerateContent");
          let normalizer = Arc::clone(&normalizer);
          tokio::spawn(async move {
            let envelope = normalizer.generate(&cmd.request).await;
            let _ = cmd.reply.send(envelope);
          });
        }
      , Some(cmd) = analyze_data_rx.recv() => {
          debug!("Received AnalyzeData");
          let normalizer = Arc::clone(&normalizer);
          tokio::spawn(async move {
            let envelope = normalizer.analyze(&cmd.request).await;
            let _ = cmd.reply.send(envelope);
          });
        }
      , Some(cmd) = get_recommendations_rx.recv() => {
          debug!("Received GetRecommendations");
          let normalizer = Arc::clone(&normalizer);
          tokio::spawn(async move {
            let envelope = normalizer.recommend(&cmd.request).await;
            let _ = cmd.reply.send(envelope);
          });
        }
      , Some(cmd) = health_rx.recv() => {
          debug!("Received Health");
          let provider = normalizer.provider();
          let _ = cmd.reply.send(crate::HealthReport
          {   status: "healthy".to_string()
            , provider: provider.name().to_string()
            , provider_configured: provider.is_configured()
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("StudioBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
