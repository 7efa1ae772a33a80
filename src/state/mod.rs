use std::sync::Arc;

use crate::core::config::Settings;
use crate::llm::{ChatProvider, EmbeddingProvider, OpenAiProvider};
use crate::rag::{CorpusIndex, IndexParams};
use crate::survey::{GenerationOptions, SurveyService};

pub mod error;

use error::InitializationError;

/// Whether the generation pipeline came up at startup.
enum Pipeline {
    Ready(Arc<SurveyService>),
    Unavailable(String),
}

/// Application state shared across all routes.
///
/// Built once before the listener accepts traffic. A pipeline that failed to
/// initialise is recorded rather than aborting startup, so liveness endpoints
/// keep answering.
pub struct AppState {
    pub settings: Arc<Settings>,
    pipeline: Pipeline,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// 1. Creates the OpenAI-compatible provider (chat and embeddings)
    /// 2. Loads the corpus index, rebuilding it once if absent or unreadable
    /// 3. Wires both into the survey service
    pub async fn initialize(settings: Arc<Settings>) -> Arc<Self> {
        let pipeline = match build_service(&settings).await {
            Ok(service) => {
                tracing::info!(
                    "Survey pipeline ready ({} chunks indexed)",
                    service.index().len()
                );
                Pipeline::Ready(Arc::new(service))
            }
            Err(err) => {
                tracing::error!("{}; /api/generate will be unavailable", err);
                Pipeline::Unavailable(err.to_string())
            }
        };

        Arc::new(AppState { settings, pipeline })
    }

    pub fn with_service(settings: Arc<Settings>, service: Arc<SurveyService>) -> Arc<Self> {
        Arc::new(AppState {
            settings,
            pipeline: Pipeline::Ready(service),
        })
    }

    pub fn unavailable(settings: Arc<Settings>, reason: impl Into<String>) -> Arc<Self> {
        Arc::new(AppState {
            settings,
            pipeline: Pipeline::Unavailable(reason.into()),
        })
    }

    /// The survey service, or the reason it failed to start.
    pub fn survey(&self) -> Result<&Arc<SurveyService>, &str> {
        match &self.pipeline {
            Pipeline::Ready(service) => Ok(service),
            Pipeline::Unavailable(reason) => Err(reason.as_str()),
        }
    }
}

async fn build_service(settings: &Settings) -> Result<SurveyService, InitializationError> {
    let provider = Arc::new(
        OpenAiProvider::new(&settings.llm, &settings.embedding)
            .map_err(InitializationError::Provider)?,
    );
    let embedder: Arc<dyn EmbeddingProvider> = provider.clone();
    let chat: Arc<dyn ChatProvider> = provider;

    let params = IndexParams::from_settings(&settings.corpus, settings.embedding.batch_size);
    let index = CorpusIndex::open_or_build(&params, embedder.as_ref())
        .await
        .map_err(InitializationError::Index)?;

    Ok(SurveyService::new(
        embedder,
        Arc::new(index),
        chat,
        GenerationOptions::from_settings(settings),
    ))
}
