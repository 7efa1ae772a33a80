//! Deterministic in-process providers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::config::defaults::default_config;
use crate::core::config::Settings;
use crate::llm::{ChatProvider, ChatRequest, EmbeddingProvider, ProviderError};

const DIMS: usize = 256;

/// Built-in defaults with no file or environment applied.
pub fn default_settings() -> Settings {
    serde_json::from_value(default_config()).unwrap()
}

/// Bag-of-characters embedder: texts sharing characters land close together.
pub struct HashEmbedder {
    model: String,
    dims: usize,
    calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::with_model("hash-embedder")
    }

    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            dims: DIMS,
            calls: AtomicUsize::new(0),
        }
    }

    /// Same hashing into a different vector width.
    pub fn with_dims(dims: usize) -> Self {
        Self {
            dims,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            let slot = (ch as u64).wrapping_mul(2_654_435_761) % self.dims as u64;
            vector[slot as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Embedder that always fails, for error-path tests.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn model(&self) -> &str {
        "failing-embedder"
    }

    async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        })
    }
}

/// Chat provider returning a canned reply and recording what it was sent.
pub struct ScriptedChat {
    reply: Result<String, u16>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Every call fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ChatProvider for ScriptedChat {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request);
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(ProviderError::Status {
                status: *status,
                body: "quota exceeded".to_string(),
            }),
        }
    }
}
