use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::{ChatProvider, EmbeddingProvider, ProviderError};
use super::types::ChatRequest;
use crate::core::config::settings::{EmbeddingSettings, LlmSettings};

/// Client for OpenAI-compatible `/chat/completions` and `/embeddings` endpoints.
#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(llm: &LlmSettings, embedding: &EmbeddingSettings) -> Result<Self, ProviderError> {
        let api_key = llm
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let mut builder = Client::builder();
        if let Some(secs) = llm.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|source| ProviderError::Transport {
            url: llm.base_url.clone(),
            source,
        })?;

        Ok(Self {
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: llm.model.clone(),
            embedding_model: embedding.model.clone(),
            client,
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        res.json::<Value>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.chat_model
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let body = chat_body(&self.chat_model, &request);
        let payload = self.post_json("chat/completions", &body).await?;
        completion_content(&payload)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn model(&self) -> &str {
        &self.embedding_model
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });
        let payload = self.post_json("embeddings", &body).await?;
        embeddings_in_input_order(payload, inputs.len())
    }
}

fn chat_body(model: &str, request: &ChatRequest) -> Value {
    let mut body = json!({
        "model": model,
        "messages": request.messages,
        "stream": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(t) = request.temperature {
            obj.insert("temperature".to_string(), json!(t));
        }
        if let Some(t) = request.max_tokens {
            obj.insert("max_tokens".to_string(), json!(t));
        }
    }

    body
}

fn completion_content(payload: &Value) -> Result<String, ProviderError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or(ProviderError::EmptyResponse)
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

fn embeddings_in_input_order(
    payload: Value,
    expected: usize,
) -> Result<Vec<Vec<f32>>, ProviderError> {
    let response: EmbeddingsResponse =
        serde_json::from_value(payload).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if response.data.len() != expected {
        return Err(ProviderError::CountMismatch {
            expected,
            got: response.data.len(),
        });
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for (position, item) in response.data.into_iter().enumerate() {
        let index = item.index.unwrap_or(position);
        let slot = slots.get_mut(index).ok_or_else(|| {
            ProviderError::Decode(format!(
                "embedding index {} out of range for {} inputs",
                index, expected
            ))
        })?;
        if slot.is_some() {
            return Err(ProviderError::Decode(format!(
                "embedding index {} returned more than once",
                index
            )));
        }
        *slot = Some(item.embedding);
    }

    // Counts match and no index repeats, so every slot is filled.
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| ProviderError::Decode(format!("embedding index {} missing", index)))
        })
        .collect()
}
