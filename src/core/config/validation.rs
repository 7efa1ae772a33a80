use super::settings::Settings;
use crate::core::errors::ConfigError;

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.server.port == 0 {
        return Err(ConfigError::invalid("server.port", "must be > 0"));
    }
    if settings.server.host.trim().is_empty() {
        return Err(ConfigError::invalid("server.host", "must not be empty"));
    }

    if settings.llm.model.trim().is_empty() {
        return Err(ConfigError::invalid("llm.model", "must not be empty"));
    }
    if settings.llm.base_url.trim().is_empty() {
        return Err(ConfigError::invalid("llm.base_url", "must not be empty"));
    }
    if settings.llm.max_tokens == 0 {
        return Err(ConfigError::invalid("llm.max_tokens", "must be > 0"));
    }
    if !(0.0..=2.0).contains(&settings.llm.temperature) {
        return Err(ConfigError::invalid(
            "llm.temperature",
            format!("must be in [0.0, 2.0], got {}", settings.llm.temperature),
        ));
    }
    if settings.llm.timeout_secs == Some(0) {
        return Err(ConfigError::invalid("llm.timeout_secs", "must be > 0 when set"));
    }

    if settings.embedding.model.trim().is_empty() {
        return Err(ConfigError::invalid("embedding.model", "must not be empty"));
    }
    if settings.embedding.batch_size == 0 {
        return Err(ConfigError::invalid("embedding.batch_size", "must be > 0"));
    }

    let corpus = &settings.corpus;
    if corpus.chunk_size == 0 {
        return Err(ConfigError::invalid("corpus.chunk_size", "must be > 0"));
    }
    if corpus.chunk_overlap >= corpus.chunk_size {
        return Err(ConfigError::invalid(
            "corpus.chunk_overlap",
            format!(
                "must be smaller than chunk_size ({} >= {})",
                corpus.chunk_overlap, corpus.chunk_size
            ),
        ));
    }

    if settings.retrieval.top_k == 0 {
        return Err(ConfigError::invalid("retrieval.top_k", "must be > 0"));
    }
    if settings.generation.max_questions == 0 {
        return Err(ConfigError::invalid("generation.max_questions", "must be > 0"));
    }

    Ok(())
}
