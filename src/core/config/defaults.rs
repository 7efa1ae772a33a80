use serde_json::{json, Value};

/// How an environment variable's raw string is turned into a config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    Str,
    Uint,
    Float,
    Bool,
    /// Comma-separated list of strings.
    List,
}

/// Environment variable → config path mapping, applied after the YAML file.
pub const ENV_OVERRIDES: [(&str, &[&str], EnvKind); 19] = [
    ("HOST", &["server", "host"], EnvKind::Str),
    ("PORT", &["server", "port"], EnvKind::Uint),
    ("DEBUG", &["server", "debug"], EnvKind::Bool),
    ("CORS_ORIGINS", &["server", "cors_origins"], EnvKind::List),
    ("OPENAI_API_KEY", &["llm", "api_key"], EnvKind::Str),
    ("OPENAI_BASE_URL", &["llm", "base_url"], EnvKind::Str),
    ("SURVEY_MODEL", &["llm", "model"], EnvKind::Str),
    ("MAX_TOKENS", &["llm", "max_tokens"], EnvKind::Uint),
    ("TEMPERATURE", &["llm", "temperature"], EnvKind::Float),
    ("LLM_TIMEOUT_SECS", &["llm", "timeout_secs"], EnvKind::Uint),
    ("EMBEDDING_MODEL", &["embedding", "model"], EnvKind::Str),
    ("EMBEDDING_BATCH_SIZE", &["embedding", "batch_size"], EnvKind::Uint),
    ("SURVEY_DATA_FILE", &["corpus", "source_file"], EnvKind::Str),
    ("INDEX_DIR", &["corpus", "index_dir"], EnvKind::Str),
    ("CHUNK_SIZE", &["corpus", "chunk_size"], EnvKind::Uint),
    ("CHUNK_OVERLAP", &["corpus", "chunk_overlap"], EnvKind::Uint),
    ("SIMILARITY_TOP_K", &["retrieval", "top_k"], EnvKind::Uint),
    ("MAX_QUESTIONS", &["generation", "max_questions"], EnvKind::Uint),
    ("STRICT_SCHEMA", &["generation", "strict_schema"], EnvKind::Bool),
];

pub fn default_config() -> Value {
    json!({
        "server": {
            "host": "0.0.0.0",
            "port": 5001,
            "debug": false,
            "cors_origins": ["http://localhost:5173", "http://localhost:3000"]
        },
        "llm": {
            "api_key": null,
            "base_url": "https://api.openai.com/v1",
            "model": "gpt-4o-mini",
            "max_tokens": 4000,
            "temperature": 0.7,
            "timeout_secs": null
        },
        "embedding": {
            "model": "text-embedding-ada-002",
            "batch_size": 64
        },
        "corpus": {
            "source_file": "data/ques0313.txt",
            "index_dir": "vector_index",
            "chunk_size": 500,
            "chunk_overlap": 50
        },
        "retrieval": {
            "top_k": 3
        },
        "generation": {
            "max_questions": 12,
            "strict_schema": false
        }
    })
}
