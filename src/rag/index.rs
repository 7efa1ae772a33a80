//! Reference corpus index.
//!
//! Startup is a two-step operation: [`CorpusIndex::load`] reads a persisted
//! index and reports *why* it could not ([`IndexLoadError`]); on any load error
//! [`CorpusIndex::open_or_build`] falls back to [`CorpusIndex::build`] exactly
//! once. After that the index is an immutable in-memory snapshot.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::similarity::rank_descending_by_cosine;
use super::splitter::{SplitterConfig, TextSplitter};
use super::sqlite::{SqliteIndexStore, INDEX_FILE_NAME};
use super::store::{IndexMeta, IndexedChunk, ScoredChunk};
use crate::core::config::settings::CorpusSettings;
use crate::llm::{EmbeddingProvider, ProviderError};

#[derive(Debug, Error)]
pub enum IndexLoadError {
    #[error("no persisted index in {0}")]
    Missing(PathBuf),
    #[error("persisted index is unreadable: {0}")]
    Unreadable(String),
}

#[derive(Debug, Error)]
pub enum IndexBuildError {
    #[error("failed to read corpus source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corpus source {0} produced no chunks")]
    EmptyCorpus(PathBuf),
    #[error("failed to embed corpus: {0}")]
    Embedding(#[from] ProviderError),
    #[error("embedding dimension mismatch: expected {expected}, got {got} for {chunk_id}")]
    DimensionMismatch {
        chunk_id: String,
        expected: usize,
        got: usize,
    },
    #[error("failed to prepare index directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to persist index: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Everything a rebuild needs besides the embedder.
#[derive(Debug, Clone)]
pub struct IndexParams {
    pub source_file: PathBuf,
    pub index_dir: PathBuf,
    pub splitter: SplitterConfig,
    pub batch_size: usize,
}

impl IndexParams {
    pub fn from_settings(corpus: &CorpusSettings, batch_size: usize) -> Self {
        Self {
            source_file: corpus.source_file.clone(),
            index_dir: corpus.index_dir.clone(),
            splitter: SplitterConfig {
                chunk_size: corpus.chunk_size,
                chunk_overlap: corpus.chunk_overlap,
                ..Default::default()
            },
            batch_size: batch_size.max(1),
        }
    }
}

#[derive(Debug)]
pub struct CorpusIndex {
    chunks: Vec<IndexedChunk>,
    meta: IndexMeta,
}

impl CorpusIndex {
    /// Load the persisted index, or rebuild it from the source text when the
    /// directory is absent, empty or unreadable.
    pub async fn open_or_build(
        params: &IndexParams,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, IndexBuildError> {
        match Self::load(&params.index_dir, embedder).await {
            Ok(index) => {
                tracing::info!(
                    "Loaded corpus index from {} ({} chunks, built {})",
                    params.index_dir.display(),
                    index.len(),
                    index.meta.built_at
                );
                return Ok(index);
            }
            Err(IndexLoadError::Missing(dir)) => {
                tracing::info!("No corpus index in {}, building", dir.display());
            }
            Err(err) => {
                tracing::warn!("{}; rebuilding", err);
            }
        }

        let index = Self::build(params, embedder).await?;
        tracing::info!(
            "Built corpus index in {} ({} chunks)",
            params.index_dir.display(),
            index.len()
        );
        Ok(index)
    }

    pub async fn load(
        index_dir: &Path,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, IndexLoadError> {
        if !dir_has_entries(index_dir) {
            return Err(IndexLoadError::Missing(index_dir.to_path_buf()));
        }

        let db_path = index_dir.join(INDEX_FILE_NAME);
        if !db_path.is_file() {
            return Err(IndexLoadError::Unreadable(format!(
                "{} is missing",
                db_path.display()
            )));
        }

        let unreadable = |err: sqlx::Error| IndexLoadError::Unreadable(err.to_string());
        let store = SqliteIndexStore::open_existing(&db_path)
            .await
            .map_err(unreadable)?;
        let meta = store.read_meta().await.map_err(unreadable);
        let chunks = store.read_chunks().await.map_err(unreadable);
        store.close().await;

        let meta = meta?.ok_or_else(|| {
            IndexLoadError::Unreadable("index metadata is missing or incomplete".to_string())
        })?;
        let chunks = chunks?;

        validate_snapshot(&meta, &chunks, embedder.model())?;
        Ok(Self { chunks, meta })
    }

    pub async fn build(
        params: &IndexParams,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, IndexBuildError> {
        let text = tokio::fs::read_to_string(&params.source_file)
            .await
            .map_err(|source| IndexBuildError::SourceRead {
                path: params.source_file.clone(),
                source,
            })?;

        let splitter = TextSplitter::new(params.splitter.clone());
        let pieces = splitter.split(&text);
        if pieces.is_empty() {
            return Err(IndexBuildError::EmptyCorpus(params.source_file.clone()));
        }
        tracing::info!(
            "Split {} into {} chunks (size {}, overlap {})",
            params.source_file.display(),
            pieces.len(),
            splitter.config().chunk_size,
            splitter.config().chunk_overlap
        );

        let mut chunks = Vec::with_capacity(pieces.len());
        for batch in pieces.chunks(params.batch_size) {
            let inputs: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
            let vectors = embedder.embed(&inputs).await?;
            if vectors.len() != batch.len() {
                return Err(ProviderError::CountMismatch {
                    expected: batch.len(),
                    got: vectors.len(),
                }
                .into());
            }

            for (piece, embedding) in batch.iter().zip(vectors) {
                chunks.push(IndexedChunk {
                    chunk_id: IndexedChunk::chunk_id_for(piece.chunk_index),
                    ordinal: piece.chunk_index,
                    content: piece.text.clone(),
                    embedding,
                });
            }
            tracing::debug!("Embedded {}/{} chunks", chunks.len(), pieces.len());
        }

        let dims = chunks.first().map(|c| c.embedding.len()).unwrap_or(0);
        for chunk in &chunks {
            if chunk.embedding.len() != dims || dims == 0 {
                return Err(IndexBuildError::DimensionMismatch {
                    chunk_id: chunk.chunk_id.clone(),
                    expected: dims,
                    got: chunk.embedding.len(),
                });
            }
        }

        let meta = IndexMeta {
            embedding_model: embedder.model().to_string(),
            dims,
            chunk_size: params.splitter.chunk_size,
            chunk_overlap: params.splitter.chunk_overlap,
            chunk_count: chunks.len(),
            built_at: chrono::Utc::now().to_rfc3339(),
        };

        reset_dir(&params.index_dir).await?;
        let store = SqliteIndexStore::create(&params.index_dir.join(INDEX_FILE_NAME)).await?;
        let written = store.write_index(&meta, &chunks).await;
        store.close().await;
        written?;

        Ok(Self { chunks, meta })
    }

    /// The `k` chunks most similar to `query`, best first.
    pub fn similarity_search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        rank_descending_by_cosine(query, self.chunks.iter().map(|c| c.embedding.as_slice()))
            .into_iter()
            .take(k)
            .filter_map(|(idx, score)| {
                self.chunks.get(idx).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    score,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }
}

fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

async fn reset_dir(dir: &Path) -> Result<(), IndexBuildError> {
    let to_err = |source| IndexBuildError::Directory {
        path: dir.to_path_buf(),
        source,
    };

    if dir.exists() {
        tokio::fs::remove_dir_all(dir).await.map_err(to_err)?;
    }
    tokio::fs::create_dir_all(dir).await.map_err(to_err)
}

fn validate_snapshot(
    meta: &IndexMeta,
    chunks: &[IndexedChunk],
    embedding_model: &str,
) -> Result<(), IndexLoadError> {
    if chunks.is_empty() {
        return Err(IndexLoadError::Unreadable("index contains no chunks".to_string()));
    }
    if chunks.len() != meta.chunk_count {
        return Err(IndexLoadError::Unreadable(format!(
            "metadata records {} chunks but {} are stored",
            meta.chunk_count,
            chunks.len()
        )));
    }
    if meta.embedding_model != embedding_model {
        return Err(IndexLoadError::Unreadable(format!(
            "index was built with embedding model {:?}, configured model is {:?}",
            meta.embedding_model, embedding_model
        )));
    }
    if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != meta.dims) {
        return Err(IndexLoadError::Unreadable(format!(
            "{} has {} dimensions, expected {}",
            bad.chunk_id,
            bad.embedding.len(),
            meta.dims
        )));
    }
    Ok(())
}
