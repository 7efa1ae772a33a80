//! SQLite-backed persistence for the corpus index.
//!
//! One `index.db` per index directory holding chunk text, little-endian `f32`
//! embedding blobs and a key/value metadata table. Search happens in memory;
//! this store is only read at startup and written during a rebuild.

use std::collections::HashMap;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{IndexMeta, IndexedChunk};

pub const INDEX_FILE_NAME: &str = "index.db";

pub struct SqliteIndexStore {
    pool: SqlitePool,
}

impl SqliteIndexStore {
    /// Opens an existing index file; never creates one.
    pub async fn open_existing(db_path: &Path) -> Result<Self, sqlx::Error> {
        Self::connect(db_path, false).await
    }

    /// Creates (or truncates into) a fresh index file with the current schema.
    pub async fn create(db_path: &Path) -> Result<Self, sqlx::Error> {
        let store = Self::connect(db_path, true).await?;
        store.init_schema().await?;
        Ok(store)
    }

    async fn connect(db_path: &Path, create: bool) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(create)
            .journal_mode(SqliteJournalMode::Delete)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS corpus_chunks (
                chunk_id TEXT PRIMARY KEY,
                ordinal INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_corpus_ordinal ON corpus_chunks(ordinal)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    /// Replaces all chunks and metadata in a single transaction.
    pub async fn write_index(
        &self,
        meta: &IndexMeta,
        chunks: &[IndexedChunk],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM corpus_chunks")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM index_meta")
            .execute(&mut *tx)
            .await?;

        for chunk in chunks {
            let blob = Self::serialize_embedding(&chunk.embedding);
            sqlx::query(
                "INSERT INTO corpus_chunks (chunk_id, ordinal, content, embedding)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&chunk.chunk_id)
            .bind(chunk.ordinal as i64)
            .bind(&chunk.content)
            .bind(&blob)
            .execute(&mut *tx)
            .await?;
        }

        let entries = [
            ("embedding_model", meta.embedding_model.clone()),
            ("dims", meta.dims.to_string()),
            ("chunk_size", meta.chunk_size.to_string()),
            ("chunk_overlap", meta.chunk_overlap.to_string()),
            ("chunk_count", meta.chunk_count.to_string()),
            ("built_at", meta.built_at.clone()),
        ];
        for (key, value) in entries {
            sqlx::query("INSERT INTO index_meta (key, value) VALUES (?1, ?2)")
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Reads the metadata table; `Ok(None)` when a required key is absent or
    /// not parseable.
    pub async fn read_meta(&self) -> Result<Option<IndexMeta>, sqlx::Error> {
        let rows = sqlx::query("SELECT key, value FROM index_meta")
            .fetch_all(&self.pool)
            .await?;

        let mut pairs = HashMap::new();
        for row in &rows {
            let key: String = row.try_get("key")?;
            let value: String = row.try_get("value")?;
            pairs.insert(key, value);
        }

        Ok(meta_from_pairs(&pairs))
    }

    /// All chunks in source order.
    pub async fn read_chunks(&self) -> Result<Vec<IndexedChunk>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT chunk_id, ordinal, content, embedding
             FROM corpus_chunks
             ORDER BY ordinal ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let ordinal: i64 = row.try_get("ordinal")?;
                let embedding_bytes: Vec<u8> = row.try_get("embedding")?;
                Ok(IndexedChunk {
                    chunk_id: row.try_get("chunk_id")?,
                    ordinal: ordinal.max(0) as usize,
                    content: row.try_get("content")?,
                    embedding: Self::deserialize_embedding(&embedding_bytes),
                })
            })
            .collect()
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn meta_from_pairs(pairs: &HashMap<String, String>) -> Option<IndexMeta> {
    let number = |key: &str| pairs.get(key).and_then(|v| v.parse::<usize>().ok());

    Some(IndexMeta {
        embedding_model: pairs.get("embedding_model")?.clone(),
        dims: number("dims")?,
        chunk_size: number("chunk_size")?,
        chunk_overlap: number("chunk_overlap")?,
        chunk_count: number("chunk_count")?,
        built_at: pairs.get("built_at")?.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_chunk(ordinal: usize, content: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            chunk_id: IndexedChunk::chunk_id_for(ordinal),
            ordinal,
            content: content.to_string(),
            embedding,
        }
    }

    fn meta(chunk_count: usize) -> IndexMeta {
        IndexMeta {
            embedding_model: "embed-test".to_string(),
            dims: 3,
            chunk_size: 500,
            chunk_overlap: 50,
            chunk_count,
            built_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn write_then_read_preserves_chunks_and_meta() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(INDEX_FILE_NAME);

        let store = SqliteIndexStore::create(&path).await.unwrap();
        let chunks = vec![
            make_chunk(1, "问卷2. 使用频率", vec![0.0, 1.0, 0.5]),
            make_chunk(0, "问卷1. 满意度", vec![1.0, 0.0, -0.25]),
        ];
        store.write_index(&meta(2), &chunks).await.unwrap();
        store.close().await;

        let reopened = SqliteIndexStore::open_existing(&path).await.unwrap();
        assert_eq!(reopened.read_chunks().await.unwrap().len(), 2);
        assert_eq!(reopened.read_meta().await.unwrap(), Some(meta(2)));

        let loaded = reopened.read_chunks().await.unwrap();
        assert_eq!(loaded[0].chunk_id, "chunk-00000");
        assert_eq!(loaded[0].content, "问卷1. 满意度");
        assert_eq!(loaded[0].embedding, vec![1.0, 0.0, -0.25]);
        assert_eq!(loaded[1].ordinal, 1);
    }

    #[tokio::test]
    async fn rewrite_replaces_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteIndexStore::create(&tmp.path().join(INDEX_FILE_NAME))
            .await
            .unwrap();

        store
            .write_index(&meta(2), &[make_chunk(0, "a", vec![1.0]), make_chunk(1, "b", vec![1.0])])
            .await
            .unwrap();
        store
            .write_index(&meta(1), &[make_chunk(0, "c", vec![1.0])])
            .await
            .unwrap();

        assert_eq!(store.read_chunks().await.unwrap().len(), 1);
        assert_eq!(store.read_meta().await.unwrap().unwrap().chunk_count, 1);
    }

    #[tokio::test]
    async fn open_existing_fails_for_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = SqliteIndexStore::open_existing(&tmp.path().join(INDEX_FILE_NAME)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_meta_reads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteIndexStore::create(&tmp.path().join(INDEX_FILE_NAME))
            .await
            .unwrap();
        assert_eq!(store.read_meta().await.unwrap(), None);
    }
}
