//! SQLite-backed vector index.
//!
//! Chunks live in `rag_chunks` with their metadata as JSON and their
//! embedding as a little-endian f32 blob. Search embeds the query and scans
//! every stored vector; ranking is shared with the in-memory index.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::distance::{rank_by_distance, DistanceMetric};
use super::document::{scalar_metadata, Document, ScoredMatch};
use super::store::{EmbeddingFunction, VectorIndex};
use crate::core::errors::ApiError;

pub struct SqliteVectorIndex {
    pool: SqlitePool,
    db_path: PathBuf,
    embedder: Arc<dyn EmbeddingFunction>,
    metric: DistanceMetric,
}

impl SqliteVectorIndex {
    /// Opens an existing index. A missing file is an error: the query
    /// service never starts against an index nobody has populated.
    pub async fn open(
        db_path: &Path,
        embedder: Arc<dyn EmbeddingFunction>,
        metric: DistanceMetric,
    ) -> Result<Self, ApiError> {
        if !db_path.exists() {
            return Err(ApiError::Internal(format!(
                "vector index not found at {}",
                db_path.display()
            )));
        }
        Self::connect(db_path, false, embedder, metric).await
    }

    /// Opens the index, creating the database file if needed.
    #[cfg(test)]
    pub async fn create(
        db_path: &Path,
        embedder: Arc<dyn EmbeddingFunction>,
        metric: DistanceMetric,
    ) -> Result<Self, ApiError> {
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Self::connect(db_path, true, embedder, metric).await
    }

    async fn connect(
        db_path: &Path,
        create_if_missing: bool,
        embedder: Arc<dyn EmbeddingFunction>,
        metric: DistanceMetric,
    ) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let index = Self {
            pool,
            db_path: db_path.to_path_buf(),
            embedder,
            metric,
        };
        index.init_schema().await?;
        index.check_embedding_model().await?;
        Ok(index)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_chunks (
                chunk_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                metadata TEXT DEFAULT '{}',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    /// Model that produced the stored vectors, if recorded.
    pub async fn embedding_model(&self) -> Result<Option<String>, ApiError> {
        sqlx::query_scalar("SELECT value FROM rag_meta WHERE key = 'embedding_model'")
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::internal)
    }

    async fn check_embedding_model(&self) -> Result<(), ApiError> {
        if let Some(stored) = self.embedding_model().await? {
            if stored != self.embedder.model() {
                tracing::warn!(
                    "Index {} was built with embedding model '{}' but '{}' is configured; distances will be meaningless",
                    self.db_path.display(),
                    stored,
                    self.embedder.model()
                );
            }
        }
        Ok(())
    }

    /// Stores documents with precomputed embeddings in one transaction and
    /// records the embedding model next to them.
    #[cfg(test)]
    pub async fn insert_batch(&self, items: Vec<(Document, Vec<f32>)>) -> Result<(), ApiError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        for (document, embedding) in &items {
            let blob = serialize_embedding(embedding);
            let metadata_str = serde_json::to_string(&document.metadata).map_err(ApiError::internal)?;
            let source = document
                .metadata
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or_default();

            sqlx::query(
                "INSERT OR REPLACE INTO rag_chunks (chunk_id, content, source, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&document.id)
            .bind(&document.content)
            .bind(source)
            .bind(&metadata_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        sqlx::query(
            "INSERT OR REPLACE INTO rag_meta (key, value, updated_at)
             VALUES ('embedding_model', ?1, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        )
        .bind(self.embedder.model())
        .execute(&mut *tx)
        .await
        .map_err(ApiError::internal)?;

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(())
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Document {
        let metadata_str: Option<String> = row.get("metadata");
        let metadata = metadata_str
            .and_then(|s| serde_json::from_str::<Value>(&s).ok())
            .map(scalar_metadata)
            .unwrap_or_default();

        Document {
            id: row.get("chunk_id"),
            content: row.get("content"),
            metadata,
        }
    }
}

#[cfg(test)]
fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredMatch>, ApiError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await?;

        let rows = sqlx::query(
            "SELECT chunk_id, content, metadata, embedding
             FROM rag_chunks
             ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let candidates = rows.iter().filter_map(|row| {
            let embedding_bytes: Option<Vec<u8>> = row.get("embedding");
            let embedding_bytes = embedding_bytes.filter(|b| !b.is_empty())?;
            Some((Self::row_to_document(row), deserialize_embedding(&embedding_bytes)))
        });

        let matches = rank_by_distance(&query_embedding, candidates, k, self.metric)?;
        tracing::debug!(
            "Similarity search over {} rows returned {} matches",
            rows.len(),
            matches.len()
        );
        Ok(matches)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }
}
