//! In-memory vector index.
//!
//! Reference [`VectorIndex`] implementation used for local single-user
//! deployments and tests. Entries live in per-collection id maps behind one
//! `RwLock`: concurrent readers proceed in parallel, writers serialize, and
//! same-id writes are last-writer-wins.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::trace;

use async_trait::async_trait;
use storyloom_core::{Error, IndexEntry, IndexHit, Result, Vector, VectorIndex};

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a > 0.0 && mag_b > 0.0 {
        dot / (mag_a * mag_b)
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
struct StoredEntry {
    text: String,
    metadata: serde_json::Value,
    vector: Vector,
}

/// In-memory multi-collection vector index with cosine distance.
#[derive(Default)]
pub struct MemoryIndex {
    collections: RwLock<HashMap<String, HashMap<String, StoredEntry>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: Vec<IndexEntry>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .ok_or_else(|| Error::UnknownCollection(collection.to_string()))?;

        for entry in entries {
            trace!(collection, id = %entry.id, "upserting index entry");
            slot.insert(
                entry.id,
                StoredEntry {
                    text: entry.text,
                    metadata: entry.metadata,
                    vector: entry.vector,
                },
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &Vector,
        limit: usize,
    ) -> Result<Vec<IndexHit>> {
        let collections = self.collections.read().await;
        let slot = collections
            .get(collection)
            .ok_or_else(|| Error::UnknownCollection(collection.to_string()))?;

        let mut hits: Vec<IndexHit> = slot
            .iter()
            .map(|(id, entry)| IndexHit {
                id: id.clone(),
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
                distance: 1.0 - cosine_similarity(vector.as_slice(), entry.vector.as_slice()),
            })
            .collect();

        // Ascending distance; id as tie-break so repeated queries are stable.
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|slot| slot.len())
            .ok_or_else(|| Error::UnknownCollection(collection.to_string()))
    }

    async fn clear(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .ok_or_else(|| Error::UnknownCollection(collection.to_string()))?;
        slot.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            text: format!("text for {}", id),
            metadata: json!({"id": id}),
            vector: Vector::from(vector),
        }
    }

    #[test]
    fn test_cosine_similarity_basics() {
        let a = [1.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 1.0, 0.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_magnitude() {
        let zero = [0.0, 0.0];
        let a = [1.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &a), 0.0);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let a = [1.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[tokio::test]
    async fn test_ensure_collection_idempotent() {
        let index = MemoryIndex::new();
        index.ensure_collection("c").await.unwrap();
        index
            .upsert("c", vec![entry("a", vec![1.0, 0.0])])
            .await
            .unwrap();

        // re-ensuring must not drop data
        index.ensure_collection("c").await.unwrap();
        assert_eq!(index.count("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let index = MemoryIndex::new();
        index.ensure_collection("c").await.unwrap();

        index
            .upsert("c", vec![entry("a", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert("c", vec![entry("a", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(index.count("c").await.unwrap(), 1);

        let hits = index
            .query("c", &Vector::from(vec![0.0, 1.0]), 10)
            .await
            .unwrap();
        assert!(hits[0].distance < 1e-6, "latest vector should have won");
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let index = MemoryIndex::new();
        index.ensure_collection("c").await.unwrap();
        index
            .upsert(
                "c",
                vec![
                    entry("far", vec![0.0, 1.0]),
                    entry("near", vec![1.0, 0.1]),
                    entry("exact", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let hits = index
            .query("c", &Vector::from(vec![1.0, 0.0]), 2)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "exact");
        assert_eq!(hits[1].id, "near");
    }

    #[tokio::test]
    async fn test_query_unknown_collection() {
        let index = MemoryIndex::new();
        let err = index
            .query("missing", &Vector::from(vec![1.0]), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCollection(_)));
    }

    #[tokio::test]
    async fn test_clear_keeps_collection_queryable() {
        let index = MemoryIndex::new();
        index.ensure_collection("c").await.unwrap();
        index
            .upsert("c", vec![entry("a", vec![1.0, 0.0])])
            .await
            .unwrap();

        index.clear("c").await.unwrap();
        assert_eq!(index.count("c").await.unwrap(), 0);

        // still present, just empty
        let hits = index
            .query("c", &Vector::from(vec![1.0, 0.0]), 5)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
