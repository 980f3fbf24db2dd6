// Vector database manager - Qdrant search over the indexed corpus
use anyhow::{Context, Result};
use async_trait::async_trait;
use qdrant_client::{
    client::QdrantClient,
    qdrant::{
        with_payload_selector::SelectorOptions, SearchPoints, Value as QdrantValue,
        WithPayloadSelector,
    },
};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tracing::info;

use crate::errors::DocuMindError;
use crate::rag::services::VectorStore;
use crate::rag::types::ScoredPoint;

/// Vector database manager bound to one collection
pub struct VectorDBManager {
    client: QdrantClient,
    collection: String,
}

impl VectorDBManager {
    /// Connect and verify the collection exists
    pub async fn connect(url: &str, collection: &str) -> crate::errors::Result<Self> {
        let client = QdrantClient::from_url(url)
            .build()
            .map_err(|e| DocuMindError::VectorStore(format!("Failed to create Qdrant client: {}", e)))?;

        let manager = Self {
            client,
            collection: collection.to_string(),
        };

        if !manager.collection_exists().await? {
            return Err(DocuMindError::CollectionMissing {
                collection: collection.to_string(),
            });
        }

        info!(url, collection, "Connected to vector store");
        Ok(manager)
    }

    /// Check whether the configured collection is present
    pub async fn collection_exists(&self) -> Result<bool> {
        let collections_list = self
            .client
            .list_collections()
            .await
            .context("Failed to list collections")?;

        Ok(collections_list
            .collections
            .iter()
            .any(|c| c.name == self.collection))
    }

    /// Top-k cosine search, best match first
    pub async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<ScoredPoint>> {
        let search_result = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection.clone(),
                vector: query_embedding.to_vec(),
                limit: top_k as u64,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                ..Default::default()
            })
            .await
            .context("Failed to search points")?;

        Ok(search_result
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                score: point.score,
                payload: payload_to_json(point.payload),
            })
            .collect())
    }

    /// Number of indexed chunks
    pub async fn point_count(&self) -> Result<u64> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .context("Failed to get collection info")?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl VectorStore for VectorDBManager {
    async fn query(&self, vector: &[f32], top_k: usize) -> crate::errors::Result<Vec<ScoredPoint>> {
        self.search(vector, top_k)
            .await
            .map_err(|e| DocuMindError::VectorStore(format!("{:#}", e)))
    }
}

fn payload_to_json(payload: HashMap<String, QdrantValue>) -> Map<String, JsonValue> {
    payload
        .into_iter()
        .filter_map(|(key, value)| qdrant_to_json_value(&value).map(|json| (key, json)))
        .collect()
}

fn qdrant_to_json_value(value: &QdrantValue) -> Option<JsonValue> {
    value.kind.as_ref().and_then(|kind| {
        use qdrant_client::qdrant::value::Kind;
        match kind {
            Kind::StringValue(s) => Some(JsonValue::String(s.clone())),
            Kind::IntegerValue(i) => Some(JsonValue::Number((*i).into())),
            Kind::DoubleValue(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
            Kind::BoolValue(b) => Some(JsonValue::Bool(*b)),
            Kind::NullValue(_) => Some(JsonValue::Null),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_conversion() {
        let mut payload = HashMap::new();
        payload.insert("text".to_string(), QdrantValue::from("Org units group accounts".to_string()));
        payload.insert("file".to_string(), QdrantValue::from("org.pdf".to_string()));
        payload.insert("page".to_string(), QdrantValue::from(4i64));

        let json = payload_to_json(payload);
        assert_eq!(json["text"], "Org units group accounts");
        assert_eq!(json["file"], "org.pdf");
        assert_eq!(json["page"].as_i64(), Some(4));
    }

    #[test]
    fn test_double_value_conversion() {
        let value = QdrantValue::from(0.5f64);
        assert_eq!(qdrant_to_json_value(&value), Some(JsonValue::from(0.5)));
    }

    #[tokio::test]
    #[ignore] // Integration test - requires Qdrant
    async fn test_missing_collection_rejected() {
        let result = VectorDBManager::connect("http://localhost:6334", "does-not-exist").await;
        assert!(matches!(result, Err(DocuMindError::CollectionMissing { .. })));
    }
}
