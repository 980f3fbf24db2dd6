// Embedding engine - local sentence embeddings via Candle
use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::info;

use crate::errors::DocuMindError;
use crate::rag::services::Embedder;

/// Default model; must match the one used to index the corpus
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Embedding engine using a BERT-family sentence model via Candle
pub struct EmbeddingEngine {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

impl EmbeddingEngine {
    /// Create new embedding engine (downloads model on first use)
    pub fn new(model_id: &str) -> Result<Self> {
        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")
            .context("Failed to download model config")?;
        let tokenizer_path = repo.get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weights_path = repo.get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;
        let config: Config = serde_json::from_str(&config_contents)
            .context("Failed to parse model config")?;
        let dimension = serde_json::from_str::<serde_json::Value>(&config_contents)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .context("Model config has no hidden_size")? as usize;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[weights_path],
                candle_core::DType::F32,
                &device,
            ).context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config)
            .context("Failed to create BERT model")?;

        info!(model_id, dimension, "Embedding model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    /// Generate normalized embeddings for multiple texts
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let batch_size = texts.len();

        // Pad sequences
        let mut padded_ids = vec![vec![0u32; max_len]; batch_size];
        let mut padded_mask = vec![vec![0u32; max_len]; batch_size];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            padded_ids[i][..ids.len()].copy_from_slice(ids);
            padded_mask[i][..mask.len()].copy_from_slice(mask);
        }

        let flat_ids: Vec<u32> = padded_ids.into_iter().flatten().collect();
        let flat_mask: Vec<u32> = padded_mask.into_iter().flatten().collect();

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self.model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = Self::mean_pool(&hidden, &attention_mask)?;

        let mut embeddings = pooled.to_vec2::<f32>()?;
        for embedding in &mut embeddings {
            l2_normalize(embedding);
        }

        Ok(embeddings)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum_embeddings.broadcast_div(&sum_mask)?)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Scale a vector to unit length in place. Zero vectors are left as-is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Async adapter running the model on the blocking pool
#[derive(Clone)]
pub struct CandleEmbedder {
    engine: Arc<EmbeddingEngine>,
    expected_dimension: usize,
}

impl CandleEmbedder {
    /// `expected_dimension` is the vector size of the indexed collection
    pub fn new(engine: EmbeddingEngine, expected_dimension: usize) -> crate::errors::Result<Self> {
        if engine.dimension() != expected_dimension {
            return Err(DocuMindError::ConfigError(format!(
                "embedding model produces {} dimensions but the index expects {}",
                engine.dimension(),
                expected_dimension
            )));
        }
        Ok(Self {
            engine: Arc::new(engine),
            expected_dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.expected_dimension
    }
}

#[async_trait]
impl Embedder for CandleEmbedder {
    async fn embed(&self, texts: &[String]) -> crate::errors::Result<Vec<Vec<f32>>> {
        let engine = Arc::clone(&self.engine);
        let owned = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
            engine.embed_batch(&refs)
        })
        .await
        .map_err(|e| DocuMindError::Embedding(format!("embedding worker failed: {}", e)))?
        .map_err(|e| DocuMindError::Embedding(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0; 4];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embedding_is_normalized() {
        let engine = EmbeddingEngine::new(DEFAULT_MODEL_ID).expect("Failed to create engine");
        let embeddings = engine.embed_batch(&["Hello world"]).expect("Failed to embed");
        assert_eq!(embeddings[0].len(), engine.dimension());
        let norm: f32 = embeddings[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embed_empty_batch() {
        let engine = EmbeddingEngine::new(DEFAULT_MODEL_ID).expect("Failed to create engine");
        let embeddings = engine.embed_batch(&[]).expect("Failed to embed empty batch");
        assert!(embeddings.is_empty());
    }

    #[tokio::test]
    #[ignore] // Integration test - requires model download
    async fn test_candle_embedder_rejects_dimension_mismatch() {
        let engine = EmbeddingEngine::new(DEFAULT_MODEL_ID).expect("Failed to create engine");
        assert!(CandleEmbedder::new(engine, 768).is_err());
    }
}
