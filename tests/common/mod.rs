//! In-memory fakes for the pipeline's external services
#![allow(dead_code)]

use async_trait::async_trait;
use documind::errors::{DocuMindError, Result};
use documind::rag::{Embedder, Generator, Judge, ScoredPoint, VectorStore};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn point(score: f32, text: &str, file: &str, page: i64) -> ScoredPoint {
    ScoredPoint {
        score,
        payload: json!({ "text": text, "file": file, "page": page })
            .as_object()
            .cloned()
            .unwrap(),
    }
}

pub fn malformed_point(score: f32) -> ScoredPoint {
    ScoredPoint {
        score,
        payload: json!({ "file": "broken.pdf" }).as_object().cloned().unwrap(),
    }
}

pub struct FakeEmbedder {
    pub fail: bool,
}

impl FakeEmbedder {
    pub fn working() -> Arc<Self> {
        Arc::new(Self { fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true })
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            return Err(DocuMindError::Embedding("model not loaded".to_string()));
        }
        Ok(texts.iter().map(|_| vec![0.6, 0.8]).collect())
    }
}

pub struct FakeStore {
    points: Vec<ScoredPoint>,
    pub last_top_k: Mutex<Option<usize>>,
}

impl FakeStore {
    pub fn with_points(points: Vec<ScoredPoint>) -> Arc<Self> {
        Arc::new(Self {
            points,
            last_top_k: Mutex::new(None),
        })
    }
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<ScoredPoint>> {
        *self.last_top_k.lock().unwrap() = Some(top_k);
        Ok(self.points.iter().take(top_k).cloned().collect())
    }
}

#[derive(Clone)]
pub enum Reply {
    Text(String),
    Error(String),
    Hang,
    Panic,
}

/// Scripted generator or judge with call counting
pub struct FakeService {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, input: String) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(input);
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Error(message) => Err(DocuMindError::OllamaApiError(message)),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".to_string())
            }
            Reply::Panic => panic!("judge integration bug"),
        }
    }
}

#[async_trait]
impl Generator for FakeService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.respond(prompt.to_string()).await
    }
}

#[async_trait]
impl Judge for FakeService {
    async fn evaluate(&self, question: &str, answer: &str, context: &str) -> Result<String> {
        self.respond(format!("{}\n---\n{}\n---\n{}", question, answer, context))
            .await
    }
}
