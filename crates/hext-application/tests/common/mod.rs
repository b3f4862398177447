//! Hand-written fakes for the external services.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream;
use hext_application::{ChatServices, ChatUseCase};
use hext_core::agent::{
    ChatModel, ChatRequest, ImageCaptioner, ImageGenerator, TextStream, WebSearch,
};
use hext_core::config::AppConfig;
use hext_core::error::{HextError, Result};
use hext_core::search::SourceCitation;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replies with scripted answers in order and records every request.
#[derive(Default)]
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    complete_calls: AtomicUsize,
    stream_calls: AtomicUsize,
}

impl ScriptedChatModel {
    pub fn new<I>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok(r.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst) + self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: &ChatRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HextError::internal("no scripted reply left")))
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.next_reply(request)
    }

    /// Streams the scripted reply word by word.
    async fn stream(&self, request: &ChatRequest) -> Result<TextStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply(request)?;
        let deltas: Vec<Result<String>> = reply
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(deltas)))
    }
}

/// Returns fixed hits (or an error) and records every query.
pub struct RecordingSearch {
    hits: Result<Vec<SourceCitation>>,
    queries: Mutex<Vec<String>>,
}

impl RecordingSearch {
    pub fn returning(hits: Vec<SourceCitation>) -> Arc<Self> {
        Arc::new(Self {
            hits: Ok(hits),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: HextError) -> Arc<Self> {
        Arc::new(Self {
            hits: Err(err),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for RecordingSearch {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SourceCitation>> {
        self.queries.lock().unwrap().push(query.to_string());
        self.hits.clone().map(|mut hits| {
            hits.truncate(max_results);
            hits
        })
    }
}

pub struct FakeCaptioner {
    caption: Result<String>,
    calls: AtomicUsize,
}

impl FakeCaptioner {
    pub fn new(caption: Result<String>) -> Arc<Self> {
        Arc::new(Self {
            caption,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageCaptioner for FakeCaptioner {
    fn name(&self) -> &str {
        "fake-captioner"
    }

    async fn caption(&self, _image: &[u8], _mime_type: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.caption.clone()
    }
}

pub struct FakeImageGenerator {
    image: Result<Vec<u8>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeImageGenerator {
    pub fn new(image: Result<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            image,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeImageGenerator {
    fn name(&self) -> &str {
        "fake-image-generator"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.image.clone()
    }
}

/// All fakes behind one use case, so tests can inspect them afterwards.
pub struct Harness {
    pub use_case: ChatUseCase,
    pub chat: Arc<ScriptedChatModel>,
    pub search: Arc<RecordingSearch>,
    pub captioner: Arc<FakeCaptioner>,
    pub images: Arc<FakeImageGenerator>,
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

pub fn managua_hits() -> Vec<SourceCitation> {
    vec![
        SourceCitation::new(
            "Managua: 31°C, parcialmente nublado, humedad 70%",
            "https://tiempo.example/managua",
        ),
        SourceCitation::new(
            "Pronóstico para Managua: lluvias por la tarde",
            "https://clima.example/ni/managua",
        ),
    ]
}

impl Harness {
    pub fn new(config: AppConfig, chat: Arc<ScriptedChatModel>, search: Arc<RecordingSearch>) -> Self {
        Self::with_image_services(
            config,
            chat,
            search,
            FakeCaptioner::new(Ok("a tiger lying on the grass".to_string())),
            FakeImageGenerator::new(Ok(vec![0x89, b'P', b'N', b'G'])),
        )
    }

    pub fn with_image_services(
        config: AppConfig,
        chat: Arc<ScriptedChatModel>,
        search: Arc<RecordingSearch>,
        captioner: Arc<FakeCaptioner>,
        images: Arc<FakeImageGenerator>,
    ) -> Self {
        let services = ChatServices {
            chat: chat.clone(),
            captioner: captioner.clone(),
            image_generator: images.clone(),
            search: search.clone(),
        };
        let use_case = ChatUseCase::new(&config, services).with_clock(today);

        Self {
            use_case,
            chat,
            search,
            captioner,
            images,
        }
    }

    pub fn external_calls(&self) -> usize {
        self.chat.calls()
            + self.search.queries().len()
            + self.captioner.calls()
            + self.images.prompts().len()
    }
}

/// Default configuration with streaming off, so `complete` answers every pass.
pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.chat.stream = false;
    config
}
