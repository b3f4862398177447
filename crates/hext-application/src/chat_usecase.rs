//! Chat use case implementation.
//!
//! `ChatUseCase` runs one user turn end to end: it records the user message,
//! answers locally when it can, otherwise consults the web-search policy and
//! the chat model, and records exactly one assistant message. Failures of the
//! external services never abort a turn; they become the assistant's reply.

use chrono::{Local, NaiveDate};
use futures::StreamExt;
use hext_core::agent::{
    ChatMessage, ChatModel, ChatRequest, ImageCaptioner, ImageGenerator, WebSearch,
};
use hext_core::canned::CannedResponses;
use hext_core::config::{AppConfig, GenerationMode, SearchConfig};
use hext_core::date::date_reply;
use hext_core::error::{HextError, Result};
use hext_core::prompt::PromptBuilder;
use hext_core::search::{MarkerFilter, SearchPolicy, SearchResults, SourceCitation, trigger};
use hext_core::session::{
    Conversation, ConversationSummary, IMAGE_CONVERSATION_NAME, Message, SessionStore,
};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// Assistant text for a successfully generated image.
pub const IMAGE_READY_REPLY: &str = "Aquí está tu imagen:";

/// Assistant text when the model's reply is empty once search commands are
/// removed.
pub const EMPTY_REPLY: &str = "No pude generar una respuesta. Inténtalo de nuevo.";

/// User text recorded for an image uploaded without a question.
pub const IMAGE_WITHOUT_TEXT: &str = "📷 Imagen sin texto";

/// Receives reply text as it becomes available.
pub type DeltaSink = mpsc::UnboundedSender<String>;

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// The external services a turn may call.
#[derive(Clone)]
pub struct ChatServices {
    pub chat: Arc<dyn ChatModel>,
    pub captioner: Arc<dyn ImageCaptioner>,
    pub image_generator: Arc<dyn ImageGenerator>,
    pub search: Arc<dyn WebSearch>,
}

/// How a turn was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRoute {
    /// Built-in greeting dictionary
    Canned,
    /// Local date answer
    DateShortcut,
    /// Chat model without web search
    Model,
    /// Chat model with web-search context
    ModelWithSearch,
    /// Text-to-image model
    ImageGeneration,
    /// Captioning model, optionally followed by the chat model
    ImageDescription,
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub conversation_id: String,
    /// The assistant message appended by this turn
    pub reply: Message,
    pub route: TurnRoute,
    /// Set when an external call failed and `reply` carries the error text
    pub error: Option<HextError>,
}

struct Answer {
    text: String,
    sources: Vec<SourceCitation>,
    route: TurnRoute,
}

/// Use case for conversing with the assistant.
///
/// # Thread Safety
///
/// The session store and the generation mode live behind `RwLock`s that are
/// never held across a network call, so the use case can be shared through
/// an `Arc`.
pub struct ChatUseCase {
    store: SessionStore,
    services: ChatServices,
    prompt_builder: PromptBuilder,
    canned: CannedResponses,
    search: SearchConfig,
    date_shortcut: bool,
    stream: bool,
    mode: RwLock<GenerationMode>,
    today: Clock,
}

impl ChatUseCase {
    pub fn new(config: &AppConfig, services: ChatServices) -> Self {
        let canned = if config.canned_responses {
            CannedResponses::builtin()
        } else {
            CannedResponses::empty()
        };

        Self {
            store: SessionStore::new(),
            services,
            prompt_builder: PromptBuilder::new(config.search.policy)
                .with_history_limit(config.history_limit),
            canned,
            search: config.search.clone(),
            date_shortcut: config.date_shortcut,
            stream: config.chat.stream,
            mode: RwLock::new(config.mode),
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Shares an existing store instead of starting empty.
    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_canned_responses(mut self, canned: CannedResponses) -> Self {
        self.canned = canned;
        self
    }

    /// Overrides the source of "today" used by prompts and the date shortcut.
    pub fn with_clock<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Arc::new(today);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    // ============================================================================
    // Modes and conversations
    // ============================================================================

    pub async fn mode(&self) -> GenerationMode {
        *self.mode.read().await
    }

    pub async fn set_mode(&self, mode: GenerationMode) {
        tracing::info!("[ChatUseCase] Mode set to {}", mode);
        *self.mode.write().await = mode;
    }

    /// Detaches the active conversation; the next message starts a new one.
    pub async fn new_conversation(&self) {
        self.store.clear_active().await;
    }

    /// Lists conversations in creation order.
    pub async fn conversations(&self) -> Vec<ConversationSummary> {
        self.store.list().await
    }

    /// Makes a conversation active and returns it.
    pub async fn open_conversation(&self, id: &str) -> Result<Conversation> {
        self.store.set_active(id).await?;
        self.store
            .get(id)
            .await
            .ok_or_else(|| HextError::not_found("conversation", id))
    }

    pub async fn active_conversation(&self) -> Option<Conversation> {
        self.store.active().await
    }

    // ============================================================================
    // Turns
    // ============================================================================

    /// Handles a prompt according to the current generation mode.
    pub async fn submit(&self, text: &str, sink: Option<&DeltaSink>) -> Result<TurnOutcome> {
        match self.mode().await {
            GenerationMode::Text => self.send_message(text, sink).await,
            GenerationMode::Image => self.generate_image(text).await,
        }
    }

    /// Runs a text turn.
    ///
    /// When `sink` is given the reply text is also sent through it: as it
    /// streams from the model when streaming is enabled, otherwise in one
    /// piece.
    pub async fn send_message(&self, text: &str, sink: Option<&DeltaSink>) -> Result<TurnOutcome> {
        let text = text.trim();
        let id = self.store.ensure_active(text).await;
        self.store.append(&id, Message::user(text)).await?;

        if let Some((reply, route)) = self.local_reply(text) {
            tracing::debug!("[ChatUseCase] Answered locally ({:?})", route);
            deliver(sink, &reply);
            return self.finish(id, Message::assistant(reply), route, None).await;
        }

        let history = self.store.history(&id).await?;
        let today = (self.today)();

        match self.answer(&history, text, today, sink).await {
            Ok(answer) => {
                let reply = Message::assistant(answer.text).with_sources(answer.sources);
                self.finish(id, reply, answer.route, None).await
            }
            Err(err) => {
                tracing::warn!("[ChatUseCase] Turn failed: {}", err);
                let reply = err.user_message();
                deliver(sink, &reply);
                self.finish(id, Message::assistant(reply), TurnRoute::Model, Some(err))
                    .await
            }
        }
    }

    /// Runs an image-generation turn with `prompt`.
    pub async fn generate_image(&self, prompt: &str) -> Result<TurnOutcome> {
        let prompt = prompt.trim();
        let id = self.store.ensure_active(prompt).await;
        self.store.append(&id, Message::user(prompt)).await?;

        tracing::info!(
            "[ChatUseCase] Generating image with {}",
            self.services.image_generator.name()
        );

        match self.services.image_generator.generate(prompt).await {
            Ok(bytes) => {
                let reply = Message::assistant(IMAGE_READY_REPLY).with_image(bytes);
                self.finish(id, reply, TurnRoute::ImageGeneration, None).await
            }
            Err(err) => {
                tracing::warn!("[ChatUseCase] Image generation failed: {}", err);
                let reply = Message::assistant(format!("❌ Error al generar la imagen: {err}"));
                self.finish(id, reply, TurnRoute::ImageGeneration, Some(err))
                    .await
            }
        }
    }

    /// Runs an image-upload turn.
    ///
    /// The image is captioned. Without a question the caption is the reply;
    /// with one, the caption and the question go to the chat model.
    pub async fn describe_image(
        &self,
        image: Vec<u8>,
        mime_type: &str,
        question: Option<&str>,
        sink: Option<&DeltaSink>,
    ) -> Result<TurnOutcome> {
        let question = question.map(str::trim).filter(|q| !q.is_empty());

        let id = match self.store.active_id().await {
            Some(id) => id,
            None => {
                let conversation = match question {
                    Some(q) => Conversation::from_first_prompt(q),
                    None => Conversation::named(IMAGE_CONVERSATION_NAME),
                };
                self.store.create_conversation(conversation).await
            }
        };

        let user_message =
            Message::user(question.unwrap_or(IMAGE_WITHOUT_TEXT)).with_image(image.clone());
        self.store.append(&id, user_message).await?;

        match self.caption_and_answer(&id, &image, mime_type, question, sink).await {
            Ok(text) => {
                let reply = Message::assistant(text);
                self.finish(id, reply, TurnRoute::ImageDescription, None).await
            }
            Err(err) => {
                tracing::warn!("[ChatUseCase] Image description failed: {}", err);
                let text = format!("❌ Error al procesar la imagen: {err}");
                deliver(sink, &text);
                self.finish(id, Message::assistant(text), TurnRoute::ImageDescription, Some(err))
                    .await
            }
        }
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn local_reply(&self, text: &str) -> Option<(String, TurnRoute)> {
        if let Some(reply) = self.canned.respond(text) {
            return Some((reply, TurnRoute::Canned));
        }
        if self.date_shortcut {
            return date_reply(text, (self.today)()).map(|reply| (reply, TurnRoute::DateShortcut));
        }
        None
    }

    async fn answer(
        &self,
        history: &[Message],
        text: &str,
        today: NaiveDate,
        sink: Option<&DeltaSink>,
    ) -> Result<Answer> {
        if self.search.searches_upfront(text) {
            let results = self.run_search(text).await;
            let messages = self
                .prompt_builder
                .build_with_search(history, &results, today)?;
            let reply = self.final_pass(messages, sink).await?;
            return Ok(Answer {
                text: reply,
                sources: results.sources,
                route: TurnRoute::ModelWithSearch,
            });
        }

        let messages = self.prompt_builder.build(history, today)?;

        if self.prompt_builder.search_policy() != SearchPolicy::ModelDecided {
            let reply = self.final_pass(messages, sink).await?;
            return Ok(Answer {
                text: reply,
                sources: Vec::new(),
                route: TurnRoute::Model,
            });
        }

        // The first pass may be nothing but a search command, so it is never
        // streamed.
        let first = self
            .services
            .chat
            .complete(&ChatRequest::new(messages))
            .await?;

        let Some(command) = trigger::find(&first) else {
            let reply = visible_reply(&first);
            deliver(sink, &reply);
            return Ok(Answer {
                text: reply,
                sources: Vec::new(),
                route: TurnRoute::Model,
            });
        };

        tracing::info!("[ChatUseCase] Model requested a search: {}", command.term);
        let results = self.run_search(&command.term).await;
        let messages = self
            .prompt_builder
            .build_with_search(history, &results, today)?;
        let reply = self.final_pass(messages, sink).await?;

        Ok(Answer {
            text: reply,
            sources: results.sources,
            route: TurnRoute::ModelWithSearch,
        })
    }

    /// Searches once. A failed search becomes a context that says so.
    async fn run_search(&self, query: &str) -> SearchResults {
        match self
            .services
            .search
            .search(query, self.search.max_results)
            .await
        {
            Ok(hits) => {
                tracing::debug!("[ChatUseCase] {} search hit(s) for '{}'", hits.len(), query);
                SearchResults::from_hits(query, hits)
            }
            Err(err) => {
                tracing::warn!("[ChatUseCase] Search for '{}' failed: {}", query, err);
                SearchResults::failed(query)
            }
        }
    }

    /// The model call whose reply is shown to the user.
    ///
    /// Returns the reply without search commands; only that text reaches the
    /// sink.
    async fn final_pass(&self, messages: Vec<ChatMessage>, sink: Option<&DeltaSink>) -> Result<String> {
        let request = ChatRequest::new(messages);

        let Some(sink) = sink.filter(|_| self.stream) else {
            let raw = self.services.chat.complete(&request).await?;
            let reply = visible_reply(&raw);
            deliver(sink, &reply);
            return Ok(reply);
        };

        let mut deltas = self.services.chat.stream(&request).await?;
        let mut filter = MarkerFilter::new();
        let mut raw = String::new();
        let mut shown = false;
        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(delta) => {
                    raw.push_str(&delta);
                    shown |= send_visible(sink, filter.push(&delta));
                }
                Err(err) => {
                    if shown {
                        let _ = sink.send("\n".to_string());
                    }
                    return Err(err);
                }
            }
        }
        send_visible(sink, filter.finish());

        let reply = trigger::strip(&raw);
        if reply.is_empty() {
            tracing::warn!("[ChatUseCase] Model reply was empty after removing search commands");
            deliver(Some(sink), EMPTY_REPLY);
            return Ok(EMPTY_REPLY.to_string());
        }
        Ok(reply)
    }

    async fn caption_and_answer(
        &self,
        id: &str,
        image: &[u8],
        mime_type: &str,
        question: Option<&str>,
        sink: Option<&DeltaSink>,
    ) -> Result<String> {
        tracing::info!(
            "[ChatUseCase] Captioning image ({} bytes) with {}",
            image.len(),
            self.services.captioner.name()
        );
        let caption = self.services.captioner.caption(image, mime_type).await?;

        let Some(question) = question else {
            deliver(sink, &caption);
            return Ok(caption);
        };

        let history = self.store.history(id).await?;
        let messages =
            self.prompt_builder
                .build_with_image(&history, &caption, question, (self.today)())?;
        self.final_pass(messages, sink).await
    }

    async fn finish(
        &self,
        conversation_id: String,
        reply: Message,
        route: TurnRoute,
        error: Option<HextError>,
    ) -> Result<TurnOutcome> {
        self.store.append(&conversation_id, reply.clone()).await?;
        Ok(TurnOutcome {
            conversation_id,
            reply,
            route,
            error,
        })
    }
}

/// Model text with search commands removed, never empty.
fn visible_reply(raw: &str) -> String {
    let reply = trigger::strip(raw);
    if reply.is_empty() {
        tracing::warn!("[ChatUseCase] Model reply was empty after removing search commands");
        EMPTY_REPLY.to_string()
    } else {
        reply
    }
}

/// Sends non-empty text; reports whether it had anything besides whitespace.
fn send_visible(sink: &DeltaSink, text: String) -> bool {
    let visible = !text.trim().is_empty();
    if !text.is_empty() {
        let _ = sink.send(text);
    }
    visible
}

fn deliver(sink: Option<&DeltaSink>, text: &str) {
    if let Some(sink) = sink {
        let _ = sink.send(text.to_string());
    }
}
