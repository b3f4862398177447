//! Prompt construction.
//!
//! Templates are embedded at compile time and rendered with MiniJinja. The
//! builder prepends the persona system prompt to the conversation history
//! and, when needed, rewrites the last user turn to carry search results or
//! an image caption.

use crate::agent::ChatMessage;
use crate::error::Result;
use crate::search::{SearchPolicy, SearchResults};
use crate::session::{Message, MessageRole};
use chrono::NaiveDate;
use minijinja::{Environment, context};
use once_cell::sync::Lazy;

const TEMPLATES: &[(&str, &str)] = &[
    ("persona", include_str!("../../prompts/persona.jinja")),
    (
        "search_context",
        include_str!("../../prompts/search_context.jinja"),
    ),
    (
        "image_context",
        include_str!("../../prompts/image_context.jinja"),
    ),
];

static ENV: Lazy<Environment<'static>> = Lazy::new(build_environment);

fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("[PromptBuilder] Failed to register template {}: {}", name, e);
        }
    }

    env
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    let rendered = ENV.get_template(name)?.render(ctx)?;
    Ok(rendered.trim().to_string())
}

/// Builds the message list sent to the chat model.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    search_policy: SearchPolicy,
    history_limit: Option<usize>,
}

impl PromptBuilder {
    pub fn new(search_policy: SearchPolicy) -> Self {
        Self {
            search_policy,
            history_limit: None,
        }
    }

    /// Forwards at most `limit` earlier messages to the model.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn search_policy(&self) -> SearchPolicy {
        self.search_policy
    }

    /// Renders the persona instructions.
    pub fn system_prompt(&self, today: NaiveDate) -> Result<String> {
        self.persona(today, self.search_policy == SearchPolicy::ModelDecided)
    }

    /// Persona for a call that must answer directly: the search command is
    /// never offered, even under [`SearchPolicy::ModelDecided`].
    pub fn final_system_prompt(&self, today: NaiveDate) -> Result<String> {
        self.persona(today, false)
    }

    fn persona(&self, today: NaiveDate, offer_search_command: bool) -> Result<String> {
        render(
            "persona",
            context! {
                model_decided_search => offer_search_command,
                search_enabled => self.search_policy != SearchPolicy::Never,
                today => today.format("%Y-%m-%d").to_string(),
            },
        )
    }

    /// Persona prompt followed by the conversation, ending with the latest
    /// user message.
    pub fn build(&self, history: &[Message], today: NaiveDate) -> Result<Vec<ChatMessage>> {
        self.with_system(self.system_prompt(today)?, history)
    }

    fn with_system(&self, system: String, history: &[Message]) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system));

        let (earlier, last) = match history.split_last() {
            Some((last, earlier)) => (earlier, Some(last)),
            None => (history, None),
        };

        let skip = self
            .history_limit
            .map(|limit| earlier.len().saturating_sub(limit))
            .unwrap_or(0);

        messages.extend(earlier[skip..].iter().chain(last).map(to_chat_message));
        Ok(messages)
    }

    /// Like [`build`](Self::build), with search results folded into the last
    /// user message. The persona no longer offers the search command.
    pub fn build_with_search(
        &self,
        history: &[Message],
        results: &SearchResults,
        today: NaiveDate,
    ) -> Result<Vec<ChatMessage>> {
        let mut messages = self.with_system(self.final_system_prompt(today)?, history)?;
        if let Some(last) = last_user_mut(&mut messages) {
            last.content = render(
                "search_context",
                context! {
                    question => last.content.as_str(),
                    query => results.query.as_str(),
                    context => results.context.as_str(),
                    today => today.format("%Y-%m-%d").to_string(),
                },
            )?;
        }
        Ok(messages)
    }

    /// Like [`build`](Self::build), with the last user message replaced by a
    /// question about a captioned image. The persona no longer offers the
    /// search command.
    pub fn build_with_image(
        &self,
        history: &[Message],
        caption: &str,
        question: &str,
        today: NaiveDate,
    ) -> Result<Vec<ChatMessage>> {
        let mut messages = self.with_system(self.final_system_prompt(today)?, history)?;
        if let Some(last) = last_user_mut(&mut messages) {
            last.content = render(
                "image_context",
                context! {
                    caption => caption,
                    question => question,
                },
            )?;
        }
        Ok(messages)
    }
}

fn to_chat_message(message: &Message) -> ChatMessage {
    match message.role {
        MessageRole::User => ChatMessage::user(message.content.clone()),
        MessageRole::Assistant => ChatMessage::assistant(message.content.clone()),
    }
}

fn last_user_mut(messages: &mut [ChatMessage]) -> Option<&mut ChatMessage> {
    messages.iter_mut().rev().find(|m| m.role == "user")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SourceCitation;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn history() -> Vec<Message> {
        vec![
            Message::user("Hola, ¿quién eres?"),
            Message::assistant("Soy Tigre."),
            Message::user("¿Cuál es el clima en Managua?"),
        ]
    }

    #[test]
    fn test_build_prepends_persona() {
        let builder = PromptBuilder::new(SearchPolicy::ModelDecided);
        let messages = builder.build(&history(), today()).unwrap();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("Tigre"));
        assert!(messages[0].content.contains("[BUSCAR:"));
        assert!(messages[0].content.contains("2026-10-16"));
        assert_eq!(messages[3], ChatMessage::user("¿Cuál es el clima en Managua?"));
    }

    #[test]
    fn test_persona_without_search_mentions_no_internet() {
        let builder = PromptBuilder::new(SearchPolicy::Never);
        let prompt = builder.system_prompt(today()).unwrap();
        assert!(!prompt.contains("[BUSCAR:"));
        assert!(prompt.contains("No tienes acceso a internet"));
    }

    #[test]
    fn test_history_limit_keeps_latest_user_message() {
        let builder = PromptBuilder::new(SearchPolicy::Never).with_history_limit(Some(1));
        let messages = builder.build(&history(), today()).unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::assistant("Soy Tigre."));
        assert_eq!(messages[2].content, "¿Cuál es el clima en Managua?");
    }

    #[test]
    fn test_zero_history_limit_sends_only_current_turn() {
        let builder = PromptBuilder::new(SearchPolicy::Never).with_history_limit(Some(0));
        let messages = builder.build(&history(), today()).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_build_with_search_injects_sources() {
        let builder = PromptBuilder::new(SearchPolicy::ModelDecided);
        let results = SearchResults::from_hits(
            "clima actual en Managua",
            vec![SourceCitation::new("Managua: 31°C, soleado", "https://tiempo.example")],
        );

        let messages = builder
            .build_with_search(&history(), &results, today())
            .unwrap();
        let last = messages.last().unwrap();

        assert_eq!(last.role, "user");
        assert!(last.content.starts_with("¿Cuál es el clima en Managua?"));
        assert!(last.content.contains("Fuente 1: Managua: 31°C, soleado"));
        assert!(last.content.contains("clima actual en Managua"));
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_prompts_after_search_do_not_offer_the_command() {
        let builder = PromptBuilder::new(SearchPolicy::ModelDecided);
        let results = SearchResults::from_hits(
            "clima actual en Managua",
            vec![SourceCitation::new("Managua: 31°C", "https://tiempo.example")],
        );

        let with_search = builder
            .build_with_search(&history(), &results, today())
            .unwrap();
        let with_image = builder
            .build_with_image(&history(), "a tiger", "¿Qué animal es?", today())
            .unwrap();

        for messages in [&with_search, &with_image] {
            assert_eq!(messages[0].role, "system");
            assert!(!messages[0].content.contains("[BUSCAR:"));
            assert!(messages[0].content.contains("Tigre"));
        }
        assert!(builder.system_prompt(today()).unwrap().contains("[BUSCAR:"));
    }

    #[test]
    fn test_build_with_image_uses_caption() {
        let builder = PromptBuilder::new(SearchPolicy::Never);
        let history = vec![Message::user("¿Qué animal es?")];

        let messages = builder
            .build_with_image(&history, "a tiger lying on grass", "¿Qué animal es?", today())
            .unwrap();

        assert!(messages[1].content.contains("a tiger lying on grass"));
        assert!(messages[1].content.contains("¿Qué animal es?"));
    }

    #[test]
    fn test_empty_history_yields_only_system_prompt() {
        let builder = PromptBuilder::new(SearchPolicy::Never);
        let messages = builder.build(&[], today()).unwrap();
        assert_eq!(messages.len(), 1);
    }
}
