//! Terminal rendering of conversations.

use crate::commands::SLASH_COMMANDS;
use colored::Colorize;
use hext_core::search::SourceCitation;
use hext_core::session::{Conversation, ConversationSummary, Message, MessageRole};
use std::path::Path;

pub fn banner(mode: impl std::fmt::Display) {
    println!("{}", "=== HEX T 1.0 · Tigre ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Modo: {mode}. Escribe /ayuda para ver los comandos o 'salir' para terminar.")
            .bright_black()
    );
    println!();
}

pub fn help() {
    println!("{}", "Comandos:".bright_yellow());
    for (name, description) in SLASH_COMMANDS {
        println!("  {}  {}", format!("{name:<8}").bright_cyan(), description);
    }
    println!("  {}  Termina la sesión", format!("{:<8}", "salir").bright_cyan());
}

pub fn thinking() {
    println!("{}", "Pensando…".bright_black().italic());
}

pub fn info(text: &str) {
    println!("{}", text.yellow());
}

pub fn error(text: &str) {
    eprintln!("{}", text.red());
}

pub fn user_line(text: &str) {
    println!("{}", format!("> {text}").green());
}

pub fn assistant_delta(delta: &str) {
    print!("{}", delta.bright_blue());
}

pub fn assistant_text(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

pub fn sources(sources: &[SourceCitation]) {
    if sources.is_empty() {
        return;
    }
    println!("{}", "Fuentes:".bright_black());
    for (i, source) in sources.iter().enumerate() {
        let url = if source.url.is_empty() {
            String::new()
        } else {
            format!(" ({})", source.url)
        };
        println!("{}", format!("  [{}] {}{}", i + 1, source.snippet, url).bright_black());
    }
}

pub fn saved_image(path: &Path) {
    println!("{}", format!("🖼  Imagen guardada en {}", path.display()).bright_green());
}

/// Replays a conversation opened with `/abrir`.
pub fn conversation(conversation: &Conversation) {
    println!(
        "{}",
        format!("--- {} ---", conversation.name).bright_magenta()
    );
    for message in conversation.messages() {
        render_message(message);
    }
    println!();
}

fn render_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            user_line(&message.content);
            if message.has_image() {
                println!("{}", "  [imagen adjunta]".bright_black());
            }
        }
        MessageRole::Assistant => {
            assistant_text(&message.content);
            if message.has_image() {
                println!("{}", "  [imagen generada]".bright_black());
            }
            sources(&message.sources);
        }
    }
}

/// Conversations newest first; the numbers are what `/abrir` takes.
pub fn conversation_list(list: &[ConversationSummary], active_id: Option<&str>) {
    if list.is_empty() {
        info("Todavía no hay conversaciones.");
        return;
    }
    for (i, summary) in list.iter().rev().enumerate() {
        let marker = if Some(summary.id.as_str()) == active_id {
            "*"
        } else {
            " "
        };
        println!(
            "{} {} {}",
            marker.bright_green(),
            format!("[{}]", i + 1).bright_cyan(),
            format!("{} ({} mensajes)", summary.name, summary.message_count)
        );
    }
}

/// Maps a `/abrir` number back to a conversation id.
pub fn nth_newest(list: &[ConversationSummary], n: usize) -> Option<&ConversationSummary> {
    list.iter().rev().nth(n.checked_sub(1)?)
}
