//! Display names for conversations.

/// Maximum number of characters kept from the first prompt.
pub const MAX_NAME_CHARS: usize = 30;

/// Name used when the first prompt has no usable text.
pub const DEFAULT_CONVERSATION_NAME: &str = "Nuevo chat";

/// Name for conversations opened by an image upload without text.
pub const IMAGE_CONVERSATION_NAME: &str = "Análisis de imagen";

/// Derives a short conversation name from the first user prompt.
///
/// Only the first line is used. Lines longer than [`MAX_NAME_CHARS`]
/// characters are cut and suffixed with `...`.
pub fn conversation_name(first_prompt: &str) -> String {
    let first_line = first_prompt.lines().next().unwrap_or("").trim_end();
    if first_line.trim().is_empty() {
        return DEFAULT_CONVERSATION_NAME.to_string();
    }

    if first_line.chars().count() > MAX_NAME_CHARS {
        let truncated: String = first_line.chars().take(MAX_NAME_CHARS).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}
