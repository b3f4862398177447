//! Detection of the `[BUSCAR: term]` command in model output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal that opens a search command.
pub const MARKER_PREFIX: &str = "[BUSCAR:";

static COMMAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[BUSCAR:([^\[\]]*)\]").expect("search command regex is valid"));

static DANGLING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[BUSCAR:[^\]]*$").expect("dangling command regex is valid"));

/// A search requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCommand {
    /// Search term, trimmed of surrounding whitespace
    pub term: String,
}

/// Returns the first well-formed, non-empty search command in `text`.
pub fn find(text: &str) -> Option<SearchCommand> {
    COMMAND_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|term| !term.is_empty())
        .map(|term| SearchCommand {
            term: term.to_string(),
        })
}

/// Whether `text` carries any trace of the marker, well-formed or not.
pub fn contains_marker(text: &str) -> bool {
    text.contains(MARKER_PREFIX)
}

/// Removes every search command from `text`.
///
/// Well-formed commands are dropped in place; an unterminated `[BUSCAR:`
/// swallows the rest of the text.
pub fn strip(text: &str) -> String {
    let without_commands = COMMAND_RE.replace_all(text, "");
    let without_dangling = DANGLING_RE.replace(&without_commands, "");
    without_dangling.trim().to_string()
}

/// Removes search commands from streamed text as it arrives.
///
/// Text that might be the start of a command is held back until the command
/// closes (and is dropped) or turns out to be ordinary text.
#[derive(Debug, Default)]
pub struct MarkerFilter {
    pending: String,
}

impl MarkerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one delta and returns the text that is safe to show.
    pub fn push(&mut self, delta: &str) -> String {
        self.pending.push_str(delta);
        let mut visible = String::new();

        loop {
            let Some(start) = self.pending.find(MARKER_PREFIX) else {
                let keep = partial_marker_start(&self.pending);
                visible.push_str(&self.pending[..keep]);
                self.pending.drain(..keep);
                return visible;
            };

            visible.push_str(&self.pending[..start]);
            match self.pending[start..].find(']') {
                Some(end) => {
                    self.pending.drain(..start + end + 1);
                }
                None => {
                    self.pending.drain(..start);
                    return visible;
                }
            }
        }
    }

    /// Returns what is still held back. An unterminated command is dropped.
    pub fn finish(self) -> String {
        if self.pending.starts_with(MARKER_PREFIX) {
            String::new()
        } else {
            self.pending
        }
    }
}

/// Offset of a trailing `[` that could still grow into `[BUSCAR:`.
fn partial_marker_start(text: &str) -> usize {
    match text.rfind('[') {
        Some(i) if MARKER_PREFIX.starts_with(&text[i..]) => i,
        _ => text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_term() {
        let cmd = find("[BUSCAR: clima actual en Managua]").unwrap();
        assert_eq!(cmd.term, "clima actual en Managua");
    }

    #[test]
    fn test_finds_term_inside_text() {
        let cmd = find("Déjame revisar. [BUSCAR:precio del dólar hoy ] un momento").unwrap();
        assert_eq!(cmd.term, "precio del dólar hoy");
    }

    #[test]
    fn test_first_match_wins() {
        let cmd = find("[BUSCAR: uno] y luego [BUSCAR: dos]").unwrap();
        assert_eq!(cmd.term, "uno");
    }

    #[test]
    fn test_empty_term_is_skipped() {
        assert!(find("[BUSCAR:   ]").is_none());
        assert_eq!(find("[BUSCAR: ] [BUSCAR: noticias]").unwrap().term, "noticias");
    }

    #[test]
    fn test_missing_closing_bracket_is_not_a_command() {
        assert!(find("[BUSCAR: clima en León").is_none());
        assert!(contains_marker("[BUSCAR: clima en León"));
    }

    #[test]
    fn test_plain_text_has_no_command() {
        assert!(find("Hola, ¿en qué te ayudo?").is_none());
        assert!(!contains_marker("Hola"));
    }

    #[test]
    fn test_strip_removes_commands() {
        assert_eq!(strip("[BUSCAR: clima]"), "");
        assert_eq!(strip("Claro. [BUSCAR: clima] Ya vuelvo."), "Claro.  Ya vuelvo.");
    }

    #[test]
    fn test_strip_removes_dangling_fragment() {
        assert_eq!(strip("Te ayudo. [BUSCAR: clima en"), "Te ayudo.");
    }

    #[test]
    fn test_strip_leaves_plain_text() {
        assert_eq!(strip("  Hola  "), "Hola");
    }

    fn filtered(deltas: &[&str]) -> String {
        let mut filter = MarkerFilter::new();
        let mut shown: String = deltas.iter().map(|d| filter.push(d)).collect();
        shown.push_str(&filter.finish());
        shown
    }

    #[test]
    fn test_filter_drops_command_split_across_deltas() {
        assert_eq!(filtered(&["[BUS", "CAR: clima ", "Managua hoy]"]), "");
        assert_eq!(
            filtered(&["Un momento ", "[BUSCAR: cli", "ma] ya ", "vuelvo"]),
            "Un momento  ya vuelvo"
        );
    }

    #[test]
    fn test_filter_releases_brackets_that_are_not_commands() {
        assert_eq!(filtered(&["Usa [B", "ash] o [x]"]), "Usa [Bash] o [x]");
        assert_eq!(filtered(&["termina en [BUS"]), "termina en [BUS");
    }

    #[test]
    fn test_filter_drops_unterminated_command() {
        assert_eq!(filtered(&["Te ayudo. ", "[BUSCAR: clima en"]), "Te ayudo. ");
    }

    #[test]
    fn test_filter_holds_back_only_while_undecided() {
        let mut filter = MarkerFilter::new();
        assert_eq!(filter.push("Hola ["), "Hola ");
        assert_eq!(filter.push("1]"), "[1]");
    }
}
