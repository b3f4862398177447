//! Search domain models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Context passed to the model when a search returned nothing.
pub const NO_RESULTS_CONTEXT: &str = "No se encontraron resultados relevantes.";

/// Context passed to the model when the search itself failed.
pub const SEARCH_FAILED_CONTEXT: &str = "Ocurrió un error al intentar buscar en la web.";

/// A snippet returned by the search provider and the page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub snippet: String,
    pub url: String,
}

impl SourceCitation {
    pub fn new(snippet: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            url: url.into(),
        }
    }
}

/// Search output prepared for prompt injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// The query that produced these results
    pub query: String,
    /// Numbered snippets (`Fuente 1: ...`) separated by blank lines
    pub context: String,
    /// Citations to attach to the assistant message
    pub sources: Vec<SourceCitation>,
}

impl SearchResults {
    /// Builds the prompt context from provider hits.
    pub fn from_hits(query: impl Into<String>, hits: Vec<SourceCitation>) -> Self {
        let query = query.into();
        if hits.is_empty() {
            return Self {
                query,
                context: NO_RESULTS_CONTEXT.to_string(),
                sources: Vec::new(),
            };
        }

        let context = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("Fuente {}: {}", i + 1, hit.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            query,
            context,
            sources: hits,
        }
    }

    /// Results standing in for a search that could not be performed.
    pub fn failed(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: SEARCH_FAILED_CONTEXT.to_string(),
            sources: Vec::new(),
        }
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// When a turn consults the web before answering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchPolicy {
    /// The model asks for a search by answering with `[BUSCAR: term]`
    #[default]
    ModelDecided,
    /// Search with the user's text when it contains a configured keyword
    Keywords,
    /// Search with the user's text on every turn
    Always,
    /// Never search
    Never,
}
