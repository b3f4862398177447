//! Web search support.
//!
//! - `model`: citations, prepared results and the search policy
//! - `trigger`: parsing of the `[BUSCAR: term]` command emitted by the model

pub mod model;
pub mod trigger;

pub use model::{
    NO_RESULTS_CONTEXT, SEARCH_FAILED_CONTEXT, SearchPolicy, SearchResults, SourceCitation,
};
pub use trigger::{MarkerFilter, SearchCommand};
