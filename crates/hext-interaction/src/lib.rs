//! HTTP implementations of the `hext_core::agent` traits.

pub mod duckduckgo_search;
pub mod hf_caption_agent;
pub mod hf_chat_agent;
pub mod hf_image_agent;
pub mod http;
pub mod sse;

pub use duckduckgo_search::DuckDuckGoSearch;
pub use hf_caption_agent::HfCaptionAgent;
pub use hf_chat_agent::HfChatAgent;
pub use hf_image_agent::HfImageAgent;
pub use http::build_client;
