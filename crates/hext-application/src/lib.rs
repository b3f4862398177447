//! Application layer for HEX.
//!
//! Coordinates the domain (`hext-core`) with the filesystem
//! (`hext-infrastructure`) and the external services (`hext-interaction`).

pub mod bootstrap;
pub mod chat_usecase;

pub use bootstrap::{AppContext, BootstrapOptions, bootstrap};
pub use chat_usecase::{
    ChatServices, ChatUseCase, DeltaSink, EMPTY_REPLY, IMAGE_READY_REPLY, IMAGE_WITHOUT_TEXT,
    TurnOutcome, TurnRoute,
};
