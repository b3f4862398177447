//! Domain layer of the HEX assistant.
//!
//! Holds everything that does not talk to the network or the filesystem:
//! the session store, prompt construction, the search command protocol,
//! local shortcuts (greetings and today's date) and the interfaces to the
//! external services.

pub mod agent;
pub mod canned;
pub mod config;
pub mod date;
pub mod error;
pub mod prompt;
pub mod search;
pub mod session;

// Re-export common error type
pub use error::{HextError, Result};
