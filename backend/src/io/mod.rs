//! # IO Module
//!
//! Everything that talks to the outside world: the REST API served to the
//! frontend and the Gemini client used by the chat assistant.

pub mod gemini;
pub mod rest;

pub use gemini::{GeminiBackend, GeminiConfig};
pub use rest::*;
