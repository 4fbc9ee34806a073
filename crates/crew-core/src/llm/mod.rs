//! LLM client and conversation types
//!
//! Gemini is the only wire format; everything above this module speaks the
//! provider-neutral types in [`types`].

mod client;
mod gemini;
mod types;

pub use client::{DEFAULT_BASE_URL, GeminiClient, LlmClient};
pub use types::*;
