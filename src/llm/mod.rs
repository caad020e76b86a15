//! Generative-text service adapter
//!
//! One concrete client (Gemini) behind a small surface: `complete` for
//! callers that want typed errors, `ask` for flow code that wants the
//! never-failing `(success, message)` shape.

pub mod error;
pub mod gemini;

pub use error::LlmError;
pub use gemini::GeminiClient;
