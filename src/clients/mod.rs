//! AI client implementations, one per cargo feature

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "claude")]
pub mod claude;

#[cfg(feature = "openai")]
pub use openai::ChatGpt;
#[cfg(feature = "gemini")]
pub use gemini::Gemini;
#[cfg(feature = "claude")]
pub use claude::Claude;
