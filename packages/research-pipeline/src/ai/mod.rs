//! Generative backend implementations and output-schema helpers.

pub mod schema;

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAI;
