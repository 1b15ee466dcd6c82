pub mod groq;

pub use groq::{GroqClient, LlmSettings, UpstreamCallError};
