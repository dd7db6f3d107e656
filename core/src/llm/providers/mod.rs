//! Generate endpoint providers

pub mod ollama;

pub use ollama::OllamaClient;
