//! Generate request payload and its builder

use crate::config::{ModelOptions, OutputFormat, StepConfig};
use serde::Serialize;

/// Wire payload for `POST {base}/generate`
///
/// Only built through [`RequestBuilder`]; streaming and raw mode are always off.
/// Without a schema the `format` key is left out of the body entirely rather
/// than sent as `""`; the endpoint treats both as free-text output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    model: String,
    options: ModelOptions,
    prompt: String,
    stream: bool,
    system: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
    raw: bool,
}

impl GenerationRequest {
    /// Start building a request for the given model
    pub fn builder(model: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn format(&self) -> Option<&OutputFormat> {
        self.format.as_ref()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

/// Builder for [`GenerationRequest`]
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
    options: ModelOptions,
    prompt: String,
    system: String,
    format: Option<OutputFormat>,
}

impl RequestBuilder {
    /// Create a builder with default options and empty texts
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            options: ModelOptions::default(),
            prompt: String::new(),
            system: String::new(),
            format: None,
        }
    }

    /// Seed a builder from a loaded step folder
    pub fn from_step(config: &StepConfig) -> Self {
        Self {
            model: config.model.clone(),
            options: config.options.clone(),
            prompt: String::new(),
            system: config.system.clone(),
            format: config.format.clone(),
        }
    }

    /// Set sampling options
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the user prompt
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Set or clear the structured-output schema
    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        self.format = format.filter(|f| !f.is_empty());
        self
    }

    pub fn build(self) -> GenerationRequest {
        GenerationRequest {
            model: self.model,
            options: self.options,
            prompt: self.prompt,
            stream: false,
            system: self.system,
            format: self.format,
            raw: false,
        }
    }
}
