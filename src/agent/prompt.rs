//! System prompt assembly.
//!
//! The agent prompt is loaded from a plain-text template under the prompts
//! directory (`aas_agent.md`), falling back to a built-in copy when the file
//! is missing or blank.
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SEPARATOR: &str = "\n\n";

/// File name of the agent template inside the prompts directory.
pub const AGENT_TEMPLATE: &str = "aas_agent.md";

/// Used when `aas_agent.md` is not on disk.
pub const FALLBACK_TEMPLATE: &str = "\
You are an intelligent assistant for managing Asset Administration Shells (AAS).

Current AAS State:
{{state}}

When users ask to do something, call the appropriate function. Be conversational and friendly.
If a request needs new identifiers (AAS ID, submodel ID), create them in URL form such as
https://example.com/aas/<descriptive-name> or https://example.com/submodels/<descriptive-name>.

Always confirm what you have done and give helpful feedback.";

/// Fluent builder that assembles a layered prompt from template files.
pub struct PromptBuilder {
    prompts_dir: PathBuf,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append the layer stored as `filename` in the prompts directory, or
    /// `fallback` when the file is missing or blank.
    pub fn layer_or(mut self, filename: &str, fallback: &str) -> Self {
        let path = self.prompts_dir.join(filename);
        let text = fs::read_to_string(&path)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                tracing::debug!("prompt: '{}' unavailable, using built-in template", path.display());
                fallback.to_string()
            });
        self.push(&text);
        self
    }

    fn push(&mut self, text: &str) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
    }

    /// Register a single `{{key}}` → `value` substitution.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Assemble all layers, join with blank lines, and apply variable substitution.
    pub fn build(self) -> String {
        let mut prompt = self.parts.join(SEPARATOR);
        for (k, v) in &self.vars {
            let placeholder = format!("{{{{{}}}}}", k);
            prompt = prompt.replace(&placeholder, v);
        }
        prompt
    }
}

/// The agent system prompt with the current workspace `state` filled in.
pub fn system_prompt(prompts_dir: impl AsRef<Path>, state: &str) -> String {
    PromptBuilder::new(prompts_dir.as_ref())
        .layer_or(AGENT_TEMPLATE, FALLBACK_TEMPLATE)
        .var("state", state.trim_end())
        .build()
}
