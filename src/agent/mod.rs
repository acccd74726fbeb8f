//! The AAS agent: turns chat messages into workspace edits via LLM tool calls.
//!
//! One turn is at most two model calls. The first offers the tool set; if
//! the model asks for tools they are executed in order against the session's
//! workspace, and a second call (without tools) phrases the answer from the
//! results.

pub mod prompt;
pub mod sessions;
pub mod tools;

use std::collections::VecDeque;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::aas::AasWorkspace;
use crate::config::Config;
use crate::llm::{ChatMessage, LlmProvider, LlmResponse};

use tools::AasAction;

/// Shared, read-only inputs of every turn.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub provider: LlmProvider,
    pub prompts_dir: PathBuf,
    /// Directory `save_aas` / `load_aas` file names resolve in.
    pub data_dir: PathBuf,
    pub history_cap: usize,
}

impl AgentContext {
    pub fn from_config(config: &Config, provider: LlmProvider) -> Self {
        Self {
            provider,
            prompts_dir: config.agent.prompts_dir.clone(),
            data_dir: config.aas.data_dir.clone(),
            history_cap: config.agent.history_cap,
        }
    }
}

/// Per-conversation agent state.
#[derive(Debug, Default)]
pub struct AasAgent {
    workspace: AasWorkspace,
    /// User and assistant text turns, oldest first.
    history: VecDeque<ChatMessage>,
}

impl AasAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace(&self) -> &AasWorkspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut AasWorkspace {
        &mut self.workspace
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }

    fn remember(&mut self, message: ChatMessage, cap: usize) {
        self.history.push_back(message);
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }

    /// Handle one user message and return the reply text.
    ///
    /// Never fails: provider and tool errors become reply text.
    pub async fn process_message(&mut self, ctx: &AgentContext, text: &str) -> String {
        self.remember(ChatMessage::user(text), ctx.history_cap);

        let system = prompt::system_prompt(&ctx.prompts_dir, &self.workspace.summary());
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(self.history.iter().cloned());

        let first = match ctx.provider.chat(&messages, &tools::definitions()).await {
            Ok(r) => r,
            Err(e) => {
                warn!(provider = ctx.provider.name(), error = %e, "llm call failed");
                return format!("❌ Error processing message: {e}");
            }
        };
        log_usage(&first);

        let reply = first.message;
        let answer = if reply.tool_calls.is_empty() {
            reply.text_content().unwrap_or("(empty response)").to_string()
        } else {
            let results: Vec<(String, String)> = reply
                .tool_calls
                .iter()
                .map(|call| {
                    let name = call.function.name.as_str();
                    let result = match AasAction::from_call(name, &call.function.arguments) {
                        Ok(action) => tools::execute(&mut self.workspace, &action, &ctx.data_dir),
                        Err(e) => format!("❌ {e}"),
                    };
                    info!(tool = name, ok = !result.starts_with('❌'), "tool call handled");
                    (call.id.clone(), result)
                })
                .collect();

            messages.push(ChatMessage::assistant_tool_calls(reply.content.clone(), reply.tool_calls.clone()));
            messages.extend(results.iter().map(|(id, r)| ChatMessage::tool_result(id, r)));

            match ctx.provider.chat(&messages, &[]).await {
                Ok(second) => {
                    log_usage(&second);
                    match second.message.text_content() {
                        Some(t) => t.to_string(),
                        None => joined(&results),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "follow-up llm call failed; replying with tool results");
                    joined(&results)
                }
            }
        };

        self.remember(ChatMessage::assistant(answer.clone()), ctx.history_cap);
        answer
    }
}

fn joined(results: &[(String, String)]) -> String {
    results.iter().map(|(_, r)| r.as_str()).collect::<Vec<_>>().join("\n")
}

fn log_usage(response: &LlmResponse) {
    if let Some(u) = response.usage {
        debug!(
            input_tokens = u.input_tokens,
            output_tokens = u.output_tokens,
            cached_input_tokens = u.cached_input_tokens,
            "llm usage"
        );
    }
}
