//! Shared state for the comms channels.
//!
//! Channels receive an `Arc<CommsState>` and only talk to it through
//! [`CommsState::handle`]: commands are answered here, everything else goes
//! to the session's agent. Sessions and the agent context are private.

use tracing::{debug, info};

use crate::aas::workspace::AasWorkspace;
use crate::agent::AgentContext;
use crate::agent::sessions::SessionRegistry;

use super::command::{ChatCommand, HELP_TEXT, RESET_TEXT, UNKNOWN_TEXT, WELCOME_TEXT};

/// A reply, tagged by shape so each channel can render it natively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Plain(String),
    /// A headline followed by body text.
    Titled { title: String, body: String },
    /// Preformatted text (tree views).
    Code(String),
}

impl Reply {
    /// Rendering for channels without markup.
    pub fn to_plain_text(&self) -> String {
        match self {
            Reply::Plain(text) | Reply::Code(text) => text.clone(),
            Reply::Titled { title, body } => format!("{title}\n\n{body}"),
        }
    }
}

/// Shared state passed as `Arc<CommsState>` to every channel task.
pub struct CommsState {
    sessions: SessionRegistry,
    agent: AgentContext,
}

impl CommsState {
    pub fn new(agent: AgentContext) -> Self {
        Self { sessions: SessionRegistry::new(), agent }
    }

    /// Answer one inbound message from `channel_id` in conversation
    /// `session_key`.
    pub async fn handle(&self, channel_id: &str, session_key: &str, input: &str) -> Reply {
        let Some(command) = ChatCommand::parse(input) else {
            let session = self.sessions.get_or_create(session_key);
            let mut agent = session.lock().await;
            debug!(%channel_id, session = %session_key, "forwarding message to agent");
            let text = agent.process_message(&self.agent, input.trim()).await;
            return Reply::Plain(if text.trim().is_empty() { "(empty response)".to_string() } else { text });
        };

        debug!(%channel_id, session = %session_key, ?command, "command");
        match command {
            ChatCommand::Start => Reply::Plain(WELCOME_TEXT.to_string()),
            ChatCommand::Help => Reply::Plain(HELP_TEXT.to_string()),
            // Read-only commands never open a session.
            ChatCommand::State => {
                let summary = match self.sessions.get(session_key) {
                    Some(session) => session.lock().await.workspace().summary(),
                    None => AasWorkspace::new().summary(),
                };
                Reply::Titled { title: "Current State:".to_string(), body: summary.trim_end().to_string() }
            }
            ChatCommand::Tree => {
                let tree = match self.sessions.get(session_key) {
                    Some(session) => session.lock().await.workspace().tree_view(),
                    None => None,
                };
                match tree {
                    Some(tree) => Reply::Code(tree),
                    None => Reply::Plain("❌ No AAS available".to_string()),
                }
            }
            ChatCommand::Reset => {
                self.sessions.reset(session_key);
                info!(%channel_id, session = %session_key, "conversation reset");
                Reply::Plain(RESET_TEXT.to_string())
            }
            ChatCommand::Unknown(_) => Reply::Plain(UNKNOWN_TEXT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::llm::{ChatMessage, LlmProvider, ToolCall};
    use std::path::PathBuf;

    fn state(dummy: &DummyProvider) -> CommsState {
        CommsState::new(AgentContext {
            provider: LlmProvider::Dummy(dummy.clone()),
            prompts_dir: PathBuf::from("/nonexistent"),
            data_dir: PathBuf::from("/nonexistent"),
            history_cap: 20,
        })
    }

    fn create_motor() -> ChatMessage {
        ChatMessage::assistant_tool_calls(
            None,
            vec![ToolCall::function(
                "c1",
                "create_aas",
                r#"{"aas_id":"urn:aas:motor","id_short":"Motor","global_asset_id":"urn:asset:motor"}"#,
            )],
        )
    }

    #[tokio::test]
    async fn static_commands() {
        let s = state(&DummyProvider::default());
        assert_eq!(s.handle("pty0", "pty0", "/start").await, Reply::Plain(WELCOME_TEXT.into()));
        assert_eq!(s.handle("pty0", "pty0", "/help").await, Reply::Plain(HELP_TEXT.into()));
        assert_eq!(s.handle("pty0", "pty0", "/nope").await, Reply::Plain(UNKNOWN_TEXT.into()));
        assert_eq!(s.handle("pty0", "pty0", "/tree").await, Reply::Plain("❌ No AAS available".into()));
        assert_eq!(
            s.handle("pty0", "pty0", "/state").await,
            Reply::Titled { title: "Current State:".into(), body: "No AAS exists yet.".into() }
        );
        assert_eq!(s.sessions.len(), 0);
    }

    #[tokio::test]
    async fn text_goes_to_agent() {
        let s = state(&DummyProvider::default());
        assert_eq!(s.handle("pty0", "pty0", "  hello ").await, Reply::Plain("[echo] hello".into()));
        assert_eq!(s.sessions.len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_only_calling_session() {
        let dummy = DummyProvider::scripted([
            create_motor(),
            ChatMessage::assistant("done"),
            create_motor(),
            ChatMessage::assistant("done"),
        ]);
        let s = state(&dummy);
        s.handle("telegram0", "telegram0:1", "make a motor").await;
        s.handle("telegram0", "telegram0:2", "make a motor").await;

        assert_eq!(s.handle("telegram0", "telegram0:1", "/reset").await, Reply::Plain(RESET_TEXT.into()));
        assert_eq!(
            s.handle("telegram0", "telegram0:1", "/tree").await,
            Reply::Plain("❌ No AAS available".into())
        );
        assert!(matches!(s.handle("telegram0", "telegram0:2", "/tree").await, Reply::Code(t) if t.contains("ID Short: Motor")));
    }

    #[test]
    fn plain_text_rendering() {
        let r = Reply::Titled { title: "Current State:".into(), body: "No AAS exists yet.".into() };
        assert_eq!(r.to_plain_text(), "Current State:\n\nNo AAS exists yet.");
        assert_eq!(Reply::Code("x".into()).to_plain_text(), "x");
    }
}
