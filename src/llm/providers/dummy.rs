//! Dummy LLM provider — no network.
//!
//! Plays back a scripted queue of assistant messages; once the queue is
//! empty it echoes the last user message prefixed with `[echo]`. Every
//! request is recorded so callers can inspect what would have been sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::llm::{ChatMessage, LlmResponse, ProviderError, Role, ToolDefinition};

/// A request as the dummy saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    script: VecDeque<Result<ChatMessage, String>>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    inner: Arc<Mutex<Inner>>,
}

impl DummyProvider {
    /// Provider that answers with `replies` in order, then echoes.
    pub fn scripted(replies: impl IntoIterator<Item = ChatMessage>) -> Self {
        let p = Self::default();
        p.lock().script.extend(replies.into_iter().map(Ok));
        p
    }

    /// Queue a reply at the end of the script.
    pub fn push_reply(&self, reply: ChatMessage) {
        self.lock().script.push_back(Ok(reply));
    }

    /// Queue a request failure at the end of the script.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().script.push_back(Err(message.into()));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, ProviderError> {
        let mut inner = self.lock();
        inner.requests.push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });

        let message = match inner.script.pop_front() {
            Some(Ok(reply)) => reply,
            Some(Err(e)) => return Err(ProviderError::Request(e)),
            None => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .and_then(|m| m.content.as_deref())
                    .unwrap_or_default();
                ChatMessage::assistant(format!("[echo] {last_user}"))
            }
        };

        Ok(LlmResponse { message, usage: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolCall;

    #[tokio::test]
    async fn echoes_last_user_message() {
        let p = DummyProvider::default();
        let msgs = [ChatMessage::system("sys"), ChatMessage::user("hello")];
        let r = p.chat(&msgs, &[]).await.unwrap();
        assert_eq!(r.message.content.as_deref(), Some("[echo] hello"));
    }

    #[tokio::test]
    async fn echo_without_user_message() {
        let p = DummyProvider::default();
        let r = p.chat(&[], &[]).await.unwrap();
        assert_eq!(r.message.content.as_deref(), Some("[echo] "));
    }

    #[tokio::test]
    async fn script_plays_in_order_then_echoes() {
        let p = DummyProvider::scripted([
            ChatMessage::assistant_tool_calls(None, vec![ToolCall::function("c1", "get_tree_view", "{}")]),
            ChatMessage::assistant("done"),
        ]);
        let msgs = [ChatMessage::user("go")];
        assert_eq!(p.chat(&msgs, &[]).await.unwrap().message.tool_calls.len(), 1);
        assert_eq!(p.chat(&msgs, &[]).await.unwrap().message.content.as_deref(), Some("done"));
        assert_eq!(p.chat(&msgs, &[]).await.unwrap().message.content.as_deref(), Some("[echo] go"));
        assert_eq!(p.requests().len(), 3);
    }

    #[tokio::test]
    async fn scripted_failure_is_returned() {
        let p = DummyProvider::default();
        p.push_failure("rate limited");
        let err = p.chat(&[ChatMessage::user("x")], &[]).await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let p = DummyProvider::default();
        let clone = p.clone();
        clone.push_reply(ChatMessage::assistant("from clone"));
        let r = p.chat(&[], &[]).await.unwrap();
        assert_eq!(r.message.content.as_deref(), Some("from clone"));
        assert_eq!(clone.requests().len(), 1);
    }
}
