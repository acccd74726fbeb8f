//! Telegram channel — long-polls the Bot API, hands text messages to
//! [`CommsState::handle`], and sends the reply back to the chat.
//!
//! Every chat is its own conversation (`telegram0:<chat id>`). Titled and
//! preformatted replies are sent as HTML; plain replies as plain text.

use std::sync::Arc;
use std::time::Duration;

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::command::ChatCommand;
use super::state::{CommsState, Reply};
use super::{Channel, ChannelFuture};
use crate::error::AppError;

/// Telegram has a 4096 character limit per message.
/// We chunk at 4000 to be safe.
const MAX_MESSAGE_LENGTH: usize = 4000;

/// Telegram shows a chat action for about five seconds.
const TYPING_REFRESH: Duration = Duration::from_secs(4);

pub struct TelegramChannel {
    channel_id: String,
    token: String,
    state: Arc<CommsState>,
}

impl TelegramChannel {
    pub fn new(channel_id: impl Into<String>, token: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self { channel_id: channel_id.into(), token: token.into(), state }
    }
}

impl Channel for TelegramChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture {
        Box::pin(run_telegram(self.channel_id, self.token, self.state, shutdown))
    }
}

async fn run_telegram(
    channel_id: String,
    token: String,
    state: Arc<CommsState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    if token.trim().is_empty() {
        return Err(AppError::Comms("TELEGRAM_BOT_TOKEN not set".into()));
    }

    info!(%channel_id, "telegram channel starting");
    let bot = Bot::new(token);

    let handler_channel_id = channel_id.clone();
    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let state = state.clone();
        let channel_id = handler_channel_id.clone();
        async move {
            if let Some(text) = msg.text() {
                handle_text(&bot, &msg, &state, &channel_id, text).await;
            }
            respond(())
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler).build();

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received — closing telegram channel");
        }
        _ = dispatcher.dispatch() => {
            warn!(%channel_id, "telegram dispatcher exited unexpectedly");
        }
    }

    Ok(())
}

async fn handle_text(bot: &Bot, msg: &Message, state: &CommsState, channel_id: &str, text: &str) {
    let session_key = format!("{channel_id}:{}", msg.chat.id.0);
    let user_id = msg.from.as_ref().map(|u| u.id.0);
    let username = msg.from.as_ref().and_then(|u| u.username.clone());
    debug!(%channel_id, session = %session_key, ?user_id, ?username, "telegram received message");

    if ChatCommand::parse(text) == Some(ChatCommand::Start) {
        if let Some(user) = msg.from.as_ref() {
            info!(user_id = user.id.0, name = %user.full_name(), "user started the bot");
        }
    }

    // Keep the typing indicator alive until the reply is ready.
    let typing = CancellationToken::new();
    let typing_task = tokio::spawn({
        let bot = bot.clone();
        let chat_id = msg.chat.id;
        let typing = typing.clone();
        async move {
            loop {
                if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
                    debug!("typing indicator failed: {e}");
                }
                tokio::select! {
                    _ = typing.cancelled() => break,
                    _ = tokio::time::sleep(TYPING_REFRESH) => {}
                }
            }
        }
    });

    let reply = state.handle(channel_id, &session_key, text).await;
    typing.cancel();
    let _ = typing_task.await;

    for chunk in render(&reply) {
        let request = bot.send_message(msg.chat.id, chunk.text);
        let result = if chunk.html {
            request.parse_mode(ParseMode::Html).await
        } else {
            request.await
        };
        if let Err(e) = result {
            warn!(session = %session_key, "failed to send telegram reply: {e}");
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Outgoing {
    text: String,
    html: bool,
}

/// Split `reply` into Telegram-sized messages.
fn render(reply: &Reply) -> Vec<Outgoing> {
    match reply {
        Reply::Plain(text) => chunk(text, MAX_MESSAGE_LENGTH)
            .into_iter()
            .map(|text| Outgoing { text, html: false })
            .collect(),
        Reply::Code(text) => chunk(text, MAX_MESSAGE_LENGTH)
            .into_iter()
            .map(|c| Outgoing { text: format!("<pre>{}</pre>", escape_html(&c)), html: true })
            .collect(),
        Reply::Titled { title, body } => {
            let first_room = MAX_MESSAGE_LENGTH.saturating_sub(title.chars().count() + 2).max(1);
            let head: String = body.chars().take(first_room).collect();
            let rest: String = body.chars().skip(first_room).collect();

            let mut out = vec![Outgoing {
                text: format!("<b>{}</b>\n\n{}", escape_html(title), escape_html(&head)),
                html: true,
            }];
            out.extend(
                chunk(&rest, MAX_MESSAGE_LENGTH)
                    .into_iter()
                    .filter(|c| !c.is_empty())
                    .map(|c| Outgoing { text: escape_html(&c), html: true }),
            );
            out
        }
    }
}

/// Split on character boundaries into pieces of at most `max` chars.
/// Always returns at least one piece.
fn chunk(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(max.max(1)).map(|c| c.iter().collect()).collect()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
