//! Comms — the chat front-ends.
//!
//! # Architecture
//!
//! Each channel (console, Telegram) implements [`Channel`] and is spawned as
//! an independent task by [`start`] via [`spawn_channels`]. Channels capture
//! their shared [`Arc<CommsState>`] at construction time; the generic
//! `Channel::run` signature only carries the shutdown token.
//!
//! Any channel error cancels the shared [`CancellationToken`] so siblings
//! stop cooperatively.

pub mod command;
#[cfg(feature = "channel-pty")]
pub mod pty;
mod state;
#[cfg(feature = "channel-telegram")]
pub mod telegram;

pub use command::ChatCommand;
pub use state::{CommsState, Reply};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppError;

// ── Channel ───────────────────────────────────────────────────────────────────

/// A boxed, owned future returned by [`Channel::run`].
pub type ChannelFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A concurrently-runnable chat front-end.
///
/// [`Channel::run`] is called once and should run until `shutdown` is
/// cancelled or the channel's input ends.
pub trait Channel: Send + 'static {
    /// Stable identifier used in log messages and session keys.
    fn id(&self) -> &str;

    /// Consume the channel and return its run loop as a boxed future.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture;
}

// ── CommsHandle ───────────────────────────────────────────────────────────────

/// Handle to the running channel set. Await [`join`](Self::join) to block
/// until every channel has exited.
pub struct CommsHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl CommsHandle {
    /// Await all channels and return the first error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("comms task panicked: {e}"))),
        }
    }
}

/// Spawn each channel as its own Tokio task.
///
/// - If any channel returns `Err` or panics, `shutdown` is cancelled.
/// - The manager task drains the remaining channels and returns the first
///   error encountered.
pub fn spawn_channels(channels: Vec<Box<dyn Channel>>, shutdown: CancellationToken) -> CommsHandle {
    let handle = tokio::spawn(async move {
        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();

        for channel in channels {
            debug!(channel = %channel.id(), "spawning channel");
            set.spawn(channel.run(shutdown.clone()));
        }

        let mut first_err: Option<AppError> = None;

        while let Some(res) = set.join_next().await {
            match res {
                Err(e) => {
                    error!("channel panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| AppError::Comms(format!("channel panicked: {e}")));
                }
                Ok(Err(e)) => {
                    error!("channel error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                Ok(Ok(())) => {}
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    });

    CommsHandle { inner: handle }
}

// ── start ─────────────────────────────────────────────────────────────────────

/// Build the configured channels around `state` and spawn them.
///
/// Synchronous: returns as soon as the tasks are spawned.
pub fn start(config: &Config, state: Arc<CommsState>, shutdown: CancellationToken) -> CommsHandle {
    let mut channels: Vec<Box<dyn Channel>> = Vec::new();

    #[cfg(feature = "channel-pty")]
    {
        if config.comms_pty_should_load() {
            info!("loading pty channel");
            channels.push(Box::new(pty::PtyChannel::new("pty0", state.clone())));
        }
    }

    #[cfg(feature = "channel-telegram")]
    {
        if config.comms_telegram_should_load() {
            info!("loading telegram channel");
            let token = config.telegram_token.clone().unwrap_or_default();
            channels.push(Box::new(telegram::TelegramChannel::new("telegram0", token, state.clone())));
        }
    }

    if channels.is_empty() {
        warn!("no comms channels configured");
    }
    drop(state);

    spawn_channels(channels, shutdown)
}
