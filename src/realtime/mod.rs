//! In-process broadcast relay keyed by channel name.
//!
//! Call channels keep a short backlog that is replayed to every new
//! subscriber, so an offer sent before the callee joins is still delivered.
//! Inbox channels do not: a ring for someone who is offline is dropped.

pub mod signal;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub use signal::{call_channel, user_channel, ChannelName, SignalMessage, SignalType};

const CHANNEL_CAPACITY: usize = 64;
const MAX_BACKLOG: usize = 32;

struct ChannelEntry {
    sender: broadcast::Sender<SignalMessage>,
    backlog: Vec<SignalMessage>,
}

impl ChannelEntry {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            backlog: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct Relay {
    channels: Mutex<HashMap<String, ChannelEntry>>,
}

impl Relay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns how many live subscribers received the message.
    pub fn publish(&self, channel: &str, message: SignalMessage) -> usize {
        let Ok(mut channels) = self.channels.lock() else {
            return 0;
        };

        if channel.starts_with("call:") {
            if message.kind == SignalType::End {
                let idle = channels.get_mut(channel).is_some_and(|entry| {
                    entry.backlog.clear();
                    entry.sender.receiver_count() == 0
                });
                if idle {
                    channels.remove(channel);
                    return 0;
                }
            } else {
                let entry = channels
                    .entry(channel.to_string())
                    .or_insert_with(ChannelEntry::new);
                if entry.backlog.len() >= MAX_BACKLOG {
                    entry.backlog.remove(0);
                }
                entry.backlog.push(message.clone());
            }
        }

        match channels.get(channel) {
            Some(entry) if entry.sender.receiver_count() > 0 => {
                entry.sender.send(message).unwrap_or(0)
            }
            _ => {
                debug!(channel, kind = ?message.kind, "relay_no_listener");
                0
            }
        }
    }

    pub fn subscribe(self: &Arc<Self>, channel: &str) -> Subscription {
        let (receiver, backlog) = {
            let mut channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());
            let entry = channels
                .entry(channel.to_string())
                .or_insert_with(ChannelEntry::new);
            (
                entry.sender.subscribe(),
                entry.backlog.clone(),
            )
        };

        Subscription {
            relay: Arc::clone(self),
            channel: channel.to_string(),
            receiver: Some(receiver),
            backlog: backlog.into_iter().collect(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn release(&self, channel: &str) {
        if let Ok(mut channels) = self.channels.lock() {
            let idle = channels
                .get(channel)
                .is_some_and(|e| e.sender.receiver_count() == 0);
            if idle {
                channels.remove(channel);
            }
        }
    }
}

/// A live listener on one channel. Dropping it unsubscribes.
pub struct Subscription {
    relay: Arc<Relay>,
    channel: String,
    receiver: Option<broadcast::Receiver<SignalMessage>>,
    backlog: std::collections::VecDeque<SignalMessage>,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub async fn recv(&mut self) -> Option<SignalMessage> {
        if let Some(message) = self.backlog.pop_front() {
            return Some(message);
        }
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(channel = %self.channel, skipped, "relay_subscriber_lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.receiver.take();
        self.relay.release(&self.channel);
    }
}
