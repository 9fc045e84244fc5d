use async_trait::async_trait;
use std::sync::Arc;

use super::CallError;
use crate::realtime::{call_channel, Relay, SignalMessage, Subscription};

#[async_trait]
pub trait SignalingChannel: Send {
    async fn send(&mut self, message: SignalMessage) -> Result<(), CallError>;
    async fn recv(&mut self) -> Option<SignalMessage>;
}

pub struct RelaySignaling {
    relay: Arc<Relay>,
    channel: String,
    user_id: String,
    subscription: Subscription,
}

impl RelaySignaling {
    pub fn join(relay: &Arc<Relay>, call_id: &str, user_id: &str) -> Self {
        let channel = call_channel(call_id);
        let subscription = relay.subscribe(&channel);
        Self {
            relay: Arc::clone(relay),
            channel,
            user_id: user_id.to_string(),
            subscription,
        }
    }
}

#[async_trait]
impl SignalingChannel for RelaySignaling {
    async fn send(&mut self, mut message: SignalMessage) -> Result<(), CallError> {
        message.from = self.user_id.clone();
        self.relay.publish(&self.channel, message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<SignalMessage> {
        loop {
            let message = self.subscription.recv().await?;
            if message.from != self.user_id {
                return Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::SignalType;
    use serde_json::Value;

    #[tokio::test]
    async fn own_messages_are_not_echoed() {
        let relay = Relay::new();
        let mut alice = RelaySignaling::join(&relay, "c-1", "alice");
        let mut bob = RelaySignaling::join(&relay, "c-1", "bob");

        alice
            .send(SignalMessage::new("c-1", SignalType::Offer, "ignored", Value::Null))
            .await
            .unwrap();
        bob.send(SignalMessage::new("c-1", SignalType::Answer, "", Value::Null))
            .await
            .unwrap();

        let got = alice.recv().await.unwrap();
        assert_eq!(got.kind, SignalType::Answer);
        assert_eq!(got.from, "bob");

        let got = bob.recv().await.unwrap();
        assert_eq!(got.kind, SignalType::Offer);
        assert_eq!(got.from, "alice");
    }
}
