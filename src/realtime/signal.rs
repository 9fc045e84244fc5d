use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Offer,
    Answer,
    Candidate,
    IncomingCall,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMessage {
    pub call_id: String,
    #[serde(rename = "type")]
    pub kind: SignalType,
    pub from: String,
    #[serde(default)]
    pub payload: Value,
}

impl SignalMessage {
    pub fn new(call_id: &str, kind: SignalType, from: &str, payload: Value) -> Self {
        Self {
            call_id: call_id.to_string(),
            kind,
            from: from.to_string(),
            payload,
        }
    }
}

pub fn user_channel(user_id: &str) -> String {
    format!("user:{}", user_id)
}

pub fn call_channel(call_id: &str) -> String {
    format!("call:{}", call_id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelName {
    User(String),
    Call(Uuid),
}

impl ChannelName {
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(user_id) = raw.strip_prefix("user:") {
            let user_id = user_id.trim();
            return (!user_id.is_empty()).then(|| ChannelName::User(user_id.to_string()));
        }
        raw.strip_prefix("call:")
            .and_then(|id| Uuid::parse_str(id).ok())
            .map(ChannelName::Call)
    }

    /// Users may only listen on their own inbox; call channels are open to
    /// anyone holding the id.
    pub fn allowed_for(&self, user_id: &str) -> bool {
        match self {
            ChannelName::User(owner) => owner == user_id,
            ChannelName::Call(_) => true,
        }
    }

    pub fn as_key(&self) -> String {
        match self {
            ChannelName::User(id) => user_channel(id),
            ChannelName::Call(id) => call_channel(&id.to_string()),
        }
    }
}
