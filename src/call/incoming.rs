use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::session::{CallDeps, CallSession};
use super::signaling::RelaySignaling;
use super::CallError;
use crate::backend::MatchBackend;
use crate::realtime::{user_channel, Relay, SignalType, Subscription};

pub const UNKNOWN_CALLER: &str = "Unknown caller";

pub struct IncomingCallListener {
    user_id: String,
    subscription: Subscription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingCall {
    pub call_id: String,
    pub caller_user_id: String,
    pub caller_name: String,
}

impl IncomingCallListener {
    pub fn subscribe(relay: &Arc<Relay>, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            subscription: relay.subscribe(&user_channel(user_id)),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Waits for the next ring; anything else on the channel is skipped.
    /// `None` once the relay channel closes.
    pub async fn next_call(&mut self, backend: &dyn MatchBackend) -> Option<IncomingCall> {
        loop {
            let message = self.subscription.recv().await?;
            if message.kind != SignalType::IncomingCall || message.from == self.user_id {
                continue;
            }

            let caller_name = match backend.profile_display_name(&message.from).await {
                Ok(Some(name)) if !name.trim().is_empty() => name,
                Ok(_) => UNKNOWN_CALLER.to_string(),
                Err(e) => {
                    warn!(caller = %message.from, error = %e, "📞 Caller name lookup failed");
                    UNKNOWN_CALLER.to_string()
                }
            };

            return Some(IncomingCall {
                call_id: message.call_id,
                caller_user_id: message.from,
                caller_name,
            });
        }
    }
}

impl IncomingCall {
    /// Joins `call:{call_id}` and readies local media; the session then waits
    /// for the caller's offer.
    pub async fn accept(
        self,
        relay: &Arc<Relay>,
        user_id: &str,
        deps: CallDeps,
    ) -> Result<CallSession, CallError> {
        let signaling = RelaySignaling::join(relay, &self.call_id, user_id);
        let mut session = CallSession::new(&self.call_id, user_id, deps, Box::new(signaling));
        session.answer().await?;
        Ok(session)
    }

    /// Dismisses the ring locally. The caller is not told.
    pub fn reject(self) {
        debug!(call_id = %self.call_id, caller = %self.caller_user_id, "incoming_call_rejected");
    }
}
