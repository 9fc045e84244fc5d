use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::media::{MediaConstraints, MediaDevices, MediaStream, TrackKind};
use super::peer::{
    IceCandidate, PeerConnection, PeerConnectionFactory, PeerConnectionState, PeerEvent,
    RtcConfiguration, SessionDescription,
};
use super::signaling::SignalingChannel;
use super::CallError;
use crate::realtime::{SignalMessage, SignalType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRole {
    Caller,
    Callee,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Calling,
    Answering,
    Connecting,
    Connected,
    Ended,
    Failed(CallError),
}

impl CallState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Ended | CallState::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            CallState::Idle => "idle",
            CallState::Calling => "calling",
            CallState::Answering => "answering",
            CallState::Connecting => "connecting",
            CallState::Connected => "connected",
            CallState::Ended => "ended",
            CallState::Failed(_) => "failed",
        }
    }
}

#[derive(Clone)]
pub struct CallDeps {
    pub media: Arc<dyn MediaDevices>,
    pub peers: Arc<dyn PeerConnectionFactory>,
    pub rtc: RtcConfiguration,
    pub constraints: MediaConstraints,
}

impl CallDeps {
    pub fn new(
        media: Arc<dyn MediaDevices>,
        peers: Arc<dyn PeerConnectionFactory>,
        rtc: RtcConfiguration,
    ) -> Self {
        Self {
            media,
            peers,
            rtc,
            constraints: MediaConstraints::default(),
        }
    }
}

/// One side of a call. Owns the local tracks and the peer connection and
/// releases both when the call ends, fails or the session is dropped.
pub struct CallSession {
    call_id: String,
    user_id: String,
    role: Option<CallRole>,
    state: CallState,
    deps: CallDeps,
    signaling: Box<dyn SignalingChannel>,
    local_stream: Option<MediaStream>,
    peer: Option<Box<dyn PeerConnection>>,
    local_description_sent: bool,
    remote_description_set: bool,
    pending_local: Vec<IceCandidate>,
    pending_remote: Vec<IceCandidate>,
}

impl CallSession {
    pub fn new(
        call_id: &str,
        user_id: &str,
        deps: CallDeps,
        signaling: Box<dyn SignalingChannel>,
    ) -> Self {
        Self {
            call_id: call_id.to_string(),
            user_id: user_id.to_string(),
            role: None,
            state: CallState::Idle,
            deps,
            signaling,
            local_stream: None,
            peer: None,
            local_description_sent: false,
            remote_description_set: false,
            pending_local: Vec::new(),
            pending_remote: Vec::new(),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn role(&self) -> Option<CallRole> {
        self.role
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn local_stream(&self) -> Option<&MediaStream> {
        self.local_stream.as_ref()
    }

    pub async fn start(&mut self) -> Result<(), CallError> {
        self.expect_idle()?;
        self.role = Some(CallRole::Caller);
        self.prepare().await?;
        let sent = self.send_offer().await;
        self.guard(sent)?;
        self.transition(CallState::Calling);
        Ok(())
    }

    pub async fn answer(&mut self) -> Result<(), CallError> {
        self.expect_idle()?;
        self.role = Some(CallRole::Callee);
        self.prepare().await?;
        self.transition(CallState::Answering);
        Ok(())
    }

    pub async fn handle_signal(&mut self, message: SignalMessage) -> Result<(), CallError> {
        if message.call_id != self.call_id || self.state.is_terminal() {
            return Ok(());
        }
        let result = match message.kind {
            SignalType::Offer => self.on_offer(message.payload).await,
            SignalType::Answer => self.on_answer(message.payload).await,
            SignalType::Candidate => self.on_remote_candidate(message.payload).await,
            SignalType::End => {
                info!(call_id = %self.call_id, from = %message.from, "call_ended_by_peer");
                self.release();
                self.transition(CallState::Ended);
                Ok(())
            }
            SignalType::IncomingCall => Ok(()),
        };
        self.guard(result)
    }

    pub async fn handle_peer_event(&mut self, event: PeerEvent) -> Result<(), CallError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        let result = match event {
            PeerEvent::IceCandidate(candidate) if self.local_description_sent => {
                self.send_candidate(&candidate).await
            }
            PeerEvent::IceCandidate(candidate) => {
                self.pending_local.push(candidate);
                Ok(())
            }
            PeerEvent::ConnectionState(PeerConnectionState::Connected) => {
                self.transition(CallState::Connected);
                Ok(())
            }
            PeerEvent::ConnectionState(
                state @ (PeerConnectionState::Failed | PeerConnectionState::Disconnected),
            ) => Err(CallError::Connection(format!("peer {:?}", state).to_lowercase())),
            PeerEvent::ConnectionState(PeerConnectionState::Closed) => {
                self.release();
                self.transition(CallState::Ended);
                Ok(())
            }
            PeerEvent::ConnectionState(_) | PeerEvent::RemoteTrack(_) => Ok(()),
        };
        self.guard(result)
    }

    /// Returns the new enabled state, or `None` without a local audio track.
    pub fn toggle_audio(&self) -> Option<bool> {
        self.toggle(TrackKind::Audio)
    }

    pub fn toggle_video(&self) -> Option<bool> {
        self.toggle(TrackKind::Video)
    }

    /// Local resources are released before `end` is sent, so a failed send
    /// still leaves the camera and microphone off.
    pub async fn end_call(&mut self) -> Result<(), CallError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        self.release();
        self.transition(CallState::Ended);
        let sent = self.send(SignalType::End, Value::Null).await;
        if let Err(e) = &sent {
            warn!(call_id = %self.call_id, error = %e, "call_end_signal_failed");
        }
        sent
    }

    pub async fn run(&mut self) -> CallState {
        enum Step {
            Signal(Option<SignalMessage>),
            Peer(Option<PeerEvent>),
        }

        while !self.state.is_terminal() {
            let step = tokio::select! {
                message = self.signaling.recv() => Step::Signal(message),
                event = next_peer_event(self.peer.as_mut()) => Step::Peer(event),
            };
            let outcome = match step {
                Step::Signal(Some(message)) => self.handle_signal(message).await,
                Step::Signal(None) => {
                    let err = CallError::Signaling("relay channel closed".to_string());
                    self.fail(err.clone());
                    Err(err)
                }
                Step::Peer(Some(event)) => self.handle_peer_event(event).await,
                Step::Peer(None) => {
                    self.release();
                    self.transition(CallState::Ended);
                    Ok(())
                }
            };
            if let Err(e) = outcome {
                debug!(call_id = %self.call_id, error = %e, "call_step_failed");
            }
        }
        self.state.clone()
    }

    async fn prepare(&mut self) -> Result<(), CallError> {
        let stream = self
            .deps
            .media
            .get_user_media(self.deps.constraints)
            .await
            .map_err(|e| match e {
                CallError::MediaAccess(_) => e,
                other => CallError::MediaAccess(other.to_string()),
            });
        let stream = self.guard(stream)?;
        self.local_stream = Some(stream.clone());

        let peer = self.deps.peers.create(&self.deps.rtc);
        let mut peer = self.guard(peer)?;
        let added = peer.add_stream(&stream).await;
        self.peer = Some(peer);
        self.guard(added)
    }

    async fn send_offer(&mut self) -> Result<(), CallError> {
        let peer = self.peer_mut()?;
        let offer = peer.create_offer().await?;
        peer.set_local_description(offer.clone()).await?;
        self.send(SignalType::Offer, to_payload(&offer)?).await?;
        self.local_description_sent = true;
        self.flush_local_candidates().await
    }

    async fn on_offer(&mut self, payload: Value) -> Result<(), CallError> {
        if self.state != CallState::Answering {
            warn!(call_id = %self.call_id, state = self.state.label(), "unexpected_offer_ignored");
            return Ok(());
        }
        let offer: SessionDescription = from_payload(payload)?;
        self.peer_mut()?.set_remote_description(offer).await?;
        self.remote_description_set = true;
        self.flush_remote_candidates().await?;

        let peer = self.peer_mut()?;
        let answer = peer.create_answer().await?;
        peer.set_local_description(answer.clone()).await?;
        self.send(SignalType::Answer, to_payload(&answer)?).await?;
        self.local_description_sent = true;
        self.flush_local_candidates().await?;
        self.transition(CallState::Connecting);
        Ok(())
    }

    async fn on_answer(&mut self, payload: Value) -> Result<(), CallError> {
        if self.state != CallState::Calling {
            warn!(call_id = %self.call_id, state = self.state.label(), "unexpected_answer_ignored");
            return Ok(());
        }
        let answer: SessionDescription = from_payload(payload)?;
        self.peer_mut()?.set_remote_description(answer).await?;
        self.remote_description_set = true;
        self.flush_remote_candidates().await?;
        self.transition(CallState::Connecting);
        Ok(())
    }

    async fn on_remote_candidate(&mut self, payload: Value) -> Result<(), CallError> {
        let candidate: IceCandidate = from_payload(payload)?;
        if self.remote_description_set {
            self.peer_mut()?.add_ice_candidate(candidate).await
        } else {
            self.pending_remote.push(candidate);
            Ok(())
        }
    }

    async fn flush_local_candidates(&mut self) -> Result<(), CallError> {
        for candidate in std::mem::take(&mut self.pending_local) {
            self.send_candidate(&candidate).await?;
        }
        Ok(())
    }

    async fn flush_remote_candidates(&mut self) -> Result<(), CallError> {
        let queued = std::mem::take(&mut self.pending_remote);
        let peer = self.peer_mut()?;
        for candidate in queued {
            peer.add_ice_candidate(candidate).await?;
        }
        Ok(())
    }

    async fn send_candidate(&mut self, candidate: &IceCandidate) -> Result<(), CallError> {
        let payload = to_payload(candidate)?;
        self.send(SignalType::Candidate, payload).await
    }

    async fn send(&mut self, kind: SignalType, payload: Value) -> Result<(), CallError> {
        let message = SignalMessage::new(&self.call_id, kind, &self.user_id, payload);
        self.signaling.send(message).await
    }

    fn peer_mut(&mut self) -> Result<&mut Box<dyn PeerConnection>, CallError> {
        self.peer
            .as_mut()
            .ok_or(CallError::InvalidState("without a peer connection"))
    }

    fn toggle(&self, kind: TrackKind) -> Option<bool> {
        let stream = self.local_stream.as_ref()?;
        let enabled = !stream.tracks_of(kind).next()?.is_enabled();
        for track in stream.tracks_of(kind) {
            track.set_enabled(enabled);
        }
        Some(enabled)
    }

    fn expect_idle(&self) -> Result<(), CallError> {
        match self.state {
            CallState::Idle => Ok(()),
            ref other => Err(CallError::InvalidState(other.label())),
        }
    }

    fn guard<T>(&mut self, result: Result<T, CallError>) -> Result<T, CallError> {
        if let Err(e) = &result {
            if !self.state.is_terminal() {
                self.fail(e.clone());
            }
        }
        result
    }

    fn fail(&mut self, err: CallError) {
        warn!(call_id = %self.call_id, error = %err, "call_failed");
        self.release();
        self.state = CallState::Failed(err);
    }

    fn release(&mut self) {
        if let Some(stream) = self.local_stream.take() {
            stream.stop_all();
        }
        if let Some(mut peer) = self.peer.take() {
            peer.close();
        }
        self.pending_local.clear();
        self.pending_remote.clear();
    }

    fn transition(&mut self, next: CallState) {
        if self.state != next {
            info!(
                call_id = %self.call_id,
                from = self.state.label(),
                to = next.label(),
                "call_state"
            );
            self.state = next;
        }
    }
}

impl Drop for CallSession {
    fn drop(&mut self) {
        self.release();
    }
}

async fn next_peer_event(peer: Option<&mut Box<dyn PeerConnection>>) -> Option<PeerEvent> {
    match peer {
        Some(peer) => peer.next_event().await,
        None => std::future::pending().await,
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<Value, CallError> {
    serde_json::to_value(value).map_err(|e| CallError::Negotiation(e.to_string()))
}

fn from_payload<T: DeserializeOwned>(payload: Value) -> Result<T, CallError> {
    serde_json::from_value(payload).map_err(|e| CallError::Negotiation(e.to_string()))
}
