//! In-memory stand-ins for media capture, peer connections and signaling.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::media::{MediaConstraints, MediaDevices, MediaStream, MediaTrack, TrackKind, TrackState};
use super::peer::{
    IceCandidate, PeerConnection, PeerConnectionFactory, PeerEvent, RtcConfiguration, SdpType,
    SessionDescription,
};
use super::signaling::SignalingChannel;
use super::CallError;
use crate::realtime::SignalMessage;

pub fn candidate(name: &str) -> IceCandidate {
    IceCandidate {
        candidate: name.to_string(),
        sdp_mid: Some("0".to_string()),
        sdp_m_line_index: Some(0),
    }
}

pub struct FakeTrack {
    kind: TrackKind,
    enabled: AtomicBool,
    ended: AtomicBool,
}

impl MediaTrack for FakeTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.ended.store(true, Ordering::SeqCst);
    }

    fn ready_state(&self) -> TrackState {
        if self.ended.load(Ordering::SeqCst) {
            TrackState::Ended
        } else {
            TrackState::Live
        }
    }
}

#[derive(Default)]
pub struct FakeMediaDevices {
    fail: bool,
    issued: Mutex<Vec<Arc<FakeTrack>>>,
}

impl FakeMediaDevices {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn tracks(&self) -> Vec<Arc<FakeTrack>> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaDevices for FakeMediaDevices {
    async fn get_user_media(&self, constraints: MediaConstraints) -> Result<MediaStream, CallError> {
        if self.fail {
            return Err(CallError::MediaAccess("permission denied".to_string()));
        }
        let mut kinds = Vec::new();
        if constraints.audio {
            kinds.push(TrackKind::Audio);
        }
        if constraints.video {
            kinds.push(TrackKind::Video);
        }

        let mut issued = self.issued.lock().unwrap();
        let mut tracks: Vec<Arc<dyn MediaTrack>> = Vec::new();
        for kind in kinds {
            let track = Arc::new(FakeTrack {
                kind,
                enabled: AtomicBool::new(true),
                ended: AtomicBool::new(false),
            });
            issued.push(track.clone());
            tracks.push(track);
        }
        Ok(MediaStream::new(tracks))
    }
}

type SharedReceiver<T> = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<T>>>;

// Records every peer call in order; events are pushed with `emit`.
pub struct FakePeerFactory {
    log: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    created: AtomicUsize,
    events_tx: mpsc::UnboundedSender<PeerEvent>,
    events_rx: SharedReceiver<PeerEvent>,
}

impl Default for FakePeerFactory {
    fn default() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            log: Arc::default(),
            closed: Arc::default(),
            created: AtomicUsize::new(0),
            events_tx,
            events_rx: Arc::new(tokio::sync::Mutex::new(events_rx)),
        }
    }
}

impl FakePeerFactory {
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: PeerEvent) {
        let _ = self.events_tx.send(event);
    }
}

impl PeerConnectionFactory for FakePeerFactory {
    fn create(&self, _config: &RtcConfiguration) -> Result<Box<dyn PeerConnection>, CallError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePeer {
            log: self.log.clone(),
            closed: self.closed.clone(),
            events: self.events_rx.clone(),
        }))
    }
}

struct FakePeer {
    log: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    events: SharedReceiver<PeerEvent>,
}

impl FakePeer {
    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

fn sdp_label(kind: SdpType) -> &'static str {
    match kind {
        SdpType::Offer => "offer",
        SdpType::Answer => "answer",
    }
}

#[async_trait]
impl PeerConnection for FakePeer {
    async fn add_stream(&mut self, _stream: &MediaStream) -> Result<(), CallError> {
        self.record("add_stream".to_string());
        Ok(())
    }

    async fn create_offer(&mut self) -> Result<SessionDescription, CallError> {
        self.record("create_offer".to_string());
        Ok(SessionDescription {
            kind: SdpType::Offer,
            sdp: "v=0 offer".to_string(),
        })
    }

    async fn create_answer(&mut self) -> Result<SessionDescription, CallError> {
        self.record("create_answer".to_string());
        Ok(SessionDescription {
            kind: SdpType::Answer,
            sdp: "v=0 answer".to_string(),
        })
    }

    async fn set_local_description(&mut self, desc: SessionDescription) -> Result<(), CallError> {
        self.record(format!("set_local:{}", sdp_label(desc.kind)));
        Ok(())
    }

    async fn set_remote_description(&mut self, desc: SessionDescription) -> Result<(), CallError> {
        self.record(format!("set_remote:{}", sdp_label(desc.kind)));
        Ok(())
    }

    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<(), CallError> {
        self.record(format!("add_candidate:{}", candidate.candidate));
        Ok(())
    }

    async fn next_event(&mut self) -> Option<PeerEvent> {
        self.events.lock().await.recv().await
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// Clones share the sent log and the inbox.
#[derive(Clone)]
pub struct FakeSignaling {
    sent: Arc<Mutex<Vec<SignalMessage>>>,
    fail_sends: Arc<AtomicBool>,
    inbox_tx: mpsc::UnboundedSender<SignalMessage>,
    inbox_rx: SharedReceiver<SignalMessage>,
}

impl Default for FakeSignaling {
    fn default() -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            sent: Arc::default(),
            fail_sends: Arc::default(),
            inbox_tx,
            inbox_rx: Arc::new(tokio::sync::Mutex::new(inbox_rx)),
        }
    }
}

impl FakeSignaling {
    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn push(&self, message: SignalMessage) {
        let _ = self.inbox_tx.send(message);
    }
}

#[async_trait]
impl SignalingChannel for FakeSignaling {
    async fn send(&mut self, message: SignalMessage) -> Result<(), CallError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(CallError::Signaling("relay unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<SignalMessage> {
        self.inbox_rx.lock().await.recv().await
    }
}
