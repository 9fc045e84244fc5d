//! Peer-to-peer call engine. Media capture and the peer connection sit
//! behind traits so the negotiation logic runs the same against a browser
//! bridge, a native stack or the fakes used in tests.

#[cfg(test)]
pub mod fakes;
pub mod incoming;
pub mod media;
pub mod peer;
pub mod session;
pub mod signaling;

pub use incoming::{IncomingCall, IncomingCallListener, UNKNOWN_CALLER};
pub use media::{MediaConstraints, MediaDevices, MediaStream, MediaTrack, TrackKind, TrackState};
pub use peer::{
    IceCandidate, IceServer, PeerConnection, PeerConnectionFactory, PeerConnectionState,
    PeerEvent, RtcConfiguration, SdpType, SessionDescription,
};
pub use session::{CallDeps, CallRole, CallSession, CallState};
pub use signaling::{RelaySignaling, SignalingChannel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("camera or microphone unavailable: {0}")]
    MediaAccess(String),
    #[error("connection lost: {0}")]
    Connection(String),
    #[error("signaling failed: {0}")]
    Signaling(String),
    #[error("negotiation failed: {0}")]
    Negotiation(String),
    #[error("not allowed while {0}")]
    InvalidState(&'static str),
}
