use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::media::{MediaStream, TrackKind};
use super::CallError;

pub const DEFAULT_STUN_SERVERS: &[&str] = &[
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcConfiguration {
    pub ice_servers: Vec<IceServer>,
}

impl Default for RtcConfiguration {
    fn default() -> Self {
        Self {
            ice_servers: crate::config::default_ice_servers(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpType,
    pub sdp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    IceCandidate(IceCandidate),
    ConnectionState(PeerConnectionState),
    RemoteTrack(TrackKind),
}

#[async_trait]
pub trait PeerConnection: Send {
    async fn add_stream(&mut self, stream: &MediaStream) -> Result<(), CallError>;
    async fn create_offer(&mut self) -> Result<SessionDescription, CallError>;
    async fn create_answer(&mut self) -> Result<SessionDescription, CallError>;
    async fn set_local_description(&mut self, desc: SessionDescription) -> Result<(), CallError>;
    async fn set_remote_description(&mut self, desc: SessionDescription) -> Result<(), CallError>;
    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<(), CallError>;
    async fn next_event(&mut self) -> Option<PeerEvent>;
    fn close(&mut self);
}

pub trait PeerConnectionFactory: Send + Sync {
    fn create(&self, config: &RtcConfiguration) -> Result<Box<dyn PeerConnection>, CallError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_lists_public_stun() {
        let config = RtcConfiguration::default();
        let urls: Vec<&str> = config
            .ice_servers
            .iter()
            .flat_map(|s| s.urls.iter().map(String::as_str))
            .collect();
        assert_eq!(urls, DEFAULT_STUN_SERVERS);
    }

    #[test]
    fn candidate_uses_browser_field_names() {
        let c: IceCandidate = serde_json::from_str(
            r#"{"candidate":"candidate:1 1 udp 1 10.0.0.1 5000 typ host","sdpMid":"0","sdpMLineIndex":0}"#,
        )
        .unwrap();
        assert_eq!(c.sdp_mid.as_deref(), Some("0"));
        assert_eq!(c.sdp_m_line_index, Some(0));
    }
}
