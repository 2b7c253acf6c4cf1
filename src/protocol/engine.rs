use crate::types::{RECORD_SEPARATOR, RealtimeError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handshake data carried by the Engine.IO `open` packet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

impl OpenInfo {
    /// Longest silence tolerated before the connection is considered dead
    pub fn heartbeat_deadline(&self) -> Duration {
        Duration::from_millis(self.ping_interval + self.ping_timeout)
    }
}

/// Engine.IO v4 packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenInfo),
    Close,
    Ping(String),
    Pong(String),
    /// Carries an encoded Socket.IO packet
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn encode(&self) -> Result<String> {
        let encoded = match self {
            Self::Open(info) => format!("0{}", serde_json::to_string(info)?),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{}", data),
            Self::Pong(data) => format!("3{}", data),
            Self::Message(data) => format!("4{}", data),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        };
        Ok(encoded)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let mut chars = raw.chars();
        let Some(kind) = chars.next() else {
            return Err(RealtimeError::Protocol("empty engine packet".to_string()));
        };
        let data = chars.as_str();

        match kind {
            '0' => Ok(Self::Open(serde_json::from_str(data)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(data.to_string())),
            '3' => Ok(Self::Pong(data.to_string())),
            '4' => Ok(Self::Message(data.to_string())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            'b' => Err(RealtimeError::Protocol(
                "binary engine packets are not supported".to_string(),
            )),
            other => Err(RealtimeError::Protocol(format!(
                "unknown engine packet type '{}'",
                other
            ))),
        }
    }
}

/// Splits a long-polling response body into packets
pub fn decode_payload(body: &str) -> Vec<Result<EnginePacket>> {
    body.split(RECORD_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(EnginePacket::decode)
        .collect()
}

/// Joins packets into a long-polling request body
pub fn encode_payload(packets: &[EnginePacket]) -> Result<String> {
    let encoded = packets
        .iter()
        .map(EnginePacket::encode)
        .collect::<Result<Vec<_>>>()?;
    Ok(encoded.join(&RECORD_SEPARATOR.to_string()))
}
