use crate::types::{RealtimeError, Result};
use serde_json::Value;

/// Socket.IO v4 packet types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
    BinaryEvent,
    BinaryAck,
}

impl PacketType {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Connect),
            '1' => Some(Self::Disconnect),
            '2' => Some(Self::Event),
            '3' => Some(Self::Ack),
            '4' => Some(Self::ConnectError),
            '5' => Some(Self::BinaryEvent),
            '6' => Some(Self::BinaryAck),
            _ => None,
        }
    }

    fn as_char(&self) -> char {
        match self {
            Self::Connect => '0',
            Self::Disconnect => '1',
            Self::Event => '2',
            Self::Ack => '3',
            Self::ConnectError => '4',
            Self::BinaryEvent => '5',
            Self::BinaryAck => '6',
        }
    }

    fn is_binary(&self) -> bool {
        matches!(self, Self::BinaryEvent | Self::BinaryAck)
    }
}

/// A decoded Socket.IO packet
///
/// Wire format: `<type>[<attachments>-][<namespace>,][<ack id>][<json>]`,
/// with the root namespace `/` left out.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: PacketType,
    pub namespace: String,
    pub id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    pub fn connect(namespace: &str, auth: Option<Value>) -> Self {
        Self {
            kind: PacketType::Connect,
            namespace: namespace.to_string(),
            id: None,
            data: auth,
        }
    }

    pub fn disconnect(namespace: &str) -> Self {
        Self {
            kind: PacketType::Disconnect,
            namespace: namespace.to_string(),
            id: None,
            data: None,
        }
    }

    pub fn event(namespace: &str, name: &str, payload: Value) -> Self {
        Self {
            kind: PacketType::Event,
            namespace: namespace.to_string(),
            id: None,
            data: Some(Value::Array(vec![Value::String(name.to_string()), payload])),
        }
    }

    /// Splits an EVENT packet into its name and arguments
    pub fn as_event(&self) -> Option<(&str, &[Value])> {
        if self.kind != PacketType::Event {
            return None;
        }
        let Some(Value::Array(items)) = &self.data else {
            return None;
        };
        let (name, args) = items.split_first()?;
        Some((name.as_str()?, args))
    }

    pub fn encode(&self) -> Result<String> {
        let mut out = String::new();
        out.push(self.kind.as_char());

        if self.namespace != "/" {
            out.push_str(&self.namespace);
            out.push(',');
        }

        if let Some(id) = self.id {
            out.push_str(&id.to_string());
        }

        if let Some(data) = &self.data {
            out.push_str(&serde_json::to_string(data)?);
        }

        Ok(out)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let mut chars = raw.chars();
        let kind = chars
            .next()
            .and_then(PacketType::from_char)
            .ok_or_else(|| RealtimeError::Protocol(format!("invalid socket packet: {}", raw)))?;

        if kind.is_binary() {
            return Err(RealtimeError::Protocol(
                "binary socket packets are not supported".to_string(),
            ));
        }

        let mut rest = chars.as_str();

        let namespace = if rest.starts_with('/') {
            match rest.find(',') {
                Some(end) => {
                    let namespace = &rest[..end];
                    rest = &rest[end + 1..];
                    namespace.to_string()
                }
                None => {
                    let namespace = rest.to_string();
                    rest = "";
                    namespace
                }
            }
        } else {
            "/".to_string()
        };

        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        let id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| RealtimeError::Protocol(format!("invalid ack id: {}", e)))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest)?)
        };

        Ok(Self {
            kind,
            namespace,
            id,
            data,
        })
    }
}
