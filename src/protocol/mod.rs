// Protocol module - Engine.IO / Socket.IO v4 wire codec
pub mod engine;
pub mod socket;

pub use engine::{EnginePacket, OpenInfo, decode_payload, encode_payload};
pub use socket::{PacketType, SocketPacket};
