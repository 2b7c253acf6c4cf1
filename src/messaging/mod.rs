// Messaging module - Event decoding and routing
pub mod event;
pub mod router;

pub use event::{InboundEvent, OutboundCommand};
pub use router::MessageRouter;
