//! The daemon IPC boundary: message framing, the blocking
//! UDP transport, and the XML wire codec.

mod codec;
mod message;
mod transport;

pub use codec::{CodecError, decode_message, encode_message};
pub use message::{Message, MessageKind, MessageType};
pub use transport::{IpcChannel, IpcError, IpcTransport};
