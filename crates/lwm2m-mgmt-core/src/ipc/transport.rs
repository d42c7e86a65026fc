//! Blocking UDP transport to the daemon.
//!
//! The framing is one message per datagram; the transport is loopback-only
//! and the daemon is authoritative, so there is no retransmission — a
//! deadline exceeded on `send_request_await_response` simply returns
//! [`crate::error::ErrorKind::Timeout`].

use crate::definition::DefinitionRegistry;
use crate::ipc::codec::{decode_message, encode_message};
use crate::ipc::message::{Message, MessageType};
use std::collections::VecDeque;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Transport-level failures — daemon unreachable, malformed frame, or a
/// plain I/O error from the socket.
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("unable to bind UDP socket: {0}")]
    Bind(#[source] std::io::Error),
    #[error("unable to resolve daemon address: {0}")]
    Resolve(#[source] std::io::Error),
    #[error("unable to connect UDP socket to daemon: {0}")]
    Connect(#[source] std::io::Error),
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),
    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),
    #[error("malformed message: {0}")]
    Codec(#[from] crate::ipc::codec::CodecError),
}

const MAX_DATAGRAM: usize = 64 * 1024;

/// What a [`crate::session::Session`] needs from its IPC channel. Lets
/// tests substitute an in-process mock for the real UDP socket (see
/// [`crate::test_support::MockChannel`]) without touching `Session`'s logic.
pub trait IpcChannel: Send {
    fn send_request_await_response(
        &mut self,
        message: &Message,
        timeout: Duration,
        registry: &DefinitionRegistry,
    ) -> Result<Option<Message>, IpcError>;

    fn send_best_effort(&mut self, message: &Message) -> Result<(), IpcError>;

    fn drain_notifications(&mut self, timeout: Duration, registry: &DefinitionRegistry) -> Result<(), IpcError>;

    fn pop_notification(&mut self) -> Option<Message>;

    fn has_queued_notifications(&self) -> bool;
}

impl IpcChannel for IpcTransport {
    fn send_request_await_response(
        &mut self,
        message: &Message,
        timeout: Duration,
        registry: &DefinitionRegistry,
    ) -> Result<Option<Message>, IpcError> {
        IpcTransport::send_request_await_response(self, message, timeout, registry)
    }

    fn send_best_effort(&mut self, message: &Message) -> Result<(), IpcError> {
        IpcTransport::send_best_effort(self, message)
    }

    fn drain_notifications(&mut self, timeout: Duration, registry: &DefinitionRegistry) -> Result<(), IpcError> {
        IpcTransport::drain_notifications(self, timeout, registry)
    }

    fn pop_notification(&mut self) -> Option<Message> {
        IpcTransport::pop_notification(self)
    }

    fn has_queued_notifications(&self) -> bool {
        IpcTransport::has_queued_notifications(self)
    }
}

/// A connected UDP socket to the daemon, plus the queue of notifications
/// observed while waiting for a response.
pub struct IpcTransport {
    socket: UdpSocket,
    notifications: VecDeque<Message>,
}

impl IpcTransport {
    /// Binds an ephemeral local socket and connects it to `daemon_addr`.
    pub fn connect(daemon_addr: impl ToSocketAddrs) -> Result<Self, IpcError> {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).map_err(IpcError::Bind)?;
        let addr: SocketAddr = daemon_addr
            .to_socket_addrs()
            .map_err(IpcError::Resolve)?
            .next()
            .ok_or_else(|| IpcError::Resolve(std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved")))?;
        socket.connect(addr).map_err(IpcError::Connect)?;
        Ok(Self {
            socket,
            notifications: VecDeque::new(),
        })
    }

    /// Sends `message` and blocks until a matching `(sessionId, messageId)`
    /// response arrives, a notification is queued, or `timeout` elapses.
    ///
    /// No retransmission: the transport is loopback-only and the daemon is
    /// authoritative.
    pub fn send_request_await_response(
        &mut self,
        message: &Message,
        timeout: Duration,
        registry: &DefinitionRegistry,
    ) -> Result<Option<Message>, IpcError> {
        let encoded = encode_message(message)?;
        self.socket.send(&encoded).map_err(IpcError::Send)?;

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            // A zero read timeout blocks forever on some platforms; clamp
            // to at least 1ms so the deadline loop always makes progress.
            self.socket
                .set_read_timeout(Some(remaining.max(Duration::from_millis(1))))
                .map_err(IpcError::Receive)?;

            let mut buf = vec![0u8; MAX_DATAGRAM];
            match self.socket.recv(&mut buf) {
                Ok(n) => {
                    let decoded = decode_message(&buf[..n], registry)?;
                    if decoded.session_id != message.session_id {
                        continue;
                    }
                    match decoded.message_type {
                        MessageType::Response if decoded.message_id == message.message_id => {
                            return Ok(Some(decoded));
                        }
                        MessageType::Notification => {
                            self.notifications.push_back(decoded);
                            continue;
                        }
                        _ => continue,
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                    return Ok(None);
                }
                Err(e) => return Err(IpcError::Receive(e)),
            }
        }
    }

    /// Sends a fire-and-forget request, used for best-effort `Disconnect`.
    pub fn send_best_effort(&self, message: &Message) -> Result<(), IpcError> {
        let encoded = encode_message(message)?;
        self.socket.send(&encoded).map_err(IpcError::Send)?;
        Ok(())
    }

    /// Drains notifications from the socket into the internal queue,
    /// non-blocking (or bounded-block) until the socket is empty or
    /// `timeout` expires.
    pub fn drain_notifications(&mut self, timeout: Duration, registry: &DefinitionRegistry) -> Result<(), IpcError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            self.socket
                .set_read_timeout(Some(remaining.max(Duration::from_millis(1))))
                .map_err(IpcError::Receive)?;
            let mut buf = vec![0u8; MAX_DATAGRAM];
            match self.socket.recv(&mut buf) {
                Ok(n) => {
                    let decoded = decode_message(&buf[..n], registry)?;
                    if decoded.message_type == MessageType::Notification {
                        self.notifications.push_back(decoded);
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                    return Ok(());
                }
                Err(e) => return Err(IpcError::Receive(e)),
            }
        }
    }

    pub fn pop_notification(&mut self) -> Option<Message> {
        self.notifications.pop_front()
    }

    pub fn has_queued_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }
}
