//! Server-sent event delivery.

use crate::RpcError;

/// An event delivered to an event-stream callback.
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent<T> {
    /// The connection was accepted.
    Start,
    /// A decoded message.
    Data(T),
    Error(RpcError),
    /// The server closed the stream.
    End,
    /// The callback aborted the stream.
    Cancel,
}

/// Handed to the callback with every event to let it stop the stream.
#[derive(Debug, Default)]
pub struct SseController {
    aborted: bool,
}

impl SseController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the stream after the current event. The callback then receives
    /// [`SseEvent::Cancel`].
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

/// What a single server event means to the stream.
#[derive(Debug, PartialEq)]
pub(crate) enum EventKind {
    Message,
    Error,
    Done,
    Heartbeat,
}

impl EventKind {
    pub(crate) fn from_name(name: &str) -> Self {
        match name {
            "error" => EventKind::Error,
            "done" => EventKind::Done,
            "heartbeat" | "ping" => EventKind::Heartbeat,
            _ => EventKind::Message,
        }
    }
}
