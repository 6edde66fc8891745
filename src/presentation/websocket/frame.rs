//! Hub Frames
//!
//! Opaque payloads relayed between sessions. The hub never inspects them.

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes};

/// One relayed payload. Cloning is cheap; every recipient shares the buffer,
/// and converting to a [`Message`] does not copy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(Utf8Bytes),
    Binary(Bytes),
}

impl Frame {
    pub fn text(text: impl AsRef<str>) -> Self {
        Frame::Text(Utf8Bytes::from(text.as_ref().to_owned()))
    }

    pub fn len(&self) -> usize {
        match self {
            Frame::Text(text) => text.as_str().len(),
            Frame::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The payload as UTF-8 text, when it is a text frame.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Frame::Text(text) => Some(text.as_str()),
            Frame::Binary(_) => None,
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(bytes) => Message::Binary(bytes),
        }
    }
}

/// What a WebSocket message means to the session loop.
#[derive(Debug)]
pub enum Inbound {
    /// Relay to the other sessions.
    Frame(Frame),
    /// Control traffic (ping/pong); keeps the session alive, not relayed.
    Control,
    /// The peer asked to close.
    Close,
}

impl From<Message> for Inbound {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Inbound::Frame(Frame::Text(text)),
            Message::Binary(bytes) => Inbound::Frame(Frame::Binary(bytes)),
            Message::Ping(_) | Message::Pong(_) => Inbound::Control,
            Message::Close(_) => Inbound::Close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_frame_accessors() {
        let frame = Frame::text("hi");
        assert_eq!(frame.as_text(), Some("hi"));
        assert_eq!(frame.len(), 2);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_binary_frame_has_no_text() {
        let frame = Frame::Binary(Bytes::from_static(&[1, 2, 3]));
        assert_eq!(frame.as_text(), None);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn test_text_round_trip_shares_buffer() {
        let frame = Frame::text("shared payload");
        let Frame::Text(original) = frame.clone() else {
            panic!("expected text frame");
        };

        let Message::Text(sent) = Message::from(frame) else {
            panic!("expected text message");
        };

        assert_eq!(sent.as_str().as_ptr(), original.as_str().as_ptr());
        match Inbound::from(Message::Text(sent)) {
            Inbound::Frame(Frame::Text(received)) => {
                assert_eq!(received.as_str().as_ptr(), original.as_str().as_ptr());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_close_message_maps_to_close() {
        assert!(matches!(Inbound::from(Message::Close(None)), Inbound::Close));
    }

    #[test]
    fn test_binary_message_maps_to_frame() {
        let inbound = Inbound::from(Message::Binary(Bytes::from_static(b"abc")));
        match inbound {
            Inbound::Frame(frame) => assert_eq!(frame, Frame::Binary(Bytes::from_static(b"abc"))),
            other => panic!("unexpected {other:?}"),
        }
    }
}
