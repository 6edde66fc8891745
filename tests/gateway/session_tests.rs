//! Hub session behavior: fan-out, ordering, teardown and limits.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_test::assert_ok;

use chat_hub::config::WebSocketSettings;
use chat_hub::presentation::websocket::{CloseReason, Frame, Gateway, Inbound, RegistryError};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// One in-process peer: what it sends, what it receives, and its session task.
struct Peer {
    input: UnboundedSender<Result<Inbound, io::Error>>,
    output: UnboundedReceiver<Frame>,
    task: JoinHandle<CloseReason>,
}

impl Peer {
    fn send(&self, text: &str) {
        self.input
            .unbounded_send(Ok(Inbound::Frame(Frame::text(text))))
            .expect("session input closed");
    }

    async fn recv(&mut self) -> Option<Frame> {
        timeout(RECV_TIMEOUT, self.output.next())
            .await
            .expect("timed out waiting for a frame")
    }

    async fn expect_silence(&mut self) {
        assert!(
            timeout(Duration::from_millis(100), self.output.next())
                .await
                .is_err(),
            "peer received an unexpected frame"
        );
    }

    async fn finish(self) -> CloseReason {
        let reason = timeout(RECV_TIMEOUT, self.task)
            .await
            .expect("session did not close");
        assert_ok!(reason)
    }
}

fn connect(gateway: &Arc<Gateway>, user_id: Option<i64>) -> Peer {
    let (input, inbound) = unbounded();
    let (outbound, output) = unbounded();
    let gateway = gateway.clone();
    let task = tokio::spawn(async move { gateway.serve(user_id, inbound, outbound).await });
    Peer {
        input,
        output,
        task,
    }
}

async fn wait_for_sessions(gateway: &Gateway, expected: usize) {
    for _ in 0..200 {
        if gateway.session_count() == expected {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} sessions, found {}",
        gateway.session_count()
    );
}

fn gateway_with(settings: WebSocketSettings) -> Arc<Gateway> {
    Arc::new(Gateway::new(&settings))
}

#[tokio::test]
async fn test_frame_reaches_every_other_session() {
    let gateway = Arc::new(Gateway::default());
    let mut a = connect(&gateway, Some(1));
    let mut b = connect(&gateway, Some(2));
    let mut c = connect(&gateway, None);
    wait_for_sessions(&gateway, 3).await;

    a.send("hello");

    assert_eq!(b.recv().await, Some(Frame::text("hello")));
    assert_eq!(c.recv().await, Some(Frame::text("hello")));
    a.expect_silence().await;
}

#[tokio::test]
async fn test_binary_frames_are_relayed_unchanged() {
    let gateway = Arc::new(Gateway::default());
    let a = connect(&gateway, None);
    let mut b = connect(&gateway, None);
    wait_for_sessions(&gateway, 2).await;

    let payload = Frame::Binary(Bytes::from_static(&[0, 159, 146, 150]));
    a.input
        .unbounded_send(Ok(Inbound::Frame(payload.clone())))
        .unwrap();

    assert_eq!(b.recv().await, Some(payload));
}

#[tokio::test]
async fn test_frames_from_one_sender_keep_their_order() {
    let gateway = Arc::new(Gateway::default());
    let a = connect(&gateway, Some(1));
    let mut b = connect(&gateway, Some(2));
    wait_for_sessions(&gateway, 2).await;

    for i in 0..50 {
        a.send(&format!("m{i}"));
    }

    for i in 0..50 {
        let frame = b.recv().await.expect("stream ended early");
        assert_eq!(frame.as_text(), Some(format!("m{i}").as_str()));
    }
}

#[tokio::test]
async fn test_control_frames_are_not_relayed() {
    let gateway = Arc::new(Gateway::default());
    let a = connect(&gateway, None);
    let mut b = connect(&gateway, None);
    wait_for_sessions(&gateway, 2).await;

    a.input.unbounded_send(Ok(Inbound::Control)).unwrap();

    b.expect_silence().await;
}

#[tokio::test]
async fn test_lone_session_sends_to_nobody() {
    let gateway = Arc::new(Gateway::default());
    let mut a = connect(&gateway, None);
    wait_for_sessions(&gateway, 1).await;

    a.send("anyone?");

    a.expect_silence().await;
    assert_eq!(gateway.session_count(), 1);
}

#[tokio::test]
async fn test_close_frame_unregisters_session() {
    let gateway = Arc::new(Gateway::default());
    let a = connect(&gateway, Some(1));
    let mut b = connect(&gateway, Some(2));
    wait_for_sessions(&gateway, 2).await;
    assert!(gateway.is_user_online(1));

    a.input.unbounded_send(Ok(Inbound::Close)).unwrap();

    assert_eq!(a.finish().await, CloseReason::PeerClosed);
    assert_eq!(gateway.session_count(), 1);
    assert!(!gateway.is_user_online(1));

    // The survivor's own frames now go nowhere.
    b.send("still here");
    b.expect_silence().await;
}

#[tokio::test]
async fn test_read_error_unregisters_session() {
    let gateway = Arc::new(Gateway::default());
    let a = connect(&gateway, None);
    wait_for_sessions(&gateway, 1).await;

    a.input
        .unbounded_send(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
        .unwrap();

    assert!(matches!(a.finish().await, CloseReason::ReadError(_)));
    assert_eq!(gateway.session_count(), 0);
}

#[tokio::test]
async fn test_end_of_stream_closes_outbound() {
    let gateway = Arc::new(Gateway::default());
    let Peer {
        input,
        mut output,
        task,
    } = connect(&gateway, None);
    wait_for_sessions(&gateway, 1).await;

    drop(input);

    let reason = assert_ok!(timeout(RECV_TIMEOUT, task).await.expect("session did not close"));
    assert_eq!(reason, CloseReason::EndOfStream);
    assert_eq!(output.next().await, None);
    assert_eq!(gateway.session_count(), 0);
}

#[tokio::test]
async fn test_silent_peer_times_out() {
    let gateway = gateway_with(WebSocketSettings {
        read_timeout_secs: 1,
        ..WebSocketSettings::default()
    });
    let a = connect(&gateway, None);
    wait_for_sessions(&gateway, 1).await;

    let reason = timeout(Duration::from_secs(5), a.task)
        .await
        .expect("idle session was not closed");

    assert_eq!(assert_ok!(reason), CloseReason::IdleTimeout);
    assert_eq!(gateway.session_count(), 0);
}

#[tokio::test]
async fn test_connection_cap_rejects_extra_sessions() {
    let gateway = gateway_with(WebSocketSettings {
        max_connections: 1,
        ..WebSocketSettings::default()
    });
    let _a = connect(&gateway, None);
    wait_for_sessions(&gateway, 1).await;

    let mut b = connect(&gateway, None);
    assert_eq!(b.output.next().await, None);

    assert_eq!(
        b.finish().await,
        CloseReason::Rejected(RegistryError::CapacityReached(1))
    );
    assert_eq!(gateway.session_count(), 1);
}

#[tokio::test]
async fn test_shutdown_closes_sessions_and_refuses_new_ones() {
    let gateway = Arc::new(Gateway::default());
    let mut a = connect(&gateway, Some(1));
    let mut b = connect(&gateway, Some(2));
    wait_for_sessions(&gateway, 2).await;

    assert_eq!(gateway.shutdown(), 2);

    assert_eq!(a.recv().await, None);
    assert_eq!(b.recv().await, None);
    assert_eq!(a.finish().await, CloseReason::WriterStopped);
    assert_eq!(b.finish().await, CloseReason::WriterStopped);

    let late = connect(&gateway, Some(3));
    assert_eq!(
        late.finish().await,
        CloseReason::Rejected(RegistryError::ShuttingDown)
    );
    assert_eq!(gateway.session_count(), 0);
}
