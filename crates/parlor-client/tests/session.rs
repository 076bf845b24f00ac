//! End-to-end session behavior over a channel-backed fake stream.
//!
//! The fakes stand in for the split WebSocket halves: the test plays the
//! server by feeding frames into the read half and observing what the
//! session writes.

use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use parlor_client::config::ClientConfig;
use parlor_client::session::Session;
use parlor_core::protocol::types::{AuthCommand, NickCommand, PingReply, SendCommand};
use parlor_core::protocol::{decode, Packet, PacketType};
use parlor_core::ParlorError;

type ServerTx = UnboundedSender<Result<Message, String>>;
type Outbound = UnboundedReceiver<Message>;

fn test_config(passcode: Option<&str>) -> ClientConfig {
    ClientConfig {
        room: "testing".into(),
        nick: "parlor".into(),
        passcode: passcode.map(str::to_owned),
        connect: Default::default(),
        session: Default::default(),
    }
}

fn start_session(cfg: &ClientConfig) -> (Session, ServerTx, Outbound) {
    let (server_tx, read) = mpsc::unbounded();
    let (write, outbound) = mpsc::unbounded();
    let session = Session::start(read, write, cfg);
    (session, server_tx, outbound)
}

fn inject(server_tx: &ServerTx, frame: &str) {
    server_tx
        .unbounded_send(Ok(Message::Text(frame.to_owned().into())))
        .expect("session dropped its read half");
}

async fn next_packet(outbound: &mut Outbound) -> Packet {
    let message = timeout(Duration::from_secs(1), outbound.next())
        .await
        .expect("timed out waiting for an outbound frame")
        .expect("outbound stream ended");
    let Message::Text(frame) = message else {
        panic!("expected a text frame, got {message:?}");
    };
    decode(frame.as_str()).expect("outbound frame must decode")
}

/// Let the session tasks settle, then assert nothing else was written.
async fn assert_no_outbound(outbound: &mut Outbound) {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    match outbound.try_next() {
        Err(_) => {} // empty and still open
        Ok(Some(message)) => panic!("unexpected outbound frame: {message:?}"),
        Ok(None) => panic!("outbound stream closed"),
    }
}

#[tokio::test]
async fn startup_sends_only_nick_without_passcode() {
    let (_session, _server_tx, mut outbound) = start_session(&test_config(None));

    let packet = next_packet(&mut outbound).await;
    assert_eq!(packet.kind, PacketType::Nick);
    let nick: NickCommand = packet.payload_as(PacketType::Nick).unwrap();
    assert_eq!(nick.name, "parlor");

    assert_no_outbound(&mut outbound).await;
}

#[tokio::test]
async fn empty_passcode_sends_no_auth() {
    let (_session, _server_tx, mut outbound) = start_session(&test_config(Some("")));

    let packet = next_packet(&mut outbound).await;
    assert_eq!(packet.kind, PacketType::Nick);

    assert_no_outbound(&mut outbound).await;
}

#[tokio::test]
async fn startup_sends_auth_and_nick_with_passcode() {
    let (_session, _server_tx, mut outbound) = start_session(&test_config(Some("xyz")));

    let first = next_packet(&mut outbound).await;
    let second = next_packet(&mut outbound).await;
    assert_ne!(first.id, second.id);

    // The two startup commands race; accept either order.
    let (auth, nick) = if first.kind == PacketType::Auth {
        (first, second)
    } else {
        (second, first)
    };
    assert_eq!(nick.kind, PacketType::Nick);
    let auth: AuthCommand = auth.payload_as(PacketType::Auth).unwrap();
    assert_eq!(auth.mechanism, "passcode");
    assert_eq!(auth.passcode, "xyz");

    assert_no_outbound(&mut outbound).await;
}

#[tokio::test]
async fn heartbeat_is_echoed_exactly_once() {
    let (_session, server_tx, mut outbound) = start_session(&test_config(None));
    next_packet(&mut outbound).await; // nick

    inject(
        &server_tx,
        r#"{"id":"0","type":"ping-event","data":{"time":1000}}"#,
    );

    let reply = next_packet(&mut outbound).await;
    assert_eq!(reply.kind, PacketType::PingReply);
    let pong: PingReply = reply.payload_as(PacketType::PingReply).unwrap();
    assert_eq!(pong.time, 1000);

    assert_no_outbound(&mut outbound).await;
}

#[tokio::test]
async fn unknown_tags_are_dropped_without_killing_the_dispatcher() {
    let (_session, server_tx, mut outbound) = start_session(&test_config(None));
    next_packet(&mut outbound).await; // nick

    inject(
        &server_tx,
        r#"{"id":"5","type":"snapshot-event","data":{"log":[]}}"#,
    );
    assert_no_outbound(&mut outbound).await;

    // The dispatcher is still alive: a later heartbeat gets its reply.
    inject(
        &server_tx,
        r#"{"id":"6","type":"ping-event","data":{"time":77}}"#,
    );
    let reply = next_packet(&mut outbound).await;
    let pong: PingReply = reply.payload_as(PacketType::PingReply).unwrap();
    assert_eq!(pong.time, 77);
}

#[tokio::test]
async fn outbound_commands_keep_enqueue_order() {
    let (session, _server_tx, mut outbound) = start_session(&test_config(None));
    let handle = session.handle();
    next_packet(&mut outbound).await; // nick

    handle.send_message("one", "").await.unwrap();
    handle.send_message("two", "").await.unwrap();
    handle.send_message("three", "02parent").await.unwrap();

    for (content, parent) in [("one", ""), ("two", ""), ("three", "02parent")] {
        let packet = next_packet(&mut outbound).await;
        let send: SendCommand = packet.payload_as(PacketType::Send).unwrap();
        assert_eq!(send.content, content);
        assert_eq!(send.parent, parent);
    }
}

#[tokio::test]
async fn malformed_frame_is_fatal_as_decode_error() {
    let (session, server_tx, _outbound) = start_session(&test_config(None));

    inject(&server_tx, "{not json");

    let err = timeout(Duration::from_secs(1), session.run())
        .await
        .expect("session should die promptly")
        .unwrap_err();
    assert!(matches!(err, ParlorError::Decode(_)));
}

#[tokio::test]
async fn read_error_is_fatal_as_transport_error() {
    let (session, server_tx, _outbound) = start_session(&test_config(None));

    server_tx
        .unbounded_send(Err("connection reset".into()))
        .unwrap();

    let err = timeout(Duration::from_secs(1), session.run())
        .await
        .expect("session should die promptly")
        .unwrap_err();
    assert!(matches!(err, ParlorError::Transport(_)));
}

#[tokio::test]
async fn malformed_heartbeat_payload_is_fatal_as_protocol_violation() {
    let (session, server_tx, _outbound) = start_session(&test_config(None));

    inject(
        &server_tx,
        r#"{"id":"0","type":"ping-event","data":{"time":"soon"}}"#,
    );

    let err = timeout(Duration::from_secs(1), session.run())
        .await
        .expect("session should die promptly")
        .unwrap_err();
    assert!(matches!(err, ParlorError::ProtocolViolation(_)));
}

#[tokio::test]
async fn shutdown_winds_every_task_down_cleanly() {
    let (session, _server_tx, mut outbound) = start_session(&test_config(None));
    let handle = session.handle();
    next_packet(&mut outbound).await; // nick

    handle.shutdown();

    let result = timeout(Duration::from_secs(1), session.run())
        .await
        .expect("shutdown should complete promptly");
    assert!(result.is_ok());
}
