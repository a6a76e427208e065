// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use falcon_core::{AgentId, DomainEvent, EventKind, IssueId, OutputLine, ProjectId, RunId};
use futures_util::stream::{SplitSink, SplitStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type ClientWrite = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type ClientRead = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

struct Harness {
    addr: String,
    broadcast: BroadcastBus,
    output: OutputBus,
    _cancel: tokio_util::sync::DropGuard,
}

async fn start(configure: impl FnOnce(&mut TransportConfig)) -> Harness {
    let mut config = TransportConfig::new("sekrit");
    config.idle_timeout = Duration::from_secs(5);
    configure(&mut config);

    let broadcast = BroadcastBus::new();
    let output = OutputBus::new();
    let server = Arc::new(TransportServer::new(config, broadcast.clone(), output.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    tokio::spawn(Arc::clone(&server).run(listener, cancel.clone()));

    Harness {
        addr: addr.to_string(),
        broadcast,
        output,
        _cancel: cancel.drop_guard(),
    }
}

async fn connect(harness: &Harness) -> (ClientWrite, ClientRead) {
    let url = format!("ws://{}/ws?token=sekrit", harness.addr);
    let (ws, _) = connect_async(url).await.unwrap();
    let (write, mut read) = ws.split();
    // Swallow the connected frame.
    let first = next_frame(&mut read).await;
    assert_eq!(first["type"], "connected");
    assert!(first["clientId"].is_string());
    (write, read)
}

async fn next_frame(read: &mut ClientRead) -> serde_json::Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), read.next())
            .await
            .expect("frame timeout")
            .expect("stream ended")
            .expect("ws error");
        if let Message::Text(raw) = message {
            return serde_json::from_str(raw.as_str()).expect("frame json");
        }
    }
}

async fn send(write: &mut ClientWrite, raw: &str) {
    write.send(Message::text(raw.to_string())).await.unwrap();
}

#[tokio::test]
async fn rejects_missing_token() {
    let harness = start(|_| {}).await;
    let url = format!("ws://{}/ws", harness.addr);
    assert!(connect_async(url).await.is_err());
}

#[tokio::test]
async fn rejects_wrong_token() {
    let harness = start(|_| {}).await;
    let url = format!("ws://{}/ws?token=wrong", harness.addr);
    assert!(connect_async(url).await.is_err());
}

#[tokio::test]
async fn accepts_bearer_header() {
    let harness = start(|_| {}).await;
    let mut request =
        format!("ws://{}/ws", harness.addr).into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Authorization", "Bearer sekrit".parse().unwrap());
    let (ws, _) = connect_async(request).await.unwrap();
    let (_, mut read) = ws.split();
    assert_eq!(next_frame(&mut read).await["type"], "connected");
}

#[tokio::test]
async fn forbidden_origin_is_rejected() {
    let harness =
        start(|c| c.allowed_origins = Some(vec!["https://ok.example".to_string()])).await;

    let mut request =
        format!("ws://{}/ws?token=sekrit", harness.addr).into_client_request().unwrap();
    request.headers_mut().insert("Origin", "https://evil.example".parse().unwrap());
    assert!(connect_async(request).await.is_err());

    let mut request =
        format!("ws://{}/ws?token=sekrit", harness.addr).into_client_request().unwrap();
    request.headers_mut().insert("Origin", "https://ok.example".parse().unwrap());
    assert!(connect_async(request).await.is_ok());
}

#[tokio::test]
async fn ping_pong() {
    let harness = start(|_| {}).await;
    let (mut write, mut read) = connect(&harness).await;
    send(&mut write, r#"{"type":"ping"}"#).await;
    assert_eq!(next_frame(&mut read).await["type"], "pong");
}

#[tokio::test]
async fn unknown_frame_answers_error_without_closing() {
    let harness = start(|_| {}).await;
    let (mut write, mut read) = connect(&harness).await;

    send(&mut write, r#"{"type":"teleport"}"#).await;
    assert_eq!(next_frame(&mut read).await["type"], "error");

    // Still alive.
    send(&mut write, r#"{"type":"ping"}"#).await;
    assert_eq!(next_frame(&mut read).await["type"], "pong");
}

#[tokio::test]
async fn subscribe_receives_broadcast_events() {
    let harness = start(|_| {}).await;
    let (mut write, mut read) = connect(&harness).await;

    let project = ProjectId::new();
    let channel = format!("project:{}", project);
    send(&mut write, &format!(r#"{{"type":"subscribe","channel":"{}"}}"#, channel)).await;
    let subscribed = next_frame(&mut read).await;
    assert_eq!(subscribed["type"], "subscribed");
    assert_eq!(subscribed["channel"], channel.as_str());

    harness.broadcast.publish_scoped(DomainEvent {
        kind: EventKind::IssueCreated,
        at: 42,
        project_id: project,
        issue_id: None,
        payload: serde_json::json!({"title": "new issue"}),
    });

    let event = next_frame(&mut read).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["event"], "issue.created");
    assert_eq!(event["data"]["at"], 42);
}

#[tokio::test]
async fn run_channel_lifts_output_lines() {
    let harness = start(|_| {}).await;
    let (mut write, mut read) = connect(&harness).await;

    let run_id = RunId::new();
    let channel = format!("run:{}", run_id);
    send(&mut write, &format!(r#"{{"type":"subscribe","channel":"{}"}}"#, channel)).await;
    assert_eq!(next_frame(&mut read).await["type"], "subscribed");

    harness.output.publish(OutputLine {
        run_id,
        agent_id: AgentId::from_string("agt-1"),
        issue_id: IssueId::new(),
        line: "building...".to_string(),
        at: 7,
    });

    let event = next_frame(&mut read).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["event"], "agent.output");
    assert_eq!(event["data"]["line"], "building...");
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let harness = start(|_| {}).await;
    let (mut write, mut read) = connect(&harness).await;

    let project = ProjectId::new();
    let channel = format!("project:{}", project);
    send(&mut write, &format!(r#"{{"type":"subscribe","channel":"{}"}}"#, channel)).await;
    assert_eq!(next_frame(&mut read).await["type"], "subscribed");
    send(&mut write, &format!(r#"{{"type":"unsubscribe","channel":"{}"}}"#, channel)).await;
    assert_eq!(next_frame(&mut read).await["type"], "unsubscribed");

    harness.broadcast.publish(
        &Channel::Project(project),
        DomainEvent {
            kind: EventKind::ProjectUpdated,
            at: 1,
            project_id: project,
            issue_id: None,
            payload: serde_json::Value::Null,
        },
    );

    // Nothing arrives; a ping round-trip proves the channel is quiet.
    send(&mut write, r#"{"type":"ping"}"#).await;
    assert_eq!(next_frame(&mut read).await["type"], "pong");
}

#[tokio::test]
async fn subscription_cap_is_enforced() {
    let harness = start(|c| c.max_subscriptions = 1).await;
    let (mut write, mut read) = connect(&harness).await;

    let first = format!("project:{}", ProjectId::new());
    send(&mut write, &format!(r#"{{"type":"subscribe","channel":"{}"}}"#, first)).await;
    assert_eq!(next_frame(&mut read).await["type"], "subscribed");

    let second = format!("project:{}", ProjectId::new());
    send(&mut write, &format!(r#"{{"type":"subscribe","channel":"{}"}}"#, second)).await;
    let reply = next_frame(&mut read).await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().contains("subscription limit"));
}

#[tokio::test]
async fn bad_channel_is_an_error_frame() {
    let harness = start(|_| {}).await;
    let (mut write, mut read) = connect(&harness).await;
    send(&mut write, r#"{"type":"subscribe","channel":"nonsense"}"#).await;
    assert_eq!(next_frame(&mut read).await["type"], "error");
}

#[tokio::test]
async fn per_ip_connection_cap() {
    let harness = start(|c| c.max_connections_per_ip = 1).await;
    let (_write, _read) = connect(&harness).await;

    let url = format!("ws://{}/ws?token=sekrit", harness.addr);
    assert!(connect_async(url).await.is_err(), "second connection should be refused");
}

#[tokio::test]
async fn idle_connection_is_closed() {
    let harness = start(|c| c.idle_timeout = Duration::from_millis(100)).await;
    let (_write, mut read) = connect(&harness).await;

    // With no traffic, the server closes; the stream ends.
    let next = tokio::time::timeout(Duration::from_secs(5), read.next()).await.unwrap();
    match next {
        None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
        other => panic!("expected close, got {other:?}"),
    }
}
