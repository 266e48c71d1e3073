mod common;

use common::{MockRunner, Reply};
use outlook_calendar::bridge::Action;
use outlook_calendar::components::outlook_calendar::{OutlookCalendarClient, OutlookCalendarHandle};
use outlook_calendar::error::CalendarResult;
use outlook_calendar::server::{McpServer, SERVER_NAME};
use rmcp::model::{CallToolRequestParams, CallToolResult, RawContent};
use rmcp::service::RunningService;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Session {
    client: RunningService<RoleClient, ()>,
    shutdown: CancellationToken,
    server: JoinHandle<CalendarResult<()>>,
}

fn start_server(
    runner: Arc<MockRunner>,
) -> (tokio::io::DuplexStream, CancellationToken, JoinHandle<CalendarResult<()>>) {
    let handle = OutlookCalendarHandle::new(OutlookCalendarClient::new(runner));
    let shutdown = CancellationToken::new();
    let (server_io, client_io) = tokio::io::duplex(1 << 16);
    let (reader, writer) = tokio::io::split(server_io);
    let server = tokio::spawn(McpServer::new(handle, shutdown.clone()).serve(reader, writer));
    (client_io, shutdown, server)
}

/// Start a server over in-memory pipes and connect a client to it
async fn connect(runner: Arc<MockRunner>) -> Session {
    let (client_io, shutdown, server) = start_server(runner);
    let client = ().serve(tokio::io::split(client_io)).await.unwrap();
    Session {
        client,
        shutdown,
        server,
    }
}

async fn call(session: &Session, name: &str, arguments: Value) -> CallToolResult {
    session
        .client
        .call_tool({
            let mut params = CallToolRequestParams::new(name.to_string());
            params.arguments = arguments.as_object().cloned();
            params
        })
        .await
        .unwrap()
}

fn text_of(result: &CallToolResult) -> String {
    match &*result.content[0] {
        RawContent::Text(text) => text.text.clone(),
        other => panic!("unexpected content: {:?}", other),
    }
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let session = connect(Arc::new(MockRunner::new())).await;

    let server_info = session.client.peer_info().unwrap();
    assert_eq!(server_info.server_info.name, SERVER_NAME);
    assert!(server_info.capabilities.tools.is_some());

    let tools = session.client.list_tools(Default::default()).await.unwrap();
    let names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "outlook_list_events",
            "outlook_get_event",
            "outlook_create_event",
            "outlook_update_event",
            "outlook_delete_event",
            "outlook_search_events"
        ]
    );
    let create = &tools.tools[2];
    assert_eq!(create.input_schema["properties"]["isAllDay"]["default"], false);

    session.client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_tool_call_returns_pretty_json_text() {
    let runner = Arc::new(MockRunner::new().reply(
        Action::Search,
        Reply::Payload(json!([{"id": "7", "subject": "Budget review", "start": "2024-06-01T09:00:00", "end": "2024-06-01T10:00:00"}])),
    ));
    let session = connect(runner.clone()).await;

    let result = call(&session, "outlook_search_events", json!({"query": "budget"})).await;

    assert_ne!(result.is_error, Some(true));
    let text = text_of(&result);
    let events: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(events[0]["subject"], "Budget review");
    assert!(text.contains('\n'), "result should be pretty-printed");
    assert_eq!(runner.calls()[0].args, vec!["-Query", "budget"]);

    session.client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_tool_failures_are_error_flagged_text() {
    let runner = Arc::new(
        MockRunner::new().reply(Action::Get, Reply::Failure("mailbox not found".to_string())),
    );
    let session = connect(runner).await;

    let failed = call(&session, "outlook_get_event", json!({"eventId": "X"})).await;
    assert_eq!(failed.is_error, Some(true));
    assert_eq!(text_of(&failed), "Error: mailbox not found");

    let invalid = call(&session, "outlook_get_event", json!({})).await;
    assert_eq!(invalid.is_error, Some(true));
    assert!(text_of(&invalid).contains("eventId"));

    let unknown = call(&session, "outlook_send_mail", json!({})).await;
    assert_eq!(unknown.is_error, Some(true));
    assert!(text_of(&unknown).contains("Unknown tool: outlook_send_mail"));

    // The session survives every failure
    let tools = session.client.list_tools(Default::default()).await.unwrap();
    assert_eq!(tools.tools.len(), 6);

    session.client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_session_ends_when_client_disconnects() {
    let session = connect(Arc::new(MockRunner::new())).await;
    session.client.cancel().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), session.server)
        .await
        .expect("server did not notice the disconnect")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_serving_with_a_call_in_flight() {
    let runner = Arc::new(MockRunner::new().reply(Action::List, Reply::Hang));
    let session = connect(runner.clone()).await;

    let peer = session.client.peer().clone();
    let pending = tokio::spawn(async move {
        peer.call_tool(CallToolRequestParams::new("outlook_list_events"))
        .await
    });
    wait_for(|| runner.calls().len() == 1).await;

    session.shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), session.server)
        .await
        .expect("server ignored shutdown")
        .unwrap()
        .unwrap();

    wait_for(|| runner.abandoned.load(Ordering::SeqCst)).await;
    pending.abort();
}

/// A `notifications/cancelled` for a running call stops its script run
#[tokio::test]
async fn test_cancelled_call_stops_the_run() {
    let runner = Arc::new(MockRunner::new().reply(Action::List, Reply::Hang));
    let (client_io, shutdown, server) = start_server(runner.clone());
    let (client_read, mut client_write) = tokio::io::split(client_io);
    let mut lines = BufReader::new(client_read).lines();

    send(
        &mut client_write,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "0"}
        }}),
    )
    .await;
    let reply: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["serverInfo"]["name"], SERVER_NAME);

    send(
        &mut client_write,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    )
    .await;
    send(
        &mut client_write,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "outlook_list_events"}}),
    )
    .await;
    wait_for(|| runner.calls().len() == 1).await;
    assert!(!runner.abandoned.load(Ordering::SeqCst));

    send(
        &mut client_write,
        json!({"jsonrpc": "2.0", "method": "notifications/cancelled", "params": {"requestId": 2, "reason": "user aborted"}}),
    )
    .await;
    wait_for(|| runner.abandoned.load(Ordering::SeqCst)).await;

    shutdown.cancel();
    server.await.unwrap().unwrap();
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, message: Value) {
    let mut line = message.to_string();
    line.push('\n');
    writer.write_all(line.as_bytes()).await.unwrap();
    writer.flush().await.unwrap();
}

async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..250 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached within 5s");
}
