#![cfg(feature = "cli")]

use std::process::{Command, Output};
use std::thread;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::protocol::Message;

const SUBPROTOCOL_HEADER: &str = "Sec-WebSocket-Protocol";

fn jennyio(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jennyio"))
        .args(args)
        .env_remove("JENNYIO_PAGE_URL")
        .env_remove("JENNYIO_LOG")
        .output()
        .expect("jennyio binary should run")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().last().expect("stdout should have a line");
    serde_json::from_str(line).expect("stdout should be JSON")
}

fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    listener
        .local_addr()
        .expect("listener should have address")
        .port()
}

/// Accept one connection, reply to the first published message on the same
/// channel, and return every frame the client sent before closing.
fn spawn_echo_server() -> (String, thread::JoinHandle<Vec<Value>>) {
    let std_listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    std_listener
        .set_nonblocking(true)
        .expect("listener should become nonblocking");
    let addr = std_listener
        .local_addr()
        .expect("listener should have address");

    let handle = thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime should build");
        runtime.block_on(async move {
            let listener =
                TcpListener::from_std(std_listener).expect("listener should convert");
            let (stream, _) = listener.accept().await.expect("server should accept");
            let mut ws = accept_hdr_async(stream, |request: &Request, mut response: Response| {
                if let Some(offered) = request.headers().get(SUBPROTOCOL_HEADER) {
                    response
                        .headers_mut()
                        .insert(SUBPROTOCOL_HEADER, offered.clone());
                }
                Ok(response)
            })
            .await
            .expect("websocket handshake should succeed");

            let mut frames = Vec::new();
            while let Some(Ok(message)) = ws.next().await {
                let Message::Text(text) = message else {
                    continue;
                };
                let frame: Value = serde_json::from_str(&text).expect("frames should be JSON");
                if frame["type"] == "message" {
                    let reply = json!({
                        "type": "message",
                        "channel": frame["channel"],
                        "data": {"echo": frame["data"]},
                    });
                    let _ = ws.send(Message::text(reply.to_string())).await;
                }
                frames.push(frame);
            }
            frames
        })
    });

    (format!("http://{addr}/console"), handle)
}

#[test]
fn endpoint_prints_derived_socket_url() {
    let output = jennyio(&["endpoint", "https://console.example:9443/jobs", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let out = stdout_json(&output);
    assert_eq!(out["endpoint"], "wss://console.example:9443/io/io");
    assert_eq!(out["protocol"], "monitor");
}

#[test]
fn endpoint_rejects_file_page() {
    let output = jennyio(&["endpoint", "file:///srv/index.html"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_reports_package_version() {
    let output = jennyio(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("jennyio {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn send_rejects_invalid_json_payload() {
    let page = format!("http://127.0.0.1:{}/", unused_port());
    let output = jennyio(&["send", &page, "-c", "toast", "--json", "{oops"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn send_to_unreachable_console_is_transport_error() {
    let page = format!("http://127.0.0.1:{}/", unused_port());
    let output = jennyio(&["send", &page, "-c", "toast", "--data", "hi", "--timeout", "5s"]);
    assert_eq!(
        output.status.code(),
        Some(3),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn send_wait_prints_reply() {
    let (page, server) = spawn_echo_server();
    let output = jennyio(&[
        "send",
        &page,
        "-c",
        "jobs.export",
        "--json",
        r#"{"val":50}"#,
        "--wait",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let out = stdout_json(&output);
    assert_eq!(out["event"], "message");
    assert_eq!(out["channel"], "jobs.export");
    assert_eq!(out["data"], json!({"echo": {"val": 50}}));

    let frames = server.join().expect("server thread should not panic");
    assert_eq!(
        frames,
        vec![
            json!({"type": "subscribe", "channel": "jobs.export"}),
            json!({"type": "message", "channel": "jobs.export", "data": {"val": 50}}),
            json!({"type": "unsubscribe", "channel": "jobs.export"}),
        ]
    );
}
