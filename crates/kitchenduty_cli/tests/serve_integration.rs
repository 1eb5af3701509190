//! Integration tests for the `kitchenduty serve` calendar feed.
//!
//! Each test starts the server as a child process on a unique port and
//! speaks plain HTTP/1.1 to it.

use std::io::Read;
use std::net::TcpStream;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tempfile::TempDir;

static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 30000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Kills the server when the test ends, pass or fail.
struct ServerGuard(Child);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn start_server(port: u16, dir: &TempDir) -> ServerGuard {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kitchenduty"));
    cmd.env_remove("KITCHENDUTY_CONFIG")
        .env_remove("KITCHENDUTY_REMOTE_URL")
        .env_remove("KITCHENDUTY_LOG_DIR")
        .arg("--db")
        .arg(dir.path().join("kitchenduty.db"))
        .arg("serve")
        .arg("--port")
        .arg(port.to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());

    let child = cmd.spawn().expect("failed to start kitchenduty serve");
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{port}")).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    ServerGuard(child)
}

/// Returns `(status, headers, body)`.
fn http_get(port: u16, path: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}")).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let request =
        format!("GET {path} HTTP/1.1\r\nHost: localhost:{port}\r\nConnection: close\r\n\r\n");
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    let (head, body) = response.split_once("\r\n\r\n").unwrap_or((&response, ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    (status, head.to_string(), body.to_string())
}

#[test]
fn calendar_feed_is_served_as_text_calendar() {
    let dir = TempDir::new().unwrap();
    let port = next_port();
    let _server = start_server(port, &dir);

    let (status, headers, body) = http_get(port, "/calendar.ics");
    assert_eq!(status, 200);
    assert!(headers
        .to_ascii_lowercase()
        .contains("content-type: text/calendar; charset=utf-8"));
    assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(body.ends_with("END:VCALENDAR\r\n"));
    assert!(body.matches("BEGIN:VEVENT").count() >= 13);
}

#[test]
fn health_and_unknown_routes() {
    let dir = TempDir::new().unwrap();
    let port = next_port();
    let _server = start_server(port, &dir);

    let (status, _, body) = http_get(port, "/health");
    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["roster_size"], 4);

    let (status, _, _) = http_get(port, "/nope");
    assert_eq!(status, 404);
}
