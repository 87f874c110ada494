//! Common test utilities: a minimal canned-response HTTP server.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A tiny HTTP/1.1 server that answers every connection with one canned
/// response and records the raw request head it received.
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
enum Behavior {
    Respond { status: u16, body: String },
    Stall,
}

impl TestServer {
    /// Serve `status` with `body` for every request.
    pub fn respond_with(status: u16, body: &str) -> Self {
        Self::start(Behavior::Respond {
            status,
            body: body.to_string(),
        })
    }

    /// Accept connections and read the request, but never answer.
    pub fn stall() -> Self {
        Self::start(Behavior::Stall)
    }

    fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind test server");
        let addr = listener.local_addr().expect("test server has no address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let behavior = behavior.clone();
                let seen = Arc::clone(&seen);
                thread::spawn(move || handle(stream, behavior, &seen));
            }
        });
        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Raw request heads received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Look up a header value (case-insensitive name) in a recorded head.
    pub fn header_value(head: &str, name: &str) -> Option<String> {
        head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

fn handle(mut stream: TcpStream, behavior: Behavior, seen: &Mutex<Vec<String>>) {
    // GET requests carry no body, so the head ends the request.
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => break,
        }
    }
    seen.lock()
        .unwrap()
        .push(String::from_utf8_lossy(&head).into_owned());

    match behavior {
        Behavior::Respond { status, body } => {
            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                500 => "Internal Server Error",
                _ => "Status",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
        Behavior::Stall => {
            // Hold the connection open well past any test timeout.
            thread::sleep(Duration::from_secs(10));
        }
    }
}
