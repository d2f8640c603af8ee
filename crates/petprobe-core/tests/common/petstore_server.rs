//! Minimal HTTP/1.1 Pet Store mock with fault injection for integration tests.
//!
//! Keeps pets in memory and supports POST/GET/PUT/DELETE on /pet. Options
//! inject the failure modes the harness has to survive: leading 500s,
//! rate limiting with Retry-After, updates that are acknowledged but
//! dropped, and api_key enforcement.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;

const EXPECTED_API_KEY: &str = "special-key";

#[derive(Debug, Clone, Copy)]
pub struct PetServerOptions {
    /// Serve this many 500s on GET /pet/{id} before behaving.
    pub fail_first_gets: u32,
    /// Serve this many 429s on GET /pet/{id} before behaving.
    pub rate_limit_first_gets: u32,
    /// Retry-After value sent with each 429.
    pub retry_after_secs: u64,
    /// Acknowledge PUT /pet with 200 but drop the update.
    pub lie_on_update: bool,
    /// Reject requests whose api_key header does not match the known key.
    pub require_api_key: bool,
}

impl Default for PetServerOptions {
    fn default() -> Self {
        Self {
            fail_first_gets: 0,
            rate_limit_first_gets: 0,
            retry_after_secs: 1,
            lie_on_update: false,
            require_api_key: false,
        }
    }
}

struct ServerState {
    pets: Mutex<HashMap<u64, Value>>,
    gets: AtomicU32,
    remaining_get_failures: AtomicU32,
    remaining_rate_limits: AtomicU32,
    opts: PetServerOptions,
}

/// Handle to a running mock server.
pub struct PetServer {
    /// Base URL without a trailing slash, e.g. "http://127.0.0.1:12345".
    pub base_url: String,
    state: Arc<ServerState>,
}

impl PetServer {
    /// Number of GET /pet/{id} requests served, faulted ones included.
    pub fn gets_served(&self) -> u32 {
        self.state.gets.load(Ordering::SeqCst)
    }

    /// Current stored record for a pet, if any.
    pub fn pet(&self, id: u64) -> Option<Value> {
        self.state.pets.lock().unwrap().get(&id).cloned()
    }
}

/// Starts a well-behaved server in a background thread. The server runs
/// until the process exits.
pub fn start() -> PetServer {
    start_with_options(PetServerOptions::default())
}

/// Like `start` but with fault injection configured.
pub fn start_with_options(opts: PetServerOptions) -> PetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(ServerState {
        pets: Mutex::new(HashMap::new()),
        gets: AtomicU32::new(0),
        remaining_get_failures: AtomicU32::new(opts.fail_first_gets),
        remaining_rate_limits: AtomicU32::new(opts.rate_limit_first_gets),
        opts,
    });
    let accept_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&accept_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    PetServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    }
}

fn handle(mut stream: TcpStream, state: &ServerState) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    let request_line = head.lines().next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");

    if state.opts.require_api_key && header_value(&head, "api_key") != Some(EXPECTED_API_KEY) {
        respond(
            &mut stream,
            "401 Unauthorized",
            &[],
            br#"{"code":401,"message":"invalid api_key"}"#,
        );
        return;
    }

    match (method, path) {
        ("POST", "/pet") => handle_upsert(&mut stream, state, &body, false),
        ("PUT", "/pet") => handle_upsert(&mut stream, state, &body, true),
        ("GET", p) if p.starts_with("/pet/") => handle_get(&mut stream, state, p),
        ("DELETE", p) if p.starts_with("/pet/") => handle_delete(&mut stream, state, p),
        _ => respond(
            &mut stream,
            "405 Method Not Allowed",
            &[],
            br#"{"code":405,"message":"unsupported"}"#,
        ),
    }
}

fn handle_upsert(stream: &mut TcpStream, state: &ServerState, body: &[u8], is_update: bool) {
    let Ok(pet) = serde_json::from_slice::<Value>(body) else {
        respond(
            stream,
            "400 Bad Request",
            &[],
            br#"{"code":400,"message":"invalid JSON"}"#,
        );
        return;
    };
    let id = pet.get("id").and_then(Value::as_u64).unwrap_or(0);
    let name_ok = pet
        .get("name")
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);
    if id == 0 || !name_ok {
        respond(
            stream,
            "400 Bad Request",
            &[],
            br#"{"code":400,"message":"invalid pet"}"#,
        );
        return;
    }
    if !(is_update && state.opts.lie_on_update) {
        state.pets.lock().unwrap().insert(id, pet.clone());
    }
    let echo = serde_json::to_vec(&pet).unwrap();
    respond(stream, "200 OK", &[], &echo);
}

fn handle_get(stream: &mut TcpStream, state: &ServerState, path: &str) {
    state.gets.fetch_add(1, Ordering::SeqCst);
    if take_one(&state.remaining_rate_limits) {
        let retry_after = state.opts.retry_after_secs.to_string();
        respond(
            stream,
            "429 Too Many Requests",
            &[("Retry-After", &retry_after)],
            br#"{"code":429,"message":"rate limited"}"#,
        );
        return;
    }
    if take_one(&state.remaining_get_failures) {
        respond(
            stream,
            "500 Internal Server Error",
            &[],
            br#"{"code":500,"message":"injected failure"}"#,
        );
        return;
    }
    let id = path.trim_start_matches("/pet/").parse::<u64>().ok();
    let found = id.and_then(|id| state.pets.lock().unwrap().get(&id).cloned());
    match found {
        Some(pet) => {
            let body = serde_json::to_vec(&pet).unwrap();
            respond(stream, "200 OK", &[], &body);
        }
        None => respond(
            stream,
            "404 Not Found",
            &[],
            br#"{"code":1,"type":"error","message":"Pet not found"}"#,
        ),
    }
}

fn handle_delete(stream: &mut TcpStream, state: &ServerState, path: &str) {
    let id = path.trim_start_matches("/pet/").parse::<u64>().ok();
    let removed = id.and_then(|id| state.pets.lock().unwrap().remove(&id));
    match removed {
        Some(_) => respond(
            stream,
            "200 OK",
            &[],
            br#"{"code":200,"type":"unknown","message":"deleted"}"#,
        ),
        None => respond(
            stream,
            "404 Not Found",
            &[],
            br#"{"code":1,"type":"error","message":"Pet not found"}"#,
        ),
    }
}

/// Decrement `counter` if it is nonzero. True when a unit was taken.
fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Read one request: headers up to the blank line, then Content-Length
/// bytes of body.
fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > 64 * 1024 {
            return None;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = header_value(&head, "content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }
    body.truncate(content_length);
    Some((head, body))
}

fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines()
        .skip(1)
        .filter_map(|l| l.split_once(':'))
        .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
        .map(|(_, v)| v.trim())
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &[(&str, &str)], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in extra_headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
