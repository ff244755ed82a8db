//! Shared test tools and helpers

#![allow(dead_code, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use namecheap_dns::{
    ContextConfig, DnsContext, HostRecord, RateLimiter, Record, RecordKind, RecordStore,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Skip the test when an environment variable is missing.
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("Skipping test: missing environment variable {}", $var);
                return;
            }
        )+
    };
}

/// Assert an `Option` is `Some` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

// ============ Data set ============

pub const IP_FOR_MAIL1: &str = "1.2.3.3";
pub const AN_IP_FOR_WWW: &str = "1.2.3.4";

pub const COUNT_OF_WWW_A: usize = 2;
pub const COUNT_OF_WWW_AAAA: usize = 1;
pub const COUNT_OF_A: usize = 4;
pub const COUNT_OF_AAAA: usize = 1;
pub const COUNT_OF_CNAME: usize = 1;
pub const COUNT_OF_MX: usize = 2;

/// Distinct lower-case names of the data set, sorted.
pub const INITIAL_NAMES: [&str; 5] = ["@", "mail1", "mail2", "www", "www-2"];

/// The eight records every model test starts from.
pub fn data_set_records() -> Vec<Record> {
    vec![
        Record::new(RecordKind::A, "www", AN_IP_FOR_WWW, 3600, 0),
        Record::new(RecordKind::A, "www", "4.3.2.1", 3600, 0),
        Record::new(RecordKind::Aaaa, "www", "0:1:2:3::4", 7200, 0),
        Record::new(RecordKind::A, "mail1", IP_FOR_MAIL1, 3600, 0),
        Record::new(RecordKind::A, "mail2", "4.3.2.2", 3600, 0),
        Record::new(RecordKind::Cname, "www-2", "www.example.com.", 3600, 0),
        Record::new(RecordKind::Mx, "@", "mail1.example.com.", 7200, 10),
        Record::new(RecordKind::Mx, "@", "mail2.example.com.", 7200, 20),
    ]
}

/// A shared store holding [`data_set_records`].
pub fn data_set() -> RecordStore {
    data_set_records().into_iter().collect()
}

/// Records of `kind` in `store`.
pub fn count_of(store: &RecordStore, kind: RecordKind) -> usize {
    store.filtered(|record| record.kind() == kind).len()
}

// ============ Mock API server ============

/// Minimal HTTP server answering API commands with canned XML.
///
/// Responses are queued per command name and consumed in order; every request body
/// is recorded.
pub struct MockServer {
    pub endpoint: String,
    state: Arc<ServerState>,
}

#[derive(Default)]
struct ServerState {
    responses: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    requests: Mutex<Vec<String>>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind mock server: {e}"));
        let address = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("mock server address: {e}"));
        let state = Arc::new(ServerState::default());

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let _ = handle_connection(socket, &state).await;
                });
            }
        });

        Self {
            endpoint: format!("http://{address}/xml.response"),
            state,
        }
    }

    /// Queue a response for `command` (e.g. `namecheap.domains.getList`).
    pub fn respond(&self, command: &str, status: u16, body: impl Into<String>) {
        self.state
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(command.to_string())
            .or_default()
            .push_back((status, body.into()));
    }

    /// Queue a successful `<ApiResponse>` wrapping `command_response`.
    pub fn respond_ok(&self, command: &str, command_response: &str) {
        self.respond(command, 200, ok_envelope(command_response));
    }

    /// Raw form bodies received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `Command` field of every request received so far.
    pub fn commands(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|body| form_value(body, "Command"))
            .collect()
    }

    /// Form field `key` of request `index`.
    pub fn param(&self, index: usize, key: &str) -> Option<String> {
        self.requests()
            .get(index)
            .and_then(|body| form_value(body, key))
    }

    /// Context pointed at this server, with its own limiter.
    pub fn context(&self) -> DnsContext {
        let context = DnsContext::builder(test_config())
            .endpoint(self.endpoint.clone())
            .rate_limiter(Arc::new(RateLimiter::new()))
            .max_wait(Duration::from_secs(5))
            .build();
        context.unwrap_or_else(|e| panic!("build context: {e}"))
    }
}

pub fn test_config() -> ContextConfig {
    ContextConfig::sandbox("tester", "0123456789abcdef", "127.0.0.1")
}

pub fn ok_envelope(command_response: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <RequestedCommand>test</RequestedCommand>
  {command_response}
  <Server>MOCK</Server>
  <ExecutionTime>0.01</ExecutionTime>
</ApiResponse>"#
    )
}

pub fn error_envelope(number: i32, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="ERROR" xmlns="http://api.namecheap.com/xml.response">
  <Errors><Error Number="{number}">{message}</Error></Errors>
</ApiResponse>"#
    )
}

pub fn form_value(body: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

async fn handle_connection(mut socket: TcpStream, state: &ServerState) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let read = socket.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = headers
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = socket.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let end = buffer.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buffer[header_end..end]).to_string();
    let command = form_value(&body, "Command").unwrap_or_default();
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body);

    let (status, reply) = state
        .responses
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_mut(&command)
        .and_then(VecDeque::pop_front)
        .unwrap_or_else(|| (500, format!("no canned response for {command}")));

    let response = format!(
        "HTTP/1.1 {status} Mock\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

// ============ Live API ============

/// Live sandbox context built from `NAMECHEAP_*` environment variables.
pub fn live_context() -> Option<DnsContext> {
    let api_user = env::var("NAMECHEAP_API_USER").ok()?;
    let api_key = env::var("NAMECHEAP_API_KEY").ok()?;
    let client_ip = env::var("NAMECHEAP_CLIENT_IP").ok()?;
    DnsContext::new(ContextConfig::sandbox(api_user, api_key, client_ip)).ok()
}
