//! Helpers shared by unit tests: runtime builders and a keep-alive HTTP/1.1
//! server that answers with a fixed cycle of status codes.
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::barrier::DoneSignal;

const READ_CHUNK: usize = 4096;
const HEADER_END: &[u8] = b"\r\n\r\n";
const CHUNKED_END: &[u8] = b"0\r\n\r\n";
const RESPONSE_BODY: &str = "OK";

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

pub(crate) fn run_multi_thread_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

#[derive(Debug, Default)]
struct ServerState {
    requests: AtomicU64,
    heads: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Vec<u8>>>,
}

pub(crate) struct TestServer {
    url: String,
    state: Arc<ServerState>,
    shutdown: DoneSignal,
}

impl TestServer {
    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn requests(&self) -> u64 {
        self.state.requests.load(Ordering::Acquire)
    }

    pub(crate) fn heads(&self) -> Vec<String> {
        self.state.heads.lock().clone()
    }

    pub(crate) fn bodies(&self) -> Vec<Vec<u8>> {
        self.state.bodies.lock().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.close();
    }
}

/// Starts a server that answers the n-th request with
/// `statuses[n % statuses.len()]`.
pub(crate) async fn spawn_test_server(statuses: Vec<u16>) -> Result<TestServer, String> {
    if statuses.is_empty() {
        return Err("status cycle must not be empty".to_owned());
    }
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;

    let state = Arc::new(ServerState::default());
    let shutdown = DoneSignal::new();
    let statuses: Arc<[u16]> = statuses.into();
    let cursor = Arc::new(AtomicU64::new(0));

    let accept_state = Arc::clone(&state);
    let accept_shutdown = shutdown.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = accept_shutdown.closed() => break,
                accepted = listener.accept() => {
                    let Ok((stream, _)) = accepted else { break };
                    let state = Arc::clone(&accept_state);
                    let statuses = Arc::clone(&statuses);
                    let cursor = Arc::clone(&cursor);
                    let shutdown = accept_shutdown.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            () = shutdown.closed() => {}
                            () = serve_connection(stream, state, statuses, cursor) => {}
                        }
                    });
                }
            }
        }
    });

    Ok(TestServer {
        url: format!("http://{}", addr),
        state,
        shutdown,
    })
}

async fn serve_connection(
    mut stream: TcpStream,
    state: Arc<ServerState>,
    statuses: Arc<[u16]>,
    cursor: Arc<AtomicU64>,
) {
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0_u8; READ_CHUNK];

    loop {
        let header_end = loop {
            if let Some(pos) = find(&buffer, HEADER_END) {
                break pos;
            }
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(read) => buffer.extend_from_slice(chunk.get(..read).unwrap_or_default()),
            }
        };
        let head = String::from_utf8_lossy(buffer.get(..header_end).unwrap_or_default())
            .into_owned();
        let body_start = header_end.saturating_add(HEADER_END.len());
        let lower = head.to_ascii_lowercase();

        let request_end = if lower.contains("transfer-encoding: chunked") {
            loop {
                let tail = buffer.get(body_start..).unwrap_or_default();
                if let Some(pos) = find(tail, CHUNKED_END) {
                    break body_start
                        .saturating_add(pos)
                        .saturating_add(CHUNKED_END.len());
                }
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(read) => buffer.extend_from_slice(chunk.get(..read).unwrap_or_default()),
                }
            }
        } else {
            let total = body_start.saturating_add(content_length(&lower));
            while buffer.len() < total {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(read) => buffer.extend_from_slice(chunk.get(..read).unwrap_or_default()),
                }
            }
            total
        };

        let body = buffer
            .get(body_start..request_end)
            .unwrap_or_default()
            .to_vec();
        buffer.drain(..request_end);

        let seq = cursor.fetch_add(1, Ordering::AcqRel);
        let len = u64::try_from(statuses.len()).unwrap_or(1);
        let index = usize::try_from(seq.checked_rem(len).unwrap_or(0)).unwrap_or(0);
        let status = statuses.get(index).copied().unwrap_or(200);

        state.heads.lock().push(head);
        state.bodies.lock().push(body);
        state.requests.fetch_add(1, Ordering::AcqRel);

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Length: {}\r\nConnection: keep-alive\r\n\r\n{}",
            status,
            RESPONSE_BODY.len(),
            RESPONSE_BODY
        );
        if stream.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn content_length(lower_head: &str) -> usize {
    lower_head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
