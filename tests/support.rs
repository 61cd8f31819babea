use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK";

/// Keep-alive HTTP/1.1 server answering every body-less request with 200.
pub struct ServerHandle {
    hits: Arc<AtomicU64>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Requests answered so far.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Acquire)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP server for tests.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let hits = Arc::new(AtomicU64::new(0));
    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let server_hits = Arc::clone(&hits);
    let handle = thread::spawn(move || {
        while matches!(shutdown_rx.try_recv(), Err(mpsc::TryRecvError::Empty)) {
            match listener.accept() {
                Ok((stream, _)) => {
                    let hits = Arc::clone(&server_hits);
                    thread::spawn(move || serve_connection(stream, &hits));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            hits,
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// Spawn a test server or skip when socket permissions are unavailable.
///
/// # Errors
///
/// Returns an error if the server fails for reasons other than insufficient
/// socket permissions.
pub fn spawn_http_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_http_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn serve_connection(mut stream: TcpStream, hits: &AtomicU64) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(read) => read,
        };
        pending.extend(chunk.iter().take(read));
        while let Some(end) = pending.windows(4).position(|window| window == b"\r\n\r\n") {
            pending.drain(..end.saturating_add(4));
            hits.fetch_add(1, Ordering::AcqRel);
            if stream.write_all(RESPONSE).is_err() {
                return;
            }
        }
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `volley` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_volley<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = volley_bin()?;
    Command::new(bin)
        .args(args)
        .env("VOLLEY_LOG", "error")
        .output()
        .map_err(|err| format!("run volley failed: {}", err))
}

/// Fails with both output streams when the run did not succeed.
///
/// # Errors
///
/// Returns an error carrying stdout and stderr on a non-zero exit.
pub fn expect_success(output: &Output) -> Result<String, String> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(stdout)
}

fn volley_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_volley").map_or_else(
        || Err("CARGO_BIN_EXE_volley missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
