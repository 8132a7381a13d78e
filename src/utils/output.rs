/// Bounded output collection
///
/// Each child stream is drained on its own thread. Bytes beyond the per-stream
/// ceiling are read and discarded so the child never blocks on a full pipe.
use std::io::{BufReader, Read};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

/// Appended to a stream that exceeded its ceiling
pub const TRUNCATION_MARKER: &str = "\n...[output truncated]";

/// Default per-stream ceiling (bytes)
pub const DEFAULT_STREAM_LIMIT: usize = 5000;

/// Bytes captured from one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamCapture {
    /// Retained bytes, at most the ceiling
    pub data: Vec<u8>,
    /// Bytes read in total, including discarded ones
    pub total_bytes: usize,
    /// Ceiling was exceeded
    pub truncated: bool,
}

impl StreamCapture {
    fn push(&mut self, chunk: &[u8], limit: usize) {
        self.total_bytes += chunk.len();
        let room = limit.saturating_sub(self.data.len());
        if chunk.len() > room {
            self.data.extend_from_slice(&chunk[..room]);
            self.truncated = true;
        } else {
            self.data.extend_from_slice(chunk);
        }
    }

    /// Lossy UTF-8 text with the truncation marker appended when needed
    pub fn into_text(self) -> String {
        let mut text = String::from_utf8_lossy(&self.data).into_owned();
        if self.truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        text
    }
}

/// Handle to a collector thread
pub struct StreamCollector {
    capture: Arc<Mutex<StreamCapture>>,
    eof: Receiver<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StreamCollector {
    /// Start draining `stream` with a ceiling of `limit` bytes
    pub fn spawn<R: Read + Send + 'static>(stream: R, limit: usize) -> Self {
        let capture = Arc::new(Mutex::new(StreamCapture::default()));
        let (tx, eof) = channel();
        let shared = Arc::clone(&capture);
        let handle = thread::spawn(move || {
            collect_stream(stream, limit, &shared);
            let _ = tx.send(());
        });
        Self {
            capture,
            eof,
            handle: Some(handle),
        }
    }

    /// Wait until EOF or `deadline`, whichever comes first, and return what
    /// was read. A stream still held open by a process outside the group is
    /// left to its detached thread.
    pub fn finish(mut self, deadline: Instant) -> StreamCapture {
        let wait = deadline.saturating_duration_since(Instant::now());
        match self.eof.recv_timeout(wait) {
            Ok(()) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("Output stream still open at collection deadline; keeping partial capture");
            }
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Output collector exited without reaching EOF");
            }
        }
        self.snapshot()
    }

    fn snapshot(&self) -> StreamCapture {
        match self.capture.lock() {
            Ok(capture) => capture.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

fn collect_stream<R: Read>(stream: R, limit: usize, capture: &Mutex<StreamCapture>) {
    let mut reader = BufReader::new(stream);
    let mut chunk = [0u8; 4096];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => match capture.lock() {
                Ok(mut capture) => capture.push(&chunk[..n], limit),
                Err(poisoned) => poisoned.into_inner().push(&chunk[..n], limit),
            },
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("Output stream read failed: {}", e);
                break;
            }
        }
    }
}
