// src/exec/capture.rs

//! Background capture of a child's stdout/stderr.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::LaunchSpec;

/// A stream being drained into memory.
///
/// Lines are accumulated as they arrive so that whatever was read is still
/// available if the pipe stays open after the child exited (e.g. a
/// backgrounded grandchild inherited it).
pub struct CapturedStream {
    buf: Arc<Mutex<String>>,
    task: JoinHandle<()>,
    stream: &'static str,
}

impl CapturedStream {
    pub fn spawn<R>(reader: R, spec: &LaunchSpec, stream: &'static str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&buf);
        let label = spec.to_string();

        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        debug!(process = %label, stream, "{}", line);
                        if let Ok(mut guard) = sink.lock() {
                            guard.push_str(&line);
                            guard.push('\n');
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!(process = %label, stream, error = %e, "stopped reading child output");
                        break;
                    }
                }
            }
        });

        Self { buf, task, stream }
    }

    /// Wait up to `grace` for EOF, then return everything read so far.
    pub async fn finish(self, grace: Duration) -> String {
        let Self { buf, task, stream } = self;

        let abort = task.abort_handle();
        if tokio::time::timeout(grace, task).await.is_err() {
            warn!(stream, "child output still open after exit; truncating capture");
            abort.abort();
        }

        match buf.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

/// Finish an optional capture, yielding an empty string when the pipe was
/// never attached.
pub async fn finish_opt(capture: Option<CapturedStream>, grace: Duration) -> String {
    match capture {
        Some(c) => c.finish(grace).await,
        None => String::new(),
    }
}
