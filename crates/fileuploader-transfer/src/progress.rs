// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress-counting file stream.
//
// The file is read in fixed-size chunks and every chunk handed to the HTTP
// body is reported to a `ProgressListener` with the running total.  Only file
// bytes are counted; multipart framing is not.

use std::io;
use std::sync::Arc;

use futures::Stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::trace;

/// Receives byte counts as an upload proceeds.
pub trait ProgressListener: Send + Sync {
    /// `sent` bytes of `total` have been handed to the transport for the file
    /// identified by `file_ref`.
    fn transferred(&self, file_ref: &str, sent: u64, total: u64);
}

/// Listener that ignores every update.
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn transferred(&self, _file_ref: &str, _sent: u64, _total: u64) {}
}

impl<F> ProgressListener for F
where
    F: Fn(&str, u64, u64) + Send + Sync,
{
    fn transferred(&self, file_ref: &str, sent: u64, total: u64) {
        self(file_ref, sent, total)
    }
}

struct CountingState {
    file: File,
    file_ref: String,
    listener: Arc<dyn ProgressListener>,
    sent: u64,
    total: u64,
    chunk_size: usize,
    done: bool,
}

/// Stream the contents of `file` in chunks of at most `chunk_size` bytes,
/// reporting progress after each chunk.
///
/// `total` is the length the caller advertised (e.g. in `Content-Length`).
/// The stream never yields more than `total` bytes and fails with
/// `UnexpectedEof` if the file ends early.
pub fn counting_stream(
    file: File,
    total: u64,
    file_ref: String,
    listener: Arc<dyn ProgressListener>,
    chunk_size: usize,
) -> impl Stream<Item = io::Result<Vec<u8>>> + Send + Sync + 'static {
    let state = CountingState {
        file,
        file_ref,
        listener,
        sent: 0,
        total,
        chunk_size: chunk_size.max(1),
        done: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }

        let remaining = st.total - st.sent;
        if remaining == 0 {
            return None;
        }

        let want = remaining.min(st.chunk_size as u64) as usize;
        let mut buf = vec![0u8; want];
        match st.file.read(&mut buf).await {
            Ok(0) => {
                st.done = true;
                let err = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file ended after {} of {} bytes", st.sent, st.total),
                );
                Some((Err(err), st))
            }
            Ok(n) => {
                buf.truncate(n);
                st.sent += n as u64;
                trace!(sent = st.sent, total = st.total, "chunk read");
                st.listener.transferred(&st.file_ref, st.sent, st.total);
                Some((Ok(buf), st))
            }
            Err(e) => {
                st.done = true;
                Some((Err(e), st))
            }
        }
    })
}
