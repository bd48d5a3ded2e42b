//! Response body
//!
//! One body type for every response: empty, an in-memory buffer, or a window
//! of an open file streamed in bounded chunks. Files are never read whole.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use hyper::body::{Body, Bytes, Frame, SizeHint};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

/// Largest chunk handed to hyper per frame
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Full(Option<Bytes>),
    File(FileWindow),
}

impl ResponseBody {
    pub const fn empty() -> Self {
        Self::Empty
    }

    pub fn full(data: impl Into<Bytes>) -> Self {
        Self::Full(Some(data.into()))
    }
}

impl From<Bytes> for ResponseBody {
    fn from(data: Bytes) -> Self {
        Self::full(data)
    }
}

impl From<FileWindow> for ResponseBody {
    fn from(window: FileWindow) -> Self {
        Self::File(window)
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        match self.get_mut() {
            Self::Empty => Poll::Ready(None),
            Self::Full(data) => Poll::Ready(data.take().map(|d| Ok(Frame::data(d)))),
            Self::File(window) => window.poll_chunk(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Full(data) => data.is_none(),
            Self::File(window) => window.remaining == 0,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Empty => SizeHint::with_exact(0),
            Self::Full(data) => {
                SizeHint::with_exact(data.as_ref().map_or(0, |d| d.len() as u64))
            }
            Self::File(window) => SizeHint::with_exact(window.remaining),
        }
    }
}

/// Remaining bytes of a file, read from its current position
///
/// The handle is closed when the window is dropped, which hyper does once the
/// body has been written or the connection failed.
#[derive(Debug)]
pub struct FileWindow {
    file: File,
    remaining: u64,
    buf: BytesMut,
    chunk: usize,
}

impl FileWindow {
    /// `file` must already be positioned at the first byte to send
    pub fn new(file: File, len: u64) -> Self {
        let cap = usize::try_from(len).map_or(CHUNK_SIZE, |l| l.min(CHUNK_SIZE));
        Self {
            file,
            remaining: len,
            buf: BytesMut::with_capacity(cap),
            chunk: cap,
        }
    }

    fn poll_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        if self.remaining == 0 {
            return Poll::Ready(None);
        }

        let want = usize::try_from(self.remaining).map_or(self.chunk, |r| r.min(self.chunk));
        // Capacity comes back once hyper drops the previous frame
        self.buf.resize(want, 0);
        let mut read_buf = ReadBuf::new(&mut self.buf[..]);

        match Pin::new(&mut self.file).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(err)) => Poll::Ready(Some(Err(err))),
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled().len();
                self.buf.truncate(filled);
                if filled == 0 {
                    // File shrank underneath us; the promised length cannot be met
                    self.remaining = 0;
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "file truncated while streaming",
                    ))));
                }
                self.remaining -= filled as u64;
                Poll::Ready(Some(Ok(Frame::data(self.buf.split().freeze()))))
            }
        }
    }
}
