use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::{StatusCode, default_headers};

/// Writer position inside a response. Strictly forward-moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    WritingStatusLine,
    WritingHeaders,
    WritingBody,
    Done,
}

/// A response operation was invoked out of its required order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("{operation} called in {state:?} state")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },
}

/// Serializes one response in wire order: status line, headers, body or
/// chunked body, trailers.
///
/// Each operation checks the writer's state before touching the buffer, so
/// an out-of-order call fails without emitting anything. A response is
/// either whole-body or chunked, never a mix. Bytes accumulate in an
/// internal buffer and are flushed to the peer with [`write_to_stream`]
/// once the handler returns.
///
/// [`write_to_stream`]: ResponseWriter::write_to_stream
pub struct ResponseWriter {
    buf: BytesMut,
    state: WriterState,
    chunked: bool,
    wrote_trailers: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
            state: WriterState::WritingStatusLine,
            chunked: false,
            wrote_trailers: false,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// The serialized response so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: WriterState,
    ) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Emits `HTTP/1.1 <code> <reason>\r\n`. Codes without a canonical
    /// reason phrase get a bare `HTTP/1.1 <code> \r\n`.
    pub fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect_state("write_status_line", WriterState::WritingStatusLine)?;
        match status.reason_phrase() {
            Some(reason) => {
                self.buf
                    .extend_from_slice(format!("HTTP/1.1 {} {}\r\n", status.as_u16(), reason).as_bytes());
            }
            None => {
                self.buf
                    .extend_from_slice(format!("HTTP/1.1 {} \r\n", status.as_u16()).as_bytes());
            }
        }
        self.state = WriterState::WritingHeaders;
        Ok(())
    }

    /// Emits every header as `name: value\r\n` followed by the blank line
    /// ending the header section. Emission order carries no meaning.
    pub fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.expect_state("write_headers", WriterState::WritingHeaders)?;
        for (name, value) in headers.iter() {
            self.buf.extend_from_slice(name.as_bytes());
            self.buf.extend_from_slice(b": ");
            self.buf.extend_from_slice(value.as_bytes());
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"\r\n");
        self.state = WriterState::WritingBody;
        Ok(())
    }

    /// Writes the whole body verbatim and finishes the response.
    pub fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect_state("write_body", WriterState::WritingBody)?;
        if self.chunked {
            return Err(WriteError::InvalidState {
                operation: "write_body after chunked writes",
                state: self.state,
            });
        }
        self.buf.extend_from_slice(body);
        self.state = WriterState::Done;
        Ok(body.len())
    }

    /// Writes one chunk as `<hex length>\r\n<bytes>\r\n`. Callable any
    /// number of times before [`write_chunked_body_done`]. An empty chunk
    /// writes nothing, since a zero-length chunk terminates the body.
    ///
    /// [`write_chunked_body_done`]: ResponseWriter::write_chunked_body_done
    pub fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<(), WriteError> {
        self.expect_state("write_chunked_body", WriterState::WritingBody)?;
        if chunk.is_empty() {
            return Ok(());
        }
        self.chunked = true;
        self.buf
            .extend_from_slice(format!("{:X}\r\n", chunk.len()).as_bytes());
        self.buf.extend_from_slice(chunk);
        self.buf.extend_from_slice(b"\r\n");
        Ok(())
    }

    /// Writes the terminating zero-length chunk and finishes the body.
    pub fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_state("write_chunked_body_done", WriterState::WritingBody)?;
        self.chunked = true;
        self.buf.extend_from_slice(b"0\r\n");
        self.state = WriterState::Done;
        Ok(())
    }

    /// Emits trailer fields after a chunked body, followed by a blank
    /// line. Legal exactly once, and only after the terminating chunk.
    pub fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.expect_state("write_trailers", WriterState::Done)?;
        if !self.chunked || self.wrote_trailers {
            return Err(WriteError::InvalidState {
                operation: "write_trailers",
                state: self.state,
            });
        }
        for (name, value) in trailers.iter() {
            self.buf.extend_from_slice(name.as_bytes());
            self.buf.extend_from_slice(b": ");
            self.buf.extend_from_slice(value.as_bytes());
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"\r\n");
        self.wrote_trailers = true;
        Ok(())
    }

    /// Flushes the buffered response to the peer.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream.write_all(&self.buf).await?;
        stream.flush().await?;
        Ok(())
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a complete error response: status line, default headers with the
/// content type swapped to html, and the page body. Write failures are
/// logged and end the attempt.
pub fn write_error(w: &mut ResponseWriter, status: StatusCode, body: &[u8]) {
    if let Err(e) = w.write_status_line(status) {
        tracing::error!(error = %e, "error writing status line");
        return;
    }
    let mut headers = default_headers(body.len());
    headers.set("content-type", "text/html");
    if let Err(e) = w.write_headers(&headers) {
        tracing::error!(error = %e, "error writing headers");
        return;
    }
    if let Err(e) = w.write_body(body) {
        tracing::error!(error = %e, "error writing body");
    }
}
