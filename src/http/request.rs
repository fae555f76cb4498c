use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::headers::{HeaderError, Headers};

/// Initial receive buffer size. Doubles whenever a read fills it.
const INITIAL_BUFFER_SIZE: usize = 1024;

/// Errors raised while parsing the bytes of a request.
///
/// Every variant is fatal to the connection the request arrived on. The
/// connection layer answers with a 400 when one of these surfaces before
/// any response bytes were written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request line: {0}")]
    InvalidRequestLine(String),
    #[error("invalid method: {0}")]
    InvalidMethod(String),
    #[error("unsupported http version: {0}")]
    UnsupportedVersion(String),
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("invalid content-length: {0}")]
    InvalidContentLength(String),
    #[error("body longer than declared content-length")]
    BodyTooLong,
    #[error("body shorter than declared content-length")]
    BodyTooShort,
    #[error("stream ended before the request was complete")]
    UnexpectedEof,
    #[error("parse called on a completed request")]
    ParseAfterDone,
}

/// Errors from reading a request off a stream: either the bytes were
/// malformed or the transport failed underneath us.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The first line of a request: method, target, and protocol version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Request method, an all-uppercase token such as `GET`.
    pub method: String,
    /// Request target exactly as it appeared on the wire.
    pub target: String,
    /// Protocol version, always `"1.1"` once parsed.
    pub http_version: String,
}

/// Parser position inside a request. Strictly forward-moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// A request being assembled from stream bytes.
///
/// Starts empty in `Initialized` and is filled in field by field as
/// [`Request::parse`] consumes data. Once the state reaches `Done` the
/// value no longer changes and is handed to the handler as-is.
#[derive(Debug, Clone)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
    state: ParserState,
}

impl Request {
    pub fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: Headers::new(),
            body: Vec::new(),
            state: ParserState::Initialized,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Parses as much of `data` as possible, returning the number of bytes
    /// consumed. `reached_eof` tells the parser that no more bytes will
    /// ever arrive, which turns a short body from "wait for more" into an
    /// error. Zero consumed with no error means more input is needed.
    pub fn parse(&mut self, data: &[u8], reached_eof: bool) -> Result<usize, ParseError> {
        if self.state == ParserState::Done {
            return Err(ParseError::ParseAfterDone);
        }
        let mut total = 0;
        while self.state != ParserState::Done {
            let n = self.parse_single(&data[total..], reached_eof)?;
            total += n;
            if n == 0 {
                break;
            }
        }
        Ok(total)
    }

    /// One state-machine step. Consumes at most one protocol element.
    fn parse_single(&mut self, data: &[u8], reached_eof: bool) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some((line, consumed)) = parse_request_line(data)? else {
                    return Ok(0);
                };
                self.request_line = line;
                self.state = ParserState::ParsingHeaders;
                Ok(consumed)
            }
            ParserState::ParsingHeaders => {
                let (consumed, done) = self.headers.parse_line(data)?;
                if done {
                    self.state = ParserState::ParsingBody;
                }
                Ok(consumed)
            }
            ParserState::ParsingBody => {
                let Some(declared) = self.headers.get("content-length") else {
                    self.state = ParserState::Done;
                    return Ok(0);
                };
                let declared: usize = declared
                    .parse()
                    .map_err(|_| ParseError::InvalidContentLength(declared.to_string()))?;
                self.body.extend_from_slice(data);
                if self.body.len() == declared {
                    self.state = ParserState::Done;
                } else if self.body.len() > declared {
                    return Err(ParseError::BodyTooLong);
                } else if reached_eof {
                    return Err(ParseError::BodyTooShort);
                }
                Ok(data.len())
            }
            ParserState::Done => Err(ParseError::ParseAfterDone),
        }
    }

    /// Reads one complete request from `reader`.
    ///
    /// Drives the state machine with a growable receive buffer: read into
    /// the spare tail, parse what is buffered, compact the unconsumed
    /// remainder to the front, repeat. End of stream with the parser in a
    /// non-terminal state and no forward progress is an error, never a
    /// silent truncation.
    pub async fn from_reader<R>(reader: &mut R) -> Result<Request, RequestError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = RecvBuffer::with_capacity(INITIAL_BUFFER_SIZE);
        let mut request = Request::new();
        let mut reached_eof = false;

        while !request.is_done() {
            if buf.is_full() {
                buf.grow();
            }
            if !reached_eof {
                let n = reader.read(buf.spare_mut()).await?;
                if n == 0 {
                    reached_eof = true;
                } else {
                    buf.add_filled(n);
                }
            }

            let consumed = request.parse(buf.filled(), reached_eof)?;
            buf.consume(consumed);

            if reached_eof && consumed == 0 && !request.is_done() {
                return Err(ParseError::UnexpectedEof.into());
            }
        }

        Ok(request)
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

/// Growable receive buffer with an explicit cursor over the filled bytes.
/// Consumed bytes are compacted to the front so the parser always sees the
/// unconsumed tail starting at offset zero.
struct RecvBuffer {
    buf: Vec<u8>,
    filled: usize,
}

impl RecvBuffer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            filled: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    fn grow(&mut self) {
        self.buf.resize(self.buf.len() * 2, 0);
    }

    fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    fn add_filled(&mut self, n: usize) {
        self.filled += n;
    }

    fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    fn consume(&mut self, n: usize) {
        if n > 0 {
            self.buf.copy_within(n..self.filled, 0);
            self.filled -= n;
        }
    }
}

/// Extracts `METHOD SP TARGET SP HTTP/1.1 CRLF` from the front of `data`.
/// Returns `None` when no full line is buffered yet.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(line_end) = data.windows(2).position(|w| w == b"\r\n") else {
        return Ok(None);
    };
    let line = std::str::from_utf8(&data[..line_end])
        .map_err(|_| ParseError::InvalidRequestLine("not valid utf-8".to_string()))?;
    let consumed = line_end + 2;

    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 3 {
        return Err(ParseError::InvalidRequestLine(line.to_string()));
    }
    let (method, target, version) = (parts[0], parts[1], parts[2]);

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::InvalidMethod(method.to_string()));
    }
    if target.is_empty() {
        return Err(ParseError::InvalidRequestLine(line.to_string()));
    }
    let Some(number) = version.strip_prefix("HTTP/") else {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    };
    if number != "1.1" {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }

    Ok(Some((
        RequestLine {
            method: method.to_string(),
            target: target.to_string(),
            http_version: number.to_string(),
        },
        consumed,
    )))
}
