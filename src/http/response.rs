use crate::http::headers::Headers;

/// HTTP response status codes.
///
/// The codes the server itself produces have named variants; anything else
/// goes through `Other` and is emitted without a canonical reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
    /// Any other numeric code.
    Other(u16),
}

impl StatusCode {
    /// Returns the numeric status code.
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
            StatusCode::Other(code) => *code,
        }
    }

    /// Returns the canonical reason phrase, if this is a code the server
    /// knows by name. Matching is numeric, so `Other(200)` still reads
    /// `OK` on the wire.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        match self.as_u16() {
            200 => Some("OK"),
            400 => Some("Bad Request"),
            500 => Some("Internal Server Error"),
            _ => None,
        }
    }
}

/// The header set every plain response starts from: an exact
/// `content-length`, no keep-alive, and a text fallback content type.
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("content-length", content_len.to_string());
    headers.set("connection", "close");
    headers.set("content-type", "text/plain");
    headers
}
