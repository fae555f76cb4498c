use std::collections::HashMap;

/// Errors produced while parsing a header field line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("header line is not valid utf-8")]
    InvalidEncoding,
    #[error("header line has no colon: {0}")]
    MissingColon(String),
    #[error("whitespace between header name and colon: {0}")]
    TrailingSpaceBeforeColon(String),
    #[error("invalid header name: {0}")]
    InvalidName(String),
}

/// A collection of HTTP header fields with case-insensitive names.
///
/// Names are folded to lowercase on insertion and lookup, so
/// `get("Content-Length")` and `get("content-length")` are equivalent.
/// Repeated fields are joined into a single comma-separated value in
/// arrival order, the way proxies combine duplicate fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a field value by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// Inserts a field, replacing any existing value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Removes a field by name, ignoring case.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes one header field line from the front of `data`.
    ///
    /// Returns `(bytes_consumed, done)`. A return of `(0, false)` means no
    /// full line is available yet and the caller must supply more bytes.
    /// `(2, true)` means the empty line ending the header section was
    /// consumed. Otherwise exactly one field line was recorded and the
    /// caller should advance its buffer by `bytes_consumed` and call again.
    ///
    /// Errors are fatal to the surrounding parse and consume nothing.
    pub fn parse_line(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(line_end) = find_crlf(data) else {
            return Ok((0, false));
        };
        if line_end == 0 {
            return Ok((2, true));
        }

        let line = std::str::from_utf8(&data[..line_end])
            .map_err(|_| HeaderError::InvalidEncoding)?;
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HeaderError::MissingColon(line.to_string()))?;

        // "Host : x" is malformed, but " Host: x" is merely sloppy.
        if name.ends_with(' ') {
            return Err(HeaderError::TrailingSpaceBeforeColon(name.trim().to_string()));
        }
        let name = name.trim();
        if name.is_empty() || !name.chars().all(is_token_char) {
            return Err(HeaderError::InvalidName(name.to_string()));
        }

        let name = name.to_ascii_lowercase();
        let value = value.trim();
        match self.fields.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                self.fields.insert(name, value.to_string());
            }
        }

        Ok((line_end + 2, false))
    }
}

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '`' | '*' | '+' | '-' | '.' | '^' | '_' | '|' | '~' | '&'
        )
}
