//! Raw-TCP fetch of an upstream HTTP resource, relayed as a chunked
//! response with the relayed byte count reported in a trailer.

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

use crate::http::headers::Headers;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::ResponseWriter;

const CHUNK_SIZE: usize = 1024;
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Fetches `<base><path>` over plain TCP and streams the payload through
/// `w` chunk by chunk, finishing with an `x-content-length` trailer. The
/// upstream's own status line and headers are skipped; the payload gets
/// this server's framing.
pub async fn relay(w: &mut ResponseWriter, base: &str, path: &str) -> anyhow::Result<()> {
    let url = Url::parse(base)
        .and_then(|u| u.join(path))
        .with_context(|| format!("invalid upstream url {base}{path}"))?;
    let host = url.host_str().context("upstream url missing host")?;
    let port = url.port().unwrap_or(80);

    let mut stream = TcpStream::connect((host, port))
        .await
        .with_context(|| format!("connecting to {host}:{port}"))?;

    let target = match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    };
    let request = format!("GET {target} HTTP/1.1\r\nhost: {host}\r\nconnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    // Read past the upstream header section; anything after it is payload.
    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    let body_start = loop {
        let n = stream.read_buf(&mut buf).await?;
        if n == 0 {
            anyhow::bail!("upstream closed before sending complete headers");
        }
        if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
        if buf.len() > MAX_HEADER_BYTES {
            anyhow::bail!("upstream headers too large");
        }
    };

    w.write_status_line(StatusCode::Ok)?;
    let mut headers = default_headers(0);
    headers.remove("content-length");
    headers.set("content-type", "application/octet-stream");
    headers.set("transfer-encoding", "chunked");
    headers.set("trailer", "x-content-length");
    w.write_headers(&headers)?;

    let mut relayed = 0usize;
    if body_start < buf.len() {
        w.write_chunked_body(&buf[body_start..])?;
        relayed += buf.len() - body_start;
    }

    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        w.write_chunked_body(&chunk[..n])?;
        relayed += n;
    }
    w.write_chunked_body_done()?;

    let mut trailers = Headers::new();
    trailers.set("x-content-length", relayed.to_string());
    w.write_trailers(&trailers)?;

    tracing::debug!(bytes = relayed, url = %url, "relayed upstream response");
    Ok(())
}
