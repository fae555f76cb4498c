use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::request::{Request, RequestError};
use crate::http::response::StatusCode;
use crate::http::writer::{ResponseWriter, WriterState, write_error};
use crate::server::Handler;

const BAD_REQUEST_PAGE: &[u8] =
    b"<html><body><h1>Bad Request</h1><p>Could not parse the request.</p></body></html>";

/// One accepted connection: reads a single request, dispatches it, flushes
/// the response, and closes. No keep-alive.
pub struct Connection {
    stream: TcpStream,
    handler: Arc<dyn Handler>,
}

impl Connection {
    pub fn new(stream: TcpStream, handler: Arc<dyn Handler>) -> Self {
        Self { stream, handler }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut writer = ResponseWriter::new();

        match Request::from_reader(&mut self.stream).await {
            Ok(request) => {
                tracing::debug!(
                    method = %request.request_line.method,
                    target = %request.request_line.target,
                    "request parsed"
                );
                self.handler.handle(&mut writer, &request).await;
                if writer.state() != WriterState::Done {
                    tracing::warn!("handler returned before completing the response");
                }
            }
            Err(RequestError::Parse(e)) => {
                tracing::warn!(error = %e, "malformed request");
                write_error(&mut writer, StatusCode::BadRequest, BAD_REQUEST_PAGE);
            }
            Err(RequestError::Io(e)) => return Err(e.into()),
        }

        writer.write_to_stream(&mut self.stream).await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}
