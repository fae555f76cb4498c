//! Demo handlers driven by the protocol core.
//!
//! The router dispatches on the request target: fixed HTML pages for the
//! success and error routes, a chunked relay of an upstream HTTP endpoint
//! under `/proxy/`, and a file served from disk under `/video`. None of
//! these contain protocol logic; they only call the writer in wire order.

pub mod upstream;

use crate::config::Config;
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::{ResponseWriter, WriterState, write_error};
use crate::server::{Handler, HandlerFuture};

const SUCCESS_PAGE: &[u8] =
    b"<html><head><title>200 OK</title></head><body><h1>Success!</h1><p>The request worked.</p></body></html>";
const BAD_REQUEST_PAGE: &[u8] =
    b"<html><head><title>400 Bad Request</title></head><body><h1>Bad Request</h1><p>The request could not be understood.</p></body></html>";
const SERVER_ERROR_PAGE: &[u8] =
    b"<html><head><title>500 Internal Server Error</title></head><body><h1>Internal Server Error</h1><p>Something went wrong on our end.</p></body></html>";

/// Maps request targets to handlers.
pub struct Router {
    cfg: Config,
}

impl Handler for Router {
    fn handle<'a>(&'a self, w: &'a mut ResponseWriter, request: &'a Request) -> HandlerFuture<'a> {
        Box::pin(self.route(w, request))
    }
}

impl Router {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    async fn route(&self, w: &mut ResponseWriter, request: &Request) {
        let target = request.request_line.target.as_str();
        tracing::info!(method = %request.request_line.method, path = target, "handling request");

        if target == "/yourproblem" {
            write_error(w, StatusCode::BadRequest, BAD_REQUEST_PAGE);
        } else if target == "/myproblem" {
            write_error(w, StatusCode::InternalServerError, SERVER_ERROR_PAGE);
        } else if let Some(tail) = target.strip_prefix("/proxy") {
            self.relay(w, tail).await;
        } else if target == "/video" {
            self.video(w).await;
        } else {
            write_error(w, StatusCode::Ok, SUCCESS_PAGE);
        }
    }

    /// Relays `<upstream><tail>` as a chunked response. A failure before
    /// any bytes were written becomes a 500 page; after that the peer just
    /// sees a truncated body.
    async fn relay(&self, w: &mut ResponseWriter, tail: &str) {
        let path = if tail.is_empty() { "/" } else { tail };
        if let Err(e) = upstream::relay(w, &self.cfg.upstream, path).await {
            tracing::error!(error = %e, upstream = %self.cfg.upstream, "relay failed");
            if w.state() == WriterState::WritingStatusLine {
                write_error(w, StatusCode::InternalServerError, SERVER_ERROR_PAGE);
            }
        }
    }

    async fn video(&self, w: &mut ResponseWriter) {
        let data = match tokio::fs::read(&self.cfg.video_path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, path = %self.cfg.video_path, "could not read video file");
                write_error(w, StatusCode::InternalServerError, SERVER_ERROR_PAGE);
                return;
            }
        };

        let mut headers = default_headers(data.len());
        headers.set("content-type", "video/mp4");
        let written = w
            .write_status_line(StatusCode::Ok)
            .and_then(|_| w.write_headers(&headers))
            .and_then(|_| w.write_body(&data).map(|_| ()));
        if let Err(e) = written {
            tracing::error!(error = %e, "error writing video response");
        }
    }
}
