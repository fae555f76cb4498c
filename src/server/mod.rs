//! The listening socket, the accept loop, and graceful shutdown.
//!
//! [`serve`] binds a port and returns a [`Server`] handle immediately; the
//! accept loop runs as its own task and spawns a further task per accepted
//! connection, so a stalled peer never delays new acceptances. The only
//! state shared between the accept loop and the shutdown path is an atomic
//! open flag: [`Server::close`] clears it before waking the loop, and the
//! loop uses it to tell a shutdown-induced accept failure apart from a
//! genuine one.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::http::connection::Connection;
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// A request handler, invoked once per successfully parsed request with a
/// fresh writer bound to the connection.
///
/// Handlers must call the writer's operations in wire order and must not
/// keep the writer or the request beyond the call. Plain `fn` items with
/// the matching signature implement this trait directly.
pub trait Handler: Send + Sync + 'static {
    fn handle<'a>(&'a self, w: &'a mut ResponseWriter, request: &'a Request) -> HandlerFuture<'a>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a Request) -> HandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(&'a self, w: &'a mut ResponseWriter, request: &'a Request) -> HandlerFuture<'a> {
        self(w, request)
    }
}

/// Handle to a running server. Dropping it does not stop the accept loop;
/// call [`Server::close`] for an orderly shutdown.
pub struct Server {
    local_addr: SocketAddr,
    open: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    accept_task: Option<JoinHandle<()>>,
}

/// Binds `127.0.0.1:<port>`, starts the accept loop as an independent
/// task, and returns without blocking. Port 0 picks an ephemeral port;
/// [`Server::local_addr`] reports the one actually bound.
pub async fn serve(port: u16, handler: Arc<dyn Handler>) -> anyhow::Result<Server> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let local_addr = listener.local_addr()?;
    let open = Arc::new(AtomicBool::new(true));
    let shutdown = Arc::new(Notify::new());

    let accept_task = tokio::spawn(accept_loop(
        listener,
        Arc::clone(&open),
        Arc::clone(&shutdown),
        handler,
    ));
    tracing::info!(%local_addr, "listening");

    Ok(Server {
        local_addr,
        open,
        shutdown,
        accept_task: Some(accept_task),
    })
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Clears the open flag, wakes the accept loop, and waits for it to
    /// finish so the listening socket is released before returning.
    /// Connections already being handled run to completion.
    pub async fn close(&mut self) -> anyhow::Result<()> {
        self.open.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
        if let Some(task) = self.accept_task.take() {
            task.await?;
        }
        Ok(())
    }
}

async fn accept_loop(
    listener: TcpListener,
    open: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    handler: Arc<dyn Handler>,
) {
    while open.load(Ordering::SeqCst) {
        let accepted = tokio::select! {
            res = listener.accept() => res,
            _ = shutdown.notified() => break,
        };
        match accepted {
            Ok((stream, peer)) => {
                tracing::debug!(%peer, "accepted connection");
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    if let Err(e) = Connection::new(stream, handler).run().await {
                        tracing::error!(%peer, error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                // An accept failure after close is expected, not reportable.
                if open.load(Ordering::SeqCst) {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
    // The listener drops here, releasing the port.
}
