//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, SendTimeoutError, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Encodable, Marshaller, ServerCodec};

use super::{Connection, Handler};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Streams currently being served, so shutdown can unblock their readers
#[derive(Default)]
struct LiveConnections {
    closed: bool,
    next_id: u64,
    streams: HashMap<u64, TcpStream>,
}

impl LiveConnections {
    /// Track a stream; `None` once the server is closing
    fn register(&mut self, stream: &TcpStream) -> Option<io::Result<u64>> {
        if self.closed {
            return None;
        }
        let handle = match stream.try_clone() {
            Ok(handle) => handle,
            Err(e) => return Some(Err(e)),
        };
        let id = self.next_id;
        self.next_id += 1;
        self.streams.insert(id, handle);
        Some(Ok(id))
    }

    /// Refuse new streams and shut down the tracked ones
    fn close_all(&mut self) {
        self.closed = true;
        for (_, stream) in self.streams.drain() {
            // Already-closed peers report NotConnected here
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// TCP server for a command/result protocol
pub struct Server<C, R, M, H> {
    config: Config,
    listener: TcpListener,
    codec: Arc<ServerCodec<C, R, M>>,
    handler: Arc<H>,
    shutdown: Arc<AtomicBool>,
    live: Arc<Mutex<LiveConnections>>,
}

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl<C, R, M, H> Server<C, R, M, H>
where
    C: Send + 'static,
    R: Encodable + Send + 'static,
    M: Marshaller + Send + Sync + 'static,
    H: Handler<C, R>,
{
    /// Bind the listen address from the config
    pub fn bind(config: Config, codec: ServerCodec<C, R, M>, handler: H) -> Result<Self> {
        let listener = TcpListener::bind(&config.addr)?;
        listener.set_nonblocking(true)?;

        let codec = codec.with_max_payload_len(config.max_payload_len);

        Ok(Self {
            config,
            listener,
            codec: Arc::new(codec),
            handler: Arc::new(handler),
            shutdown: Arc::new(AtomicBool::new(false)),
            live: Arc::new(Mutex::new(LiveConnections::default())),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Start the server (blocking until shutdown)
    ///
    /// On shutdown, open connections are closed under their workers and the
    /// call returns once every worker has exited.
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            self.config.workers
        );

        let (tx, rx) = channel::bounded::<TcpStream>(self.config.workers);
        let workers: Vec<JoinHandle<()>> = (0..self.config.workers)
            .map(|id| self.spawn_worker(id, rx.clone()))
            .collect::<io::Result<_>>()?;
        drop(rx);

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::trace!("Accepted {}", addr);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    if !self.dispatch(&tx, stream) {
                        break;
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        drop(tx);
        self.live.lock().close_all();
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Hand a stream to the pool, waiting for a free slot while the server
    /// is still running. Returns false when the acceptor should stop.
    fn dispatch(&self, tx: &Sender<TcpStream>, mut stream: TcpStream) -> bool {
        loop {
            match tx.send_timeout(stream, ACCEPT_POLL_INTERVAL) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(pending)) => {
                    if self.shutdown.load(Ordering::Relaxed) {
                        return false;
                    }
                    stream = pending;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    tracing::error!("All workers exited; stopping acceptor");
                    return false;
                }
            }
        }
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> io::Result<JoinHandle<()>> {
        let codec = Arc::clone(&self.codec);
        let handler = Arc::clone(&self.handler);
        let live = Arc::clone(&self.live);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("typewire-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    let conn_id = match live.lock().register(&stream) {
                        Some(Ok(conn_id)) => conn_id,
                        Some(Err(e)) => {
                            tracing::warn!(worker = id, "Dropping connection: {}", e);
                            continue;
                        }
                        None => continue,
                    };
                    let served = Connection::new(stream, Arc::clone(&codec), Arc::clone(&handler))
                        .and_then(|mut conn| {
                            conn.set_timeouts(read_ms, write_ms)?;
                            conn.handle()
                        });
                    if let Err(e) = served {
                        tracing::debug!(worker = id, "Connection ended with error: {}", e);
                    }
                    live.lock().streams.remove(&conn_id);
                }
            })
    }
}
